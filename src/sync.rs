use anyhow::Result;
use async_trait::async_trait;

/// Cloud synchronization hook. The coordinator fires this after local,
/// non-sync-originated saves; the call is advisory and its errors are
/// logged and dropped by the spawning task.
#[async_trait]
pub trait CloudSync: Send + Sync {
    async fn trigger_auto_sync(&self) -> Result<()>;
}

/// Default implementation for setups without cloud sync configured.
pub struct NoopCloudSync;

#[async_trait]
impl CloudSync for NoopCloudSync {
    async fn trigger_auto_sync(&self) -> Result<()> {
        Ok(())
    }
}
