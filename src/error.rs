use thiserror::Error;

/// Errors surfaced by capture and the persistence coordinator.
///
/// Best-effort side effects (favicon compression, event broadcast, the
/// cloud-sync trigger) never show up here; they are logged and dropped at
/// the point of failure.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Capture produced zero tabs after scope and ignore-rule filtering.
    #[error("capture produced no tabs")]
    EmptyCapture,

    /// A live browser-state query failed mid-capture.
    #[error("browser query failed: {0:#}")]
    Browser(anyhow::Error),

    /// The session store rejected a `put`.
    #[error("session store write failed: {0:#}")]
    StoreWrite(anyhow::Error),

    /// The session store rejected a `delete`.
    #[error("session store delete failed: {0:#}")]
    StoreDelete(anyhow::Error),
}

pub type Result<T> = std::result::Result<T, SessionError>;
