pub mod browser;
pub mod capture;
pub mod coordinator;
pub mod error;
pub mod favicon;
pub mod filter;
pub mod models;
pub mod notify;
pub mod replace;
pub mod settings;
pub mod store;
pub mod sync;
pub mod tag;
pub mod utils;

pub use browser::{BrowserApi, Capabilities, TabQuery};
pub use capture::{CaptureOptions, CaptureScope, SessionCapture};
pub use coordinator::SessionCoordinator;
pub use error::{Result, SessionError};
pub use models::{ActiveSessionPointer, Session, Tab, TabGroup, WindowInfo};
pub use notify::{EventBus, SessionEvent};
pub use settings::{Settings, SettingsStore};
pub use store::Database;
pub use sync::{CloudSync, NoopCloudSync};
