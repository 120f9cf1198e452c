pub mod session;

pub use session::{
    ActiveSessionPointer, Session, Tab, TabGroup, TabId, WindowId, WindowInfo, WindowKind,
};
