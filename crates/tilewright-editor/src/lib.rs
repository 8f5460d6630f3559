pub mod app;
pub mod config;
pub mod error;
pub mod icons;
pub mod modules;
pub mod session;
pub mod startup;

pub use app::Editor;
pub use config::EditorConfig;
pub use error::{EditorError, Result};
pub use session::{DocumentId, Session};
pub use startup::{boot, boot_with};
