// Drive v3 client that backs the traversal
pub mod drive;
pub mod logging;

// Configuration and state directory
pub mod state;

pub use drive::{DriveClient, DriveError};
pub use state::{AppConfig, AppState, NormalizeSettings, StateError};
