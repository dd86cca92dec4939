//! Development server for editing cwrap skeletons.
//!
//! Serves the project and the editor front-end, exposes the JSON endpoints
//! the editor saves through, and reloads open pages when files change.

mod api;
pub mod livereload;
pub mod server;
pub mod watcher;

pub use livereload::{ReloadHub, ReloadMessage};
pub use server::{DevServer, DevServerConfig, ServerError};
pub use watcher::{FileWatcher, WatchEvent};
