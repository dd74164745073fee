//! Configuration for tbx
//!
//! This crate handles the global configuration (`~/.config/tbx/config.toml`):
//! - Which binaries are invoked for each container operation
//! - How the sandboxed (Flatpak) execution context is detected
//! - Defaults for the shell, the editor and query timeouts

mod error;
mod global;

pub use error::*;
pub use global::*;
