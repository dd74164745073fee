//! Subprocess plumbing for tbx
//!
//! This crate decides how external container tools are invoked (directly on
//! the host or relayed through `flatpak-spawn --host` from a sandbox) and
//! runs them, either to completion or as a stream of output events.

mod context;
mod error;
mod invocation;
mod runner;

pub use context::*;
pub use error::*;
pub use invocation::*;
pub use runner::*;
