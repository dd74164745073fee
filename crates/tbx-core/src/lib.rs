//! Core logic for tbx
//!
//! This crate provides:
//! - The command dispatcher (one tracked process at a time)
//! - The display surface abstraction the dispatcher reports to
//! - Parsing of container enumeration and running-state output

mod dispatcher;
mod error;
mod intent;
mod parse;
mod surface;

pub use dispatcher::*;
pub use error::*;
pub use intent::*;
pub use parse::*;
pub use surface::*;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
