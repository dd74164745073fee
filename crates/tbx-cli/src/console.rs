//! Display surface for plain terminal output

use std::io::Write;
use tbx_core::DisplaySurface;

/// Writes command output to stdout and status and errors to stderr
#[derive(Debug, Default)]
pub struct ConsoleSurface;

impl DisplaySurface for ConsoleSurface {
    fn display_message(&mut self, message: &str) {
        eprintln!("{}", message);
    }

    fn display_output(&mut self, output: &str) {
        let mut stdout = std::io::stdout().lock();
        let _ = stdout.write_all(output.as_bytes());
        let _ = stdout.flush();
    }

    fn display_error(&mut self, error: &str) {
        if error.ends_with('\n') {
            eprint!("{}", error);
        } else {
            eprintln!("{}", error);
        }
    }

    fn set_containers(&mut self, names: Vec<String>) {
        tracing::debug!("{} containers after refresh", names.len());
    }
}
