//! Sandboxed vs. host execution context

use std::path::Path;
use tbx_config::{SandboxConfig, SandboxMode};

/// Where tbx itself is running
///
/// Resolved once at startup and handed to [`crate::InvocationBuilder`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExecutionContext {
    /// Binaries are invoked directly
    #[default]
    Host,
    /// Binaries must be relayed to the host through the host-escape wrapper
    Sandboxed,
}

/// Check whether the sandbox marker exists. Content is ignored.
pub fn is_sandboxed(marker: &Path) -> bool {
    marker.exists()
}

impl ExecutionContext {
    /// Detect the context from the marker path
    pub fn detect(marker: &Path) -> Self {
        if is_sandboxed(marker) {
            ExecutionContext::Sandboxed
        } else {
            ExecutionContext::Host
        }
    }

    /// Resolve the context from configuration, honouring forced modes
    pub fn resolve(config: &SandboxConfig) -> Self {
        let context = match config.mode {
            SandboxMode::Always => ExecutionContext::Sandboxed,
            SandboxMode::Never => ExecutionContext::Host,
            SandboxMode::Auto => Self::detect(&config.marker),
        };
        tracing::debug!(
            "Execution context: {:?} (mode={}, marker={:?})",
            context,
            config.mode,
            config.marker
        );
        context
    }

    pub fn is_sandboxed(&self) -> bool {
        *self == ExecutionContext::Sandboxed
    }
}

impl std::fmt::Display for ExecutionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutionContext::Host => write!(f, "host"),
            ExecutionContext::Sandboxed => write!(f, "sandboxed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_marker_present_means_sandboxed() {
        let tmp = tempfile::tempdir().unwrap();
        let marker = tmp.path().join(".flatpak-info");
        std::fs::write(&marker, "[Application]\nname=org.kde.kate\n").unwrap();

        assert!(is_sandboxed(&marker));
        assert_eq!(ExecutionContext::detect(&marker), ExecutionContext::Sandboxed);
    }

    #[test]
    fn test_marker_directory_counts() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(is_sandboxed(tmp.path()));
    }

    #[test]
    fn test_marker_absent_means_host() {
        let tmp = tempfile::tempdir().unwrap();
        let marker = tmp.path().join("missing");
        assert_eq!(ExecutionContext::detect(&marker), ExecutionContext::Host);
    }

    #[test]
    fn test_forced_modes_ignore_marker() {
        let tmp = tempfile::tempdir().unwrap();
        let present = SandboxConfig {
            mode: SandboxMode::Never,
            marker: tmp.path().to_path_buf(),
        };
        assert_eq!(ExecutionContext::resolve(&present), ExecutionContext::Host);

        let absent = SandboxConfig {
            mode: SandboxMode::Always,
            marker: PathBuf::from("/definitely/not/here"),
        };
        assert_eq!(ExecutionContext::resolve(&absent), ExecutionContext::Sandboxed);
    }

    #[test]
    fn test_auto_mode_uses_marker() {
        let tmp = tempfile::tempdir().unwrap();
        let config = SandboxConfig {
            mode: SandboxMode::Auto,
            marker: tmp.path().to_path_buf(),
        };
        assert!(ExecutionContext::resolve(&config).is_sandboxed());
    }
}
