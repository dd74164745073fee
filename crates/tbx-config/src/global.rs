//! Global configuration for tbx
//!
//! Located at `~/.config/tbx/config.toml`

use crate::{ConfigError, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Marker file present inside every Flatpak sandbox
pub const FLATPAK_MARKER: &str = "/.flatpak-info";

/// Global tbx configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalConfig {
    pub defaults: DefaultsConfig,
    pub tools: ToolsConfig,
    pub sandbox: SandboxConfig,
}

/// Default settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    /// Command run by `exec` and `connect` inside the container
    pub shell: String,
    /// Program used to open files inside the container
    pub editor: String,
    /// Upper bound for running-state checks and container enumeration
    pub query_timeout_secs: u64,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            shell: "bash".to_string(),
            editor: "kate".to_string(),
            query_timeout_secs: 30,
        }
    }
}

impl DefaultsConfig {
    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }
}

/// External binaries invoked by tbx
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// Container runtime CLI (stop, inspect)
    pub runtime: String,
    /// Container-entry CLI (start, exec, connect, open)
    pub entry: String,
    /// Container enumeration CLI
    pub list: String,
    /// Host-escape wrapper used from inside a sandbox
    pub host_spawn: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            runtime: "podman".to_string(),
            entry: "distrobox-enter".to_string(),
            list: "distrobox-list".to_string(),
            host_spawn: "flatpak-spawn".to_string(),
        }
    }
}

/// How the sandboxed execution context is decided
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SandboxMode {
    /// Check for the marker file once at startup
    #[default]
    Auto,
    /// Always route through the host-escape wrapper
    Always,
    /// Never route through the host-escape wrapper
    Never,
}

impl std::fmt::Display for SandboxMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SandboxMode::Auto => write!(f, "auto"),
            SandboxMode::Always => write!(f, "always"),
            SandboxMode::Never => write!(f, "never"),
        }
    }
}

/// Sandbox detection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    pub mode: SandboxMode,
    /// Path whose existence means we run inside a sandbox
    pub marker: PathBuf,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            mode: SandboxMode::Auto,
            marker: PathBuf::from(FLATPAK_MARKER),
        }
    }
}

impl GlobalConfig {
    /// Load global configuration from the default path
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        Self::load_from(&path)
    }

    /// Load global configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::TomlParseError {
            path: path.to_path_buf(),
            source: e,
        })?;
        config.validate()?;

        tracing::debug!(
            "Loaded config from {:?}: sandbox={}, entry={}",
            path,
            config.sandbox.mode,
            config.tools.entry
        );

        Ok(config)
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        self.save_to(&path)
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError {
                path: path.to_path_buf(),
                source: e,
            })?;
        }

        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::Invalid(e.to_string()))?;

        std::fs::write(path, content).map_err(|e| ConfigError::WriteError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the default config file path
    pub fn config_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("", "", "tbx").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Reject configurations that would produce unusable invocations
    pub fn validate(&self) -> Result<()> {
        let tools = [
            ("tools.runtime", &self.tools.runtime),
            ("tools.entry", &self.tools.entry),
            ("tools.list", &self.tools.list),
            ("tools.host_spawn", &self.tools.host_spawn),
            ("defaults.shell", &self.defaults.shell),
            ("defaults.editor", &self.defaults.editor),
        ];
        for (key, value) in tools {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("{} must not be empty", key)));
            }
        }
        if self.defaults.query_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "defaults.query_timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
