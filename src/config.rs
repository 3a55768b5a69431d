//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/skyctl/skyctl.toml`
//! 3. Environment variables: `SKYCTL_*` prefix
//!
//! This is user-level tool configuration. The per-directory project alias
//! file (`skyctl.json`) is handled by the `ConfigStore` seam instead.

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::expand_env_vars;

pub const DEFAULT_SERVER_URL: &str = "https://admin.skyctl.dev";
pub const DEFAULT_PROJECT_FILE: &str = "skyctl.json";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Raw settings for intermediate parsing (`None` means "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub server_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub project_file: Option<String>,
    pub credentials_file: Option<PathBuf>,
}

/// Unified configuration for skyctl.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Admin API base URL
    pub server_url: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Name of the project alias file in the working directory
    pub project_file: String,
    /// Where login tokens are stored
    pub credentials_file: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            project_file: DEFAULT_PROJECT_FILE.to_string(),
            credentials_file: default_credentials_file(),
        }
    }
}

fn default_credentials_file() -> PathBuf {
    ProjectDirs::from("", "", "skyctl")
        .map(|dirs| dirs.data_dir().join("credentials.json"))
        .unwrap_or_else(|| PathBuf::from("~/.skyctl/credentials.json"))
}

/// Get the XDG config directory for skyctl.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "skyctl").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("skyctl.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Request timeout as a `Duration`.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        let expanded = expand_env_vars(self.credentials_file.to_string_lossy().as_ref());
        self.credentials_file = PathBuf::from(expanded);
    }

    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            server_url: overlay
                .server_url
                .clone()
                .unwrap_or_else(|| self.server_url.clone()),
            timeout_secs: overlay.timeout_secs.unwrap_or(self.timeout_secs),
            project_file: overlay
                .project_file
                .clone()
                .unwrap_or_else(|| self.project_file.clone()),
            credentials_file: overlay
                .credentials_file
                .clone()
                .unwrap_or_else(|| self.credentials_file.clone()),
        }
    }

    /// Load settings from defaults, the global config file and `SKYCTL_*` env vars.
    pub fn load() -> Result<Self, ApplicationError> {
        Self::load_from(global_config_path().as_deref())
    }

    /// Like [`Settings::load`] with an explicit global config path.
    ///
    /// A missing file is skipped; an unreadable or invalid one is an error.
    pub fn load_from(global_path: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(path) = global_path {
            if path.exists() {
                let raw = load_raw_settings(path)?;
                current = current.merge_with(&raw);
            }
        }

        current = Self::apply_env_overrides(current)?;
        current.expand_paths();
        current.validate()?;

        Ok(current)
    }

    /// Apply SKYCTL_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(Environment::with_prefix("SKYCTL").separator("__"))
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("server_url") {
            settings.server_url = val;
        }
        if let Ok(val) = config.get_string("timeout_secs") {
            settings.timeout_secs = val.parse().map_err(|e| ApplicationError::Config {
                message: format!("SKYCTL_TIMEOUT_SECS: {e}"),
            })?;
        }
        if let Ok(val) = config.get_string("project_file") {
            settings.project_file = val;
        }
        if let Ok(val) = config.get_string("credentials_file") {
            settings.credentials_file = PathBuf::from(val);
        }

        Ok(settings)
    }

    fn validate(&self) -> Result<(), ApplicationError> {
        if self.server_url.trim().is_empty() {
            return Err(ApplicationError::Config {
                message: "server_url must not be empty".to_string(),
            });
        }
        if self.project_file.trim().is_empty() || self.project_file.contains(['/', '\\']) {
            return Err(ApplicationError::Config {
                message: format!(
                    "project_file must be a plain file name, got '{}'",
                    self.project_file
                ),
            });
        }
        if self.timeout_secs == 0 {
            return Err(ApplicationError::Config {
                message: "timeout_secs must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# skyctl configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/skyctl/skyctl.toml
#   Env:    SKYCTL_* environment variables (explicit overrides)

# Admin API base URL
# server_url = "https://admin.skyctl.dev"

# Per-request timeout in seconds
# timeout_secs = 30

# Project alias file looked up in the working directory
# project_file = "skyctl.json"

# Where login tokens are stored
# credentials_file = "~/.local/share/skyctl/credentials.json"
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_no_config_when_loading_then_uses_defaults() {
        let settings = Settings::load_from(None).expect("load defaults");
        assert!(!settings.server_url.is_empty());
        assert!(settings.timeout_secs > 0);
        assert!(settings
            .credentials_file
            .to_string_lossy()
            .ends_with("credentials.json"));
    }

    #[test]
    fn given_tilde_in_credentials_file_when_expand_paths_then_expands_to_home() {
        let mut settings = Settings {
            credentials_file: PathBuf::from("~/.skyctl/credentials.json"),
            ..Settings::default()
        };

        settings.expand_paths();

        let home = std::env::var("HOME").expect("HOME should be set");
        let path = settings.credentials_file.to_string_lossy();
        assert!(path.starts_with(&home), "should start with home: {}", path);
        assert!(!path.contains('~'), "should not contain tilde: {}", path);
    }

    #[test]
    fn given_partial_overlay_when_merging_then_only_specified_fields_change() {
        let base = Settings::default();
        let overlay = RawSettings {
            server_url: Some("https://staging.example".to_string()),
            timeout_secs: None,
            project_file: None,
            credentials_file: None,
        };

        let merged = base.merge_with(&overlay);

        assert_eq!(merged.server_url, "https://staging.example");
        assert_eq!(merged.timeout_secs, base.timeout_secs);
        assert_eq!(merged.project_file, base.project_file);
    }

    #[test]
    fn given_project_file_with_separator_when_validating_then_rejects() {
        let settings = Settings {
            project_file: "nested/skyctl.json".to_string(),
            ..Settings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn given_settings_when_rendering_toml_then_contains_server_url() {
        let toml = Settings::default().to_toml().unwrap();
        assert!(toml.contains("server_url"));
    }
}
