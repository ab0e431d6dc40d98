//! Store configuration.
//!
//! # Responsibility
//! - Describe backend, latency, seeding and logging settings.
//! - Load settings from TOML with environment overrides.
//!
//! # Invariants
//! - Every field has a default, so an empty document is a valid config.
//! - Environment overrides win over file values.

use crate::service::strategy::LatencyProfile;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const ENV_DB_PATH: &str = "MANUSCRIPT_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "MANUSCRIPT_LOG_LEVEL";
pub const ENV_LATENCY: &str = "MANUSCRIPT_LATENCY";

const DEFAULT_APP_NAME: &str = "Manuscript API";

#[derive(Debug)]
pub enum ConfigError {
    Read { path: PathBuf, source: std::io::Error },
    Parse { path: PathBuf, source: toml::de::Error },
    InvalidOverride { name: &'static str, value: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "failed to parse config `{}`: {source}", path.display())
            }
            Self::InvalidOverride { name, value } => {
                write!(f, "invalid value `{value}` for {name}; expected on|off")
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::InvalidOverride { .. } => None,
        }
    }
}

/// Simulated latency settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LatencyConfig {
    /// Off by default so scripted and test use stays fast.
    pub enabled: bool,
    #[serde(flatten)]
    pub profile: LatencyProfile,
}

/// Top-level store configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Reported by the root endpoint.
    pub app_name: String,
    pub log_level: Option<String>,
    /// Absolute directory for rolling log files. Logging stays off when unset.
    pub log_dir: Option<PathBuf>,
    /// SQLite file for the durable backend. In-memory when unset.
    pub db_path: Option<PathBuf>,
    /// Loads the demo projects into an empty store.
    pub seed_demo_data: bool,
    /// Attribution written to `last_edited_by` on create.
    pub editor_label: Option<String>,
    pub latency: LatencyConfig,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            app_name: DEFAULT_APP_NAME.to_string(),
            log_level: None,
            log_dir: None,
            db_path: None,
            seed_demo_data: false,
            editor_label: None,
            latency: LatencyConfig::default(),
        }
    }
}

impl StoreConfig {
    /// Parses a TOML document.
    pub fn from_toml_str(raw: &str, origin: &Path) -> Result<Self, ConfigError> {
        toml::from_str(raw).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })
    }

    /// Reads and parses a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw, path)
    }

    /// Applies `MANUSCRIPT_*` process environment overrides.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    /// Applies overrides from an arbitrary lookup; blank values are ignored.
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        if let Some(path) = read(ENV_DB_PATH) {
            self.db_path = Some(PathBuf::from(path));
        }
        if let Some(level) = read(ENV_LOG_LEVEL) {
            self.log_level = Some(level);
        }
        if let Some(raw) = read(ENV_LATENCY) {
            self.latency.enabled = match raw.to_ascii_lowercase().as_str() {
                "on" | "true" | "1" => true,
                "off" | "false" | "0" => false,
                _ => {
                    return Err(ConfigError::InvalidOverride {
                        name: ENV_LATENCY,
                        value: raw,
                    })
                }
            };
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, StoreConfig, ENV_DB_PATH, ENV_LATENCY};
    use std::path::{Path, PathBuf};

    #[test]
    fn empty_document_yields_defaults() {
        let config = StoreConfig::from_toml_str("", Path::new("empty.toml")).unwrap();
        assert_eq!(config, StoreConfig::default());
        assert!(!config.latency.enabled);
        assert_eq!(config.latency.profile.create_ms, 400);
    }

    #[test]
    fn partial_latency_table_keeps_other_defaults() {
        let raw = r#"
            seed_demo_data = true
            editor_label = "Ada"

            [latency]
            enabled = true
            get_ms = 15
        "#;
        let config = StoreConfig::from_toml_str(raw, Path::new("dev.toml")).unwrap();
        assert!(config.seed_demo_data);
        assert_eq!(config.editor_label.as_deref(), Some("Ada"));
        assert!(config.latency.enabled);
        assert_eq!(config.latency.profile.get_ms, 15);
        assert_eq!(config.latency.profile.list_ms, 300);
    }

    #[test]
    fn overrides_replace_file_values() {
        let config = StoreConfig::default()
            .with_overrides(|name| match name {
                ENV_DB_PATH => Some("/tmp/projects.sqlite3".to_string()),
                ENV_LATENCY => Some("ON".to_string()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.db_path, Some(PathBuf::from("/tmp/projects.sqlite3")));
        assert!(config.latency.enabled);
    }

    #[test]
    fn unknown_latency_switch_is_rejected() {
        let err = StoreConfig::default()
            .with_overrides(|name| (name == ENV_LATENCY).then(|| "sometimes".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidOverride { .. }));
    }

    #[test]
    fn malformed_toml_reports_origin() {
        let err = StoreConfig::from_toml_str("seed_demo_data = [", Path::new("bad.toml"))
            .unwrap_err();
        assert!(err.to_string().contains("bad.toml"));
    }
}
