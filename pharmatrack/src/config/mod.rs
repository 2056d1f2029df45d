use crate::error::{PharmaTrackError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file looked up in the working directory when none is named.
pub const DEFAULT_CONFIG_FILE: &str = "pharmatrack.yaml";

pub const ENV_DATABASE: &str = "PHARMATRACK_DB";
pub const ENV_EXPORT_DIR: &str = "PHARMATRACK_EXPORT_DIR";

/// Tracker settings, read from `pharmatrack.yaml`. Every key is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrackerConfig {
    /// SQLite database file
    pub database: PathBuf,
    /// Default window for the "expiring soon" report, in days
    pub expiring_days: u32,
    /// Default cut-off for the low stock report
    pub low_stock_threshold: u32,
    /// Directory that receives default-named CSV exports
    pub export_dir: PathBuf,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        TrackerConfig {
            database: PathBuf::from("pharmacy.db"),
            expiring_days: 30,
            low_stock_threshold: 5,
            export_dir: PathBuf::from("."),
        }
    }
}

impl TrackerConfig {
    /// Resolve the configuration: an explicitly named file must exist; otherwise
    /// `pharmatrack.yaml` is used when present, falling back to defaults.
    /// Environment overrides are applied last.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let config = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(PharmaTrackError::Config(format!(
                        "config file not found: {}",
                        path.display()
                    )));
                }
                parse_config(path)?
            }
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.exists() {
                    parse_config(fallback)?
                } else {
                    TrackerConfig::default()
                }
            }
        };
        Ok(config.with_overrides(|key| std::env::var(key).ok()))
    }

    /// Apply overrides from a variable lookup (normally the process environment).
    /// Blank values are ignored.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(db) = non_blank(ENV_DATABASE) {
            log::debug!("{ENV_DATABASE} overrides database path: {db}");
            self.database = PathBuf::from(db);
        }
        if let Some(dir) = non_blank(ENV_EXPORT_DIR) {
            self.export_dir = PathBuf::from(dir);
        }
        self
    }
}

/// Parse a config file
pub fn parse_config(path: &Path) -> Result<TrackerConfig> {
    let content = std::fs::read_to_string(path)?;
    parse_config_str(&content)
}

/// Parse config YAML. An empty document yields the defaults.
pub fn parse_config_str(content: &str) -> Result<TrackerConfig> {
    if content.trim().is_empty() {
        return Ok(TrackerConfig::default());
    }
    let config: TrackerConfig = serde_yaml::from_str(content)?;
    Ok(config)
}
