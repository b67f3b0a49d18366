use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{PingieError, Result};

/// Production endpoint of the push service.
pub const DEFAULT_BASE_URL: &str = "https://notifypush.pingie.com/notify-json";

/// Fixed request timeout for validation and delivery.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Top-level configuration.
///
/// Loaded from `~/.pingie/config.toml` by default. Every section falls back to
/// its defaults when absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PingieConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

impl PingieConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: PingieConfig = toml::from_str(&content)?;
        config.validate()?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration, falling back to defaults if the file is missing or
    /// invalid.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Reject values the transport cannot work with.
    pub fn validate(&self) -> Result<()> {
        let base = self.api.base_url.trim();
        if base.is_empty() {
            return Err(PingieError::Config("api.base_url must not be empty".into()));
        }
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(PingieError::Config(format!(
                "api.base_url must be an http(s) URL, got {}",
                base
            )));
        }
        if self.api.timeout_secs == 0 {
            return Err(PingieError::Config(
                "api.timeout_secs must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

/// Push endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL; the device/group id is appended as the final path segment.
    pub base_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error. `RUST_LOG` overrides it.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Where committed config entries are kept.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub entries_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            entries_path: "~/.pingie/entries.toml".to_string(),
        }
    }
}

impl StorageConfig {
    /// Entries path with a leading `~/` expanded against `HOME`.
    pub fn resolved_entries_path(&self) -> PathBuf {
        expand_home(&self.entries_path)
    }
}

/// Resolve the configuration file path.
///
/// Priority: `PINGIE_CONFIG` env var > `~/.pingie/config.toml`.
pub fn resolve_config_path() -> PathBuf {
    if let Ok(p) = std::env::var("PINGIE_CONFIG") {
        return PathBuf::from(p);
    }
    expand_home("~/.pingie/config.toml")
}

fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        #[cfg(target_os = "windows")]
        if let Ok(home) = std::env::var("USERPROFILE") {
            return PathBuf::from(home).join(rest);
        }
        #[cfg(not(target_os = "windows"))]
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(rest);
        }
        return PathBuf::from(rest);
    }
    PathBuf::from(path)
}
