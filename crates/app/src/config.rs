use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use common::config::ResolverConfig;

pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Operator configuration, read from a TOML file:
///
/// ```toml
/// log_level = "debug"
///
/// [resolver]
/// required_permission = "READ"
/// admin_role = "ROLE_ADMIN"   # "" disables the administrator bypass
/// owner_grants_all = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Default log directive, overridden by RUST_LOG
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub resolver: ResolverConfig,
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            resolver: ResolverConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load the config at `path`. No path, or a path that does not
    ///  exist, yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) if path.exists() => Self::from_toml(&fs::read_to_string(path)?),
            _ => Ok(Self::default()),
        }
    }

    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    /// The configured level, falling back to the default on junk
    pub fn level(&self) -> tracing::Level {
        self.log_level.parse().unwrap_or(tracing::Level::WARN)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),
}
