use anyhow::{Context, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use shellexpand;
use std::path::{Path, PathBuf};

use crate::filter::{FilterCriteria, Selection};
use crate::github::DEFAULT_USER_AGENT;

/// Main configuration structure for gistcrawl
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    /// Root directory the per-user output trees are written under
    #[serde(default = "default_output_directory")]
    pub output_directory: String,

    /// Default file filtering for import mode (overridable per run from
    /// the command line)
    #[serde(default)]
    pub filter: FilterSettings,

    /// Gist API endpoint settings
    #[serde(default)]
    pub network: NetworkConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// File filtering configuration, as written in the config file.
///
/// `"*"` entries (or empty lists) mean "match everything" and a
/// `max_size` of zero or below means unlimited; `criteria()` applies
/// those defaults once, at this boundary.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FilterSettings {
    /// Allowed MIME types, e.g. "application/x-python", "text/plain"
    #[serde(default = "default_wildcard")]
    pub types: Vec<String>,

    /// Allowed language labels, e.g. "C", "Ruby", "Python"
    #[serde(default = "default_wildcard")]
    pub languages: Vec<String>,

    /// Maximum file size in bytes (<= 0 means unlimited)
    #[serde(default = "default_max_size")]
    pub max_size: i64,
}

/// Gist API endpoint configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct NetworkConfig {
    /// Client identification sent with every request; the API rejects
    /// requests without one
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Listing API base URL
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String, // "info"

    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,
}

// Default value functions
fn default_output_directory() -> String {
    "out".to_string()
}
fn default_wildcard() -> Vec<String> {
    vec!["*".to_string()]
}
fn default_max_size() -> i64 {
    -1
}
fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}
fn default_api_base() -> String {
    "https://api.github.com".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_true() -> bool {
    true
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            types: default_wildcard(),
            languages: default_wildcard(),
            max_size: default_max_size(),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            api_base: default_api_base(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            color: default_true(),
        }
    }
}

impl FilterSettings {
    /// Resolve the configured lists into match criteria
    pub fn criteria(&self) -> FilterCriteria {
        FilterCriteria {
            types: Selection::from_list(&self.types),
            languages: Selection::from_list(&self.languages),
            max_size: if self.max_size > 0 {
                Some(self.max_size as u64)
            } else {
                None
            },
        }
    }
}

impl Config {
    /// Load configuration from the default location or create a default config
    pub fn load_or_default() -> Result<Self> {
        let config_path = Self::default_config_path()?;

        if config_path.exists() {
            Self::load(&config_path)
        } else {
            // Create default config
            let config = Self::default();

            // Create config directory if it doesn't exist
            if let Some(parent) = config_path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
            }

            // Save default config
            config.save(&config_path)?;

            tracing::info!("Created default configuration at: {:?}", config_path);
            Ok(config)
        }
    }

    /// Load configuration from a specific file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let mut config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        // Expand environment variables in paths
        config.expand_paths()?;

        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self).context("Failed to serialize configuration")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;

        Ok(())
    }

    /// Get the default configuration file path (XDG compliant)
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = config_dir().context("Failed to get user config directory")?;

        Ok(config_dir.join("gistcrawl").join("config.yml"))
    }

    /// Expand environment variables in configuration paths
    pub fn expand_paths(&mut self) -> Result<()> {
        self.output_directory = shellexpand::full(&self.output_directory)
            .context("Failed to expand output_directory path")?
            .into_owned();

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_directory: default_output_directory(),
            filter: FilterSettings::default(),
            network: NetworkConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}
