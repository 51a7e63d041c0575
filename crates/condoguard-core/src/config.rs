//! Application configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/condoguard/config.toml)
//! 3. Environment variables (CONDOGUARD_* prefix)
//!
//! Environment variables take precedence over config file values.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable prefix
const ENV_PREFIX: &str = "CONDOGUARD";

/// Advisory capacity of the register, in records
pub const DEFAULT_CAPACITY: usize = 200;

/// Usage percentage at which the register is reported as critical
pub const DEFAULT_USAGE_WARNING_PERCENT: f64 = 85.0;

/// Report window: six 30-day months
pub const DEFAULT_REPORT_WINDOW_DAYS: i64 = 6 * 30;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory for the resident database
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Directory where generated PDFs are written (defaults to the working directory)
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    /// Log file path (defaults to {data_dir}/debug.log)
    #[serde(default)]
    pub log_file: Option<PathBuf>,

    /// Shared administrator password
    #[serde(default = "default_admin_password")]
    pub admin_password: String,

    /// Advisory record capacity shown in the usage gauge
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    /// Percentage of capacity at which usage is flagged as critical
    #[serde(default = "default_usage_warning_percent")]
    pub usage_warning_percent: f64,

    /// Residents created within this many days are included in the report
    #[serde(default = "default_report_window_days")]
    pub report_window_days: i64,

    /// Title printed in the header bar of every card
    #[serde(default = "default_card_title")]
    pub card_title: String,

    /// Footer line printed on cards and report pages
    #[serde(default = "default_footer_text")]
    pub footer_text: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            output_dir: None,
            log_file: None,
            admin_password: default_admin_password(),
            capacity: default_capacity(),
            usage_warning_percent: default_usage_warning_percent(),
            report_window_days: default_report_window_days(),
            card_title: default_card_title(),
            footer_text: default_footer_text(),
        }
    }
}

impl Config {
    /// Load configuration from default location and environment
    ///
    /// Order of precedence (highest to lowest):
    /// 1. Environment variables (CONDOGUARD_DATA_DIR, CONDOGUARD_OUTPUT_DIR)
    /// 2. Config file (~/.config/condoguard/config.toml or CONDOGUARD_CONFIG)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load configuration, preferring a path given on the command line
    pub fn load_with_cli_override(path: Option<&PathBuf>) -> Result<Self> {
        match path {
            Some(p) => Self::load_from_path(p),
            None => Self::load(),
        }
    }

    /// Load configuration from a specific path
    ///
    /// Environment variables are still applied as overrides.
    /// If the file doesn't exist, defaults are used.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        config.ensure_data_dir()?;
        Ok(config)
    }

    /// Load configuration from a TOML string (useful for testing)
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(toml_content).context("Failed to parse config TOML")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        // CONDOGUARD_DATA_DIR
        if let Ok(val) = std::env::var(format!("{}_DATA_DIR", ENV_PREFIX)) {
            self.data_dir = PathBuf::from(val);
        }

        // CONDOGUARD_OUTPUT_DIR
        if let Ok(val) = std::env::var(format!("{}_OUTPUT_DIR", ENV_PREFIX)) {
            self.output_dir = if val.is_empty() {
                None
            } else {
                Some(PathBuf::from(val))
            };
        }
    }

    /// Ensure data directory exists
    fn ensure_data_dir(&self) -> Result<()> {
        if !self.data_dir.exists() {
            std::fs::create_dir_all(&self.data_dir)
                .with_context(|| format!("Failed to create data directory: {:?}", self.data_dir))?;
        }
        Ok(())
    }

    /// Save configuration to the default config file
    pub fn save(&self) -> Result<()> {
        self.save_to_path(&Self::config_file_path())
    }

    /// Save configuration to a specific file
    pub fn save_to_path(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;
        Ok(())
    }

    /// Get the config file path
    ///
    /// Can be overridden with CONDOGUARD_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("condoguard")
            .join("config.toml")
    }

    /// Directory generated documents are written to
    pub fn output_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }

    /// Get the path to the log file
    pub fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| self.data_dir.join("debug.log"))
    }
}

/// Get the default data directory
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("condoguard")
}

fn default_admin_password() -> String {
    "1234".to_string()
}

fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}

fn default_usage_warning_percent() -> f64 {
    DEFAULT_USAGE_WARNING_PERCENT
}

fn default_report_window_days() -> i64 {
    DEFAULT_REPORT_WINDOW_DAYS
}

fn default_card_title() -> String {
    "FICHA DE CONTROLE DE ACESSO - CONDOGUARD PRO".to_string()
}

fn default_footer_text() -> String {
    "CONDOGUARD PRO | GESTÃO RESIDENCIAL".to_string()
}
