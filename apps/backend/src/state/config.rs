//! # Application Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     NAMAA_DATABASE_PATH=/data/namaa.db                                  │
//! │     NAMAA_LOW_STOCK_THRESHOLD=3                                         │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/pos/config.toml (Linux)                                   │
//! │     ~/Library/Application Support/ly.namaa.pos/config.toml (macOS)     │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! database_path = "/var/lib/namaa/namaa.db"
//! low_stock_threshold = 5
//! expiry_warning_days = 30
//! stock_write_retries = 5
//! currency_symbol = "LYD"
//! currency_decimals = 3
//! request_persistence = true
//! ```
//!
//! Read-only after boot.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info, warn};

use namaa_core::reports::{ReportOptions, DEFAULT_EXPIRY_WARNING_DAYS, DEFAULT_LOW_STOCK_THRESHOLD};

const ENV_PREFIX: &str = "NAMAA_";
const CONFIG_FILE: &str = "config.toml";
const DATABASE_FILE: &str = "namaa.db";

/// Most decimal places `currency_decimals` may ask for.
pub const MAX_CURRENCY_DECIMALS: u8 = 6;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Backend configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// SQLite file. `None` resolves to the platform data directory.
    pub database_path: Option<PathBuf>,

    /// Products with stock below this are flagged.
    pub low_stock_threshold: i64,

    /// Products expiring within this many days are flagged.
    pub expiry_warning_days: i64,

    /// Attempts per stock write before giving up on a conflict.
    pub stock_write_retries: u32,

    pub currency_symbol: String,
    pub currency_decimals: u8,

    /// Ask for the data directory to be created and kept at boot.
    pub request_persistence: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            database_path: None,
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
            expiry_warning_days: DEFAULT_EXPIRY_WARNING_DAYS,
            stock_write_retries: 5,
            currency_symbol: "LYD".to_string(),
            currency_decimals: 3,
            request_persistence: true,
        }
    }
}

impl AppConfig {
    /// Loads defaults, then the config file (if present), then `NAMAA_*`
    /// environment variables, and validates the result.
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_overrides(|key| std::env::var(format!("{}{}", ENV_PREFIX, key)).ok());
        config.validate()?;

        Ok(config)
    }

    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load config: {}. Using defaults.", e);
            Self::default()
        })
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.low_stock_threshold < 0 {
            return Err(ConfigError::Invalid(
                "low_stock_threshold must not be negative".to_string(),
            ));
        }
        if self.expiry_warning_days < 0 {
            return Err(ConfigError::Invalid(
                "expiry_warning_days must not be negative".to_string(),
            ));
        }
        if self.stock_write_retries == 0 {
            return Err(ConfigError::Invalid(
                "stock_write_retries must be at least 1".to_string(),
            ));
        }
        if self.currency_decimals > MAX_CURRENCY_DECIMALS {
            return Err(ConfigError::Invalid(format!(
                "currency_decimals must be at most {}",
                MAX_CURRENCY_DECIMALS
            )));
        }
        Ok(())
    }

    /// Applies overrides looked up by key (without the `NAMAA_` prefix).
    /// Unparseable values are logged and ignored.
    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("DATABASE_PATH") {
            self.database_path = Some(PathBuf::from(path));
        }
        if let Some(v) = lookup("LOW_STOCK_THRESHOLD") {
            parse_into(&v, "LOW_STOCK_THRESHOLD", &mut self.low_stock_threshold);
        }
        if let Some(v) = lookup("EXPIRY_WARNING_DAYS") {
            parse_into(&v, "EXPIRY_WARNING_DAYS", &mut self.expiry_warning_days);
        }
        if let Some(v) = lookup("STOCK_WRITE_RETRIES") {
            parse_into(&v, "STOCK_WRITE_RETRIES", &mut self.stock_write_retries);
        }
        if let Some(v) = lookup("CURRENCY_SYMBOL") {
            self.currency_symbol = v;
        }
        if let Some(v) = lookup("CURRENCY_DECIMALS") {
            parse_into(&v, "CURRENCY_DECIMALS", &mut self.currency_decimals);
        }
        if let Some(v) = lookup("REQUEST_PERSISTENCE") {
            parse_into(&v, "REQUEST_PERSISTENCE", &mut self.request_persistence);
        }
    }

    fn project_dirs() -> Option<directories::ProjectDirs> {
        directories::ProjectDirs::from("ly", "namaa", "pos")
    }

    fn default_config_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    /// The configured store path, or `<data dir>/namaa.db`.
    pub fn resolve_database_path(&self) -> ConfigResult<PathBuf> {
        if let Some(path) = &self.database_path {
            return Ok(path.clone());
        }
        Self::project_dirs()
            .map(|dirs| dirs.data_dir().join(DATABASE_FILE))
            .ok_or_else(|| ConfigError::Invalid("Could not determine app data directory".to_string()))
    }

    pub fn report_options(&self) -> ReportOptions {
        ReportOptions {
            low_stock_threshold: self.low_stock_threshold,
            expiry_warning: chrono::Duration::days(self.expiry_warning_days),
        }
    }

    /// Formats a dirham amount as a currency string, e.g. `12.500 LYD`.
    /// Used for amounts in log lines.
    pub fn format_currency(&self, minor: i64) -> String {
        let decimals = self.currency_decimals.min(MAX_CURRENCY_DECIMALS);
        let divisor = 10_i64.pow(decimals as u32);
        let whole = (minor / divisor).abs();
        let frac = (minor % divisor).abs();
        let sign = if minor < 0 { "-" } else { "" };

        if decimals > 0 {
            format!(
                "{}{}.{:0width$} {}",
                sign,
                whole,
                frac,
                self.currency_symbol,
                width = decimals as usize
            )
        } else {
            format!("{}{} {}", sign, whole, self.currency_symbol)
        }
    }
}

fn parse_into<T: std::str::FromStr>(raw: &str, key: &str, slot: &mut T) {
    match raw.trim().parse() {
        Ok(v) => *slot = v,
        Err(_) => warn!(key = %format!("{}{}", ENV_PREFIX, key), value = raw, "Ignoring unparseable override"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.low_stock_threshold, 5);
        assert_eq!(config.expiry_warning_days, 30);
        assert_eq!(config.stock_write_retries, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_file_then_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "low_stock_threshold = 10\ncurrency_symbol = \"LD\"\n",
        )
        .unwrap();

        // Only keys no other test in this module reads back.
        let env = [
            ("NAMAA_LOW_STOCK_THRESHOLD", "2"),
            ("NAMAA_DATABASE_PATH", "/tmp/x.db"),
            ("NAMAA_STOCK_WRITE_RETRIES", "lots"),
        ];
        for (key, value) in env {
            std::env::set_var(key, value);
        }
        let loaded = AppConfig::load(Some(path));
        for (key, _) in env {
            std::env::remove_var(key);
        }
        let config = loaded.unwrap();

        assert_eq!(config.low_stock_threshold, 2);
        assert_eq!(config.database_path, Some(PathBuf::from("/tmp/x.db")));
        // Unparseable override ignored, key absent from the file: default.
        assert_eq!(config.stock_write_retries, 5);
        // From the file, no override.
        assert_eq!(config.currency_symbol, "LD");
    }

    #[test]
    fn test_load_from_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "expiry_warning_days = 7\n").unwrap();

        let config = AppConfig::load(Some(path)).unwrap();
        assert_eq!(config.expiry_warning_days, 7);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "low_stock_threshold = \"five\"\n").unwrap();

        assert!(matches!(AppConfig::load(Some(path.clone())), Err(ConfigError::Parse(_))));
        assert_eq!(AppConfig::load_or_default(Some(path)).low_stock_threshold, 5);
    }

    #[test]
    fn test_validation() {
        let config = AppConfig {
            stock_write_retries: 0,
            ..AppConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let config = AppConfig {
            currency_decimals: 19,
            ..AppConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
        assert_eq!(config.format_currency(1), "0.000001 LYD");
    }

    #[test]
    fn test_format_currency() {
        let config = AppConfig::default();
        assert_eq!(config.format_currency(12_500), "12.500 LYD");
        assert_eq!(config.format_currency(5), "0.005 LYD");
        assert_eq!(config.format_currency(-1_250), "-1.250 LYD");
    }

    #[test]
    fn test_explicit_database_path_wins() {
        let config = AppConfig {
            database_path: Some(PathBuf::from("/srv/shop.db")),
            ..AppConfig::default()
        };
        assert_eq!(config.resolve_database_path().unwrap(), PathBuf::from("/srv/shop.db"));
    }
}
