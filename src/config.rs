use std::env;
use std::path::PathBuf;

use thiserror::Error;
use tracing::info;

const DATA_DIR_VAR: &str = "STOREFRONT_DATA_DIR";
const MAILBOX_VAR: &str = "STOREFRONT_MAILBOX_CAPACITY";

const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_MAILBOX_CAPACITY: usize = 32;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Directory holding `products.json` and `orders.json`.
    pub data_dir: PathBuf,
    /// Queue depth of each actor's mailbox.
    pub mailbox_capacity: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            mailbox_capacity: DEFAULT_MAILBOX_CAPACITY,
        }
    }
}

impl AppConfig {
    /// Reads the process environment, after loading `.env` if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let config = Self::from_lookup(|var| env::var(var).ok())?;
        info!(
            data_dir = %config.data_dir.display(),
            mailbox_capacity = config.mailbox_capacity,
            "Configuration loaded"
        );
        Ok(config)
    }

    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    pub fn products_path(&self) -> PathBuf {
        self.data_dir.join("products.json")
    }

    pub fn orders_path(&self) -> PathBuf {
        self.data_dir.join("orders.json")
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(dir) = lookup(DATA_DIR_VAR).filter(|d| !d.trim().is_empty()) {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(raw) = lookup(MAILBOX_VAR) {
            config.mailbox_capacity = match raw.trim().parse::<usize>() {
                Ok(0) => {
                    return Err(ConfigError::Invalid {
                        var: MAILBOX_VAR,
                        reason: "must be at least 1".into(),
                    })
                }
                Ok(n) => n,
                Err(e) => {
                    return Err(ConfigError::Invalid {
                        var: MAILBOX_VAR,
                        reason: e.to_string(),
                    })
                }
            };
        }
        Ok(config)
    }
}
