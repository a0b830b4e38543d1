//! # chariot-config
//!
//! Layered configuration loading for Chariot using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`CHARIOT_*` prefix, `__` as separator)
//! 2. Project-level `.chariot/config.toml`
//! 3. User-level `~/.config/chariot/config.toml`
//! 4. Built-in defaults
//!
//! Figment maps `CHARIOT_INSPECTION__QUESTION_COUNT` -> `inspection.question_count`,
//! `CHARIOT_STORE__DATA_DIR` -> `store.data_dir`, etc.
//!
//! ```no_run
//! use chariot_config::ChariotConfig;
//!
//! let config = ChariotConfig::load_with_dotenv().expect("config");
//! println!("drawing {} questions", config.inspection.question_count);
//! ```

mod error;
mod general;
mod inspection;
mod store;

pub use error::ConfigError;
pub use general::GeneralConfig;
pub use inspection::InspectionConfig;
pub use store::StoreConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Project-local config file, relative to the working directory.
pub const LOCAL_CONFIG_PATH: &str = ".chariot/config.toml";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ChariotConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub inspection: InspectionConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

impl ChariotConfig {
    /// Load configuration from TOML files and environment variables, then
    /// validate it.
    ///
    /// Does NOT call `dotenvy`; use [`Self::load_with_dotenv`] for `.env` support.
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment().extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load `.env` from the working directory, then [`Self::load`].
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Build the figment provider chain.
    ///
    /// Public so callers can merge further providers (CLI flags) on top.
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        let local_path = PathBuf::from(LOCAL_CONFIG_PATH);
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed("CHARIOT_").split("__"))
    }

    /// Reject values no inspection could run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.inspection.question_count == 0 {
            return Err(ConfigError::InvalidValue {
                field: "inspection.question_count".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if self.store.data_dir.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "store.data_dir".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        if self.general.placeholder_operator.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "general.placeholder_operator".to_string(),
                reason: "must not be blank".to_string(),
            });
        }
        Ok(())
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("chariot").join("config.toml"))
    }
}
