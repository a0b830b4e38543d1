//! Record store and change-log locations.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

fn default_data_dir() -> PathBuf {
    PathBuf::from(".chariot/data")
}

fn default_trail_dir() -> PathBuf {
    PathBuf::from(".chariot/trail")
}

const fn default_trail_enabled() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    /// Directory holding one JSON document per collection.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Directory for daily JSONL change-log files.
    #[serde(default = "default_trail_dir")]
    pub trail_dir: PathBuf,

    #[serde(default = "default_trail_enabled")]
    pub trail_enabled: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            trail_dir: default_trail_dir(),
            trail_enabled: default_trail_enabled(),
        }
    }
}
