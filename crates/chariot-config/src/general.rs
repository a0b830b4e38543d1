//! General application configuration.

use serde::{Deserialize, Serialize};

const fn default_limit() -> u32 {
    20
}

fn default_placeholder_operator() -> String {
    "Operator".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneralConfig {
    /// Default result limit for list commands.
    #[serde(default = "default_limit")]
    pub default_limit: u32,

    /// Operator label used when no identity can be resolved.
    #[serde(default = "default_placeholder_operator")]
    pub placeholder_operator: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            placeholder_operator: default_placeholder_operator(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = GeneralConfig::default();
        assert_eq!(config.default_limit, 20);
        assert_eq!(config.placeholder_operator, "Operator");
    }
}
