//! Engine configuration.
//!
//! Every field has a default, so `{}` is a complete configuration.

use serde::{Deserialize, Serialize};

/// How dislodged units are placed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetreatMode {
    /// The engine picks a retreat for every dislodged unit within the movement turn.
    #[default]
    Automatic,
    /// Dislodged units wait for their owner's choice in a retreat phase.
    Deferred,
}

/// Errors raised when loading a configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid engine config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("victory threshold must be at least 1")]
    ZeroVictoryThreshold,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub retreats: RetreatMode,
    /// Whether an autumn turn is followed by a build phase.
    pub builds: bool,
    /// Supply centers a single player needs to win. None disables victory checks.
    pub victory_supply_centers: Option<usize>,
    pub start_year: u16,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            retreats: RetreatMode::Automatic,
            builds: true,
            victory_supply_centers: None,
            start_year: 1901,
        }
    }
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        if config.victory_supply_centers == Some(0) {
            return Err(ConfigError::ZeroVictoryThreshold);
        }
        Ok(config)
    }
}
