//! Engine configuration

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::board::{DEFAULT_SIZE, MAX_SIZE};
use crate::error::EngineError;

/// Board and spawn settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Board edge length
    pub size: usize,
    /// Chance a spawned tile is a 4 rather than a 2
    pub four_probability: f64,
    /// Tiles placed at the start of each game
    pub start_tiles: usize,
    /// Random seed for reproducibility (None = entropy)
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_SIZE,
            four_probability: 0.2,
            start_tiles: 2,
            seed: None,
        }
    }
}

impl EngineConfig {
    pub fn with_size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if !(2..=MAX_SIZE).contains(&self.size) {
            return Err(EngineError::InvalidSize(self.size));
        }
        if !(0.0..=1.0).contains(&self.four_probability) {
            return Err(EngineError::InvalidFourProbability(self.four_probability));
        }
        let cells = self.size * self.size;
        if self.start_tiles > cells {
            return Err(EngineError::InvalidStartTiles {
                count: self.start_tiles,
                cells,
            });
        }
        Ok(())
    }

    /// Load from a JSON file; missing fields take their defaults
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: EngineConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save to JSON file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.size, 4);
        assert_eq!(config.four_probability, 0.2);
        assert_eq!(config.start_tiles, 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate() {
        assert_eq!(
            EngineConfig::default().with_size(1).validate(),
            Err(EngineError::InvalidSize(1))
        );
        assert_eq!(
            EngineConfig::default().with_size(17).validate(),
            Err(EngineError::InvalidSize(17))
        );

        let config = EngineConfig {
            four_probability: 1.5,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(EngineError::InvalidFourProbability(1.5)));

        let config = EngineConfig {
            size: 2,
            start_tiles: 5,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(EngineError::InvalidStartTiles { count: 5, cells: 4 })
        );
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: EngineConfig = serde_json::from_str(r#"{"size": 5, "seed": 9}"#).unwrap();
        assert_eq!(config.size, 5);
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.four_probability, 0.2);
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!("tilemerge-config-{}.json", std::process::id()));
        let config = EngineConfig::default().with_size(6).with_seed(3);
        config.save(&path).unwrap();
        let loaded = EngineConfig::load(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, config);
    }
}
