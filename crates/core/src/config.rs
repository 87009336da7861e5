//! Tunables for floor generation, strikes and collision, loadable from JSON.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("config is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Depth gates and per-tile chances for the ore pass.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OreTable {
    pub copper_min_depth: u8,
    pub iron_min_depth: u8,
    pub gold_min_depth: u8,
    pub copper_chance: f32,
    pub iron_chance: f32,
    pub gold_chance: f32,
}

impl Default for OreTable {
    fn default() -> Self {
        Self {
            copper_min_depth: 1,
            iron_min_depth: 20,
            gold_min_depth: 40,
            copper_chance: 0.18,
            iron_chance: 0.12,
            gold_chance: 0.06,
        }
    }
}

/// Cumulative thresholds for the rock pass; anything above `hard_below` is a normal rock.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RockTable {
    pub huge_below: f32,
    pub hard_below: f32,
}

impl Default for RockTable {
    fn default() -> Self {
        Self { huge_below: 0.08, hard_below: 0.25 }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MineConfig {
    pub tile_size: f32,
    /// `None` draws a fresh layout on every visit; `Some` makes each depth reproducible.
    pub seed: Option<u64>,
    pub extra_stairs_min: usize,
    pub extra_stairs_max: usize,
    pub candidate_density: f32,
    pub candidate_cap: usize,
    pub hit_radius_factor: f32,
    pub obstacle_radius_factor: f32,
    pub stairs_radius_factor: f32,
    pub ore: OreTable,
    pub rocks: RockTable,
}

impl Default for MineConfig {
    fn default() -> Self {
        Self {
            tile_size: 16.0,
            seed: None,
            extra_stairs_min: 2,
            extra_stairs_max: 5,
            candidate_density: 0.30,
            candidate_cap: 300,
            hit_radius_factor: 0.6,
            obstacle_radius_factor: 0.75,
            stairs_radius_factor: 1.2,
            ore: OreTable::default(),
            rocks: RockTable::default(),
        }
    }
}

impl MineConfig {
    pub fn seeded(seed: u64) -> Self {
        Self { seed: Some(seed), ..Self::default() }
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.tile_size > 0.0) {
            return Err(ConfigError::Invalid {
                field: "tile_size",
                reason: format!("must be positive, got {}", self.tile_size),
            });
        }
        if self.extra_stairs_min > self.extra_stairs_max {
            return Err(ConfigError::Invalid {
                field: "extra_stairs_min",
                reason: format!(
                    "{} exceeds extra_stairs_max {}",
                    self.extra_stairs_min, self.extra_stairs_max
                ),
            });
        }
        let chances = [
            ("candidate_density", self.candidate_density),
            ("ore.copper_chance", self.ore.copper_chance),
            ("ore.iron_chance", self.ore.iron_chance),
            ("ore.gold_chance", self.ore.gold_chance),
            ("rocks.huge_below", self.rocks.huge_below),
            ("rocks.hard_below", self.rocks.hard_below),
        ];
        for (field, value) in chances {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("probability {value} is outside [0, 1]"),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults_for_missing_fields() {
        let config = MineConfig::from_json_str(r#"{ "seed": 7, "ore": { "gold_chance": 0.5 } }"#)
            .expect("partial config should parse");
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.ore.gold_chance, 0.5);
        assert_eq!(config.ore.iron_min_depth, 20);
        assert_eq!(config.tile_size, 16.0);
        assert_eq!(config.extra_stairs_max, 5);
    }

    #[test]
    fn rejects_inverted_stair_bounds() {
        let err = MineConfig::from_json_str(r#"{ "extra_stairs_min": 6, "extra_stairs_max": 2 }"#)
            .expect_err("min above max should be rejected");
        assert!(matches!(err, ConfigError::Invalid { field: "extra_stairs_min", .. }));
    }

    #[test]
    fn rejects_probabilities_outside_unit_range() {
        let err = MineConfig::from_json_str(r#"{ "rocks": { "hard_below": 1.5 } }"#)
            .expect_err("probability above one should be rejected");
        assert!(err.to_string().contains("rocks.hard_below"), "unexpected message: {err}");
    }
}
