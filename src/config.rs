//! Level configuration
//!
//! Declarative description of a level: grid dimensions, generation strategy,
//! seed, and the AI tuning to hand the horde. Supports saving and loading in
//! RON and JSON formats so levels are reproducible across runs.

use std::fs;
use std::path::Path;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::ai::{BehaviorConfig, Steering};
use crate::world::GameMap;

/// Which generation strategy to run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GeneratorKind {
    /// Randomized DFS maze with dead-end braiding
    Maze { braid_probability: f32 },
    /// BSP dungeon with MST corridors
    Dungeon { min_room_size: usize },
}

/// A reproducible level description
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelConfig {
    /// Grid width in tiles
    pub cols: usize,
    /// Grid height in tiles
    pub rows: usize,
    /// World units per tile
    pub tile_size: f32,
    /// Generation seed; the same config always yields the same level
    pub seed: u64,
    pub generator: GeneratorKind,
    /// Steering tuning for the horde
    #[serde(default)]
    pub steering: Steering,
    /// Behavior thresholds for the horde
    #[serde(default)]
    pub behavior: BehaviorConfig,
    /// How many agents the demo spawns
    #[serde(default = "default_agent_count")]
    pub agents: usize,
}

fn default_agent_count() -> usize {
    4
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            cols: 20,
            rows: 20,
            tile_size: 10.0,
            seed: 42,
            generator: GeneratorKind::Maze {
                braid_probability: 0.3,
            },
            steering: Steering::default(),
            behavior: BehaviorConfig::default(),
            agents: default_agent_count(),
        }
    }
}

impl LevelConfig {
    /// Generate the level this config describes
    ///
    /// # Errors
    ///
    /// Returns an error for degenerate dimensions
    pub fn build_map(&self) -> Result<GameMap, ConfigError> {
        if self.cols == 0 || self.rows == 0 {
            return Err(ConfigError::Invalid(format!(
                "grid must be non-empty, got {}x{}",
                self.cols, self.rows
            )));
        }
        if self.tile_size <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "tile size must be positive, got {}",
                self.tile_size
            )));
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let map = match self.generator {
            GeneratorKind::Maze { braid_probability } => GameMap::generate_maze(
                self.cols,
                self.rows,
                self.tile_size,
                braid_probability,
                &mut rng,
            ),
            GeneratorKind::Dungeon { min_room_size } => GameMap::generate_dungeon(
                self.cols,
                self.rows,
                self.tile_size,
                min_room_size,
                &mut rng,
            ),
        };
        Ok(map)
    }

    /// Save the config to a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or serialization fails
    pub fn save_ron(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let ron_string = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;
        fs::write(path, ron_string).map_err(|e| ConfigError::IoError(e.to_string()))?;
        Ok(())
    }

    /// Load a config from a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or deserialization fails
    pub fn load_ron(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        let config: LevelConfig =
            ron::from_str(&content).map_err(|e| ConfigError::DeserializeError(e.to_string()))?;
        Ok(config)
    }

    /// Save the config to a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or serialization fails
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json_string = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;
        fs::write(path, json_string).map_err(|e| ConfigError::IoError(e.to_string()))?;
        Ok(())
    }

    /// Load a config from a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or deserialization fails
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        let config: LevelConfig = serde_json::from_str(&content)
            .map_err(|e| ConfigError::DeserializeError(e.to_string()))?;
        Ok(config)
    }
}

/// Errors that can occur during config operations
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// IO error
    IoError(String),
    /// Serialization error
    SerializeError(String),
    /// Deserialization error
    DeserializeError(String),
    /// The config describes an impossible level
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IoError(e) => write!(f, "IO error: {e}"),
            Self::SerializeError(e) => write!(f, "Serialization error: {e}"),
            Self::DeserializeError(e) => write!(f, "Deserialization error: {e}"),
            Self::Invalid(e) => write!(f, "Invalid config: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}
