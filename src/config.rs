//! # World Configuration
//!
//! Settings for a voxel world, loaded from JSON. Every field has a default, so an
//! empty object (`{}`) is a complete configuration:
//!
//! ```json
//! {
//!     "dimensions": { "width": 32, "height": 256 },
//!     "seed": 1337,
//!     "terrain": { "frequency": 0.015625, "octaves": 3, "base": 0.1 },
//!     "render_distance": 2,
//!     "workers": 4
//! }
//! ```

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::engine_state::{
    error::ConfigError,
    voxels::{
        chunk::ChunkDimensions,
        terrain::{TerrainGenerator, TerrainParams},
    },
};

/// Default number of chunks loaded in each direction around the focus chunk.
pub const DEFAULT_RENDER_DISTANCE: i32 = 2;

/// Default number of task worker threads.
pub const DEFAULT_WORKERS: usize = 4;

/// Complete configuration of one world.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Size of every chunk
    pub dimensions: ChunkDimensions,
    /// World seed fed to the noise generator
    pub seed: u32,
    /// Terrain shape and block palette
    pub terrain: TerrainParams,
    /// Chunks loaded in each direction around the focus chunk
    pub render_distance: i32,
    /// Task worker threads; `0` runs generation and meshing inline
    pub workers: usize,
}

impl Default for WorldConfig {
    fn default() -> Self {
        WorldConfig {
            dimensions: ChunkDimensions::default(),
            seed: 0,
            terrain: TerrainParams::default(),
            render_distance: DEFAULT_RENDER_DISTANCE,
            workers: DEFAULT_WORKERS,
        }
    }
}

impl WorldConfig {
    /// Parses and validates a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: WorldConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Rejects configurations a world cannot be built from.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dimensions.width == 0 || self.dimensions.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "chunk dimensions must be non-zero, got {}x{}",
                self.dimensions.width, self.dimensions.height
            )));
        }
        if self.dimensions.height > i32::MAX as usize || self.dimensions.width > u16::MAX as usize {
            return Err(ConfigError::Invalid(format!(
                "chunk dimensions {}x{} are too large",
                self.dimensions.width, self.dimensions.height
            )));
        }
        if self.render_distance < 0 {
            return Err(ConfigError::Invalid(format!(
                "render_distance must not be negative, got {}",
                self.render_distance
            )));
        }
        TerrainGenerator::new(self.dimensions, self.terrain.clone())
            .map(|_| ())
            .map_err(|error| ConfigError::Invalid(error.to_string()))
    }
}
