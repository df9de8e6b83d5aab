//! # Error Types
//!
//! Errors reported by block storage, the chunk registry, terrain generation and
//! configuration loading. None of them are fatal: every failure is confined to
//! the chunk or call that produced it.

use std::path::PathBuf;

use thiserror::Error;

use super::voxels::chunk::ChunkCoord;

/// A cell access fell outside a chunk's block grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GridError {
    /// At least one coordinate was negative or not less than its dimension.
    #[error("block ({x}, {y}, {z}) is outside the chunk grid")]
    OutOfRange {
        /// Requested x
        x: i64,
        /// Requested y
        y: i64,
        /// Requested z
        z: i64,
    },
}

/// Errors produced by world-level queries and chunk generation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorldError {
    /// The chunk owning the queried block is absent or still generating.
    #[error("chunk {0} is not loaded")]
    Missing(ChunkCoord),

    /// The queried block lies outside the vertical extent of the world.
    #[error("world block ({x}, {y}, {z}) is out of range")]
    OutOfRange {
        /// World x
        x: i32,
        /// World y
        y: i32,
        /// World z
        z: i32,
    },

    /// Noise or height computation produced a non-finite or unusable value.
    #[error("invalid generation input: {0}")]
    InvalidGenerationInput(String),

    /// Generation for the chunk was cancelled before it was published.
    #[error("generation of chunk {0} was cancelled")]
    Cancelled(ChunkCoord),
}

/// Errors raised while loading a [`WorldConfig`](crate::config::WorldConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// Path that was read
        path: PathBuf,
        /// Underlying IO failure
        #[source]
        source: std::io::Error,
    },

    /// The configuration was not valid JSON for the expected schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// The configuration parsed but holds unusable values.
    #[error("invalid config: {0}")]
    Invalid(String),
}
