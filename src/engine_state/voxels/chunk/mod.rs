//! # Chunk Module
//!
//! This module provides the `Chunk` struct and related functionality for managing
//! `width × width × height` columns of voxel data.
//!
//! ## Layout
//!
//! - [`block_grid`]: dense, bounds-checked block storage for one chunk
//! - [`coordinates`]: world ↔ (chunk, local) coordinate mapping
//!
//! Chunks tile the world horizontally; a chunk coordinate is a signed `(x, z)`
//! pair and every chunk spans the full height of the world.

use std::fmt;

use serde::{Deserialize, Serialize};

pub mod block_grid;
pub mod coordinates;

pub use block_grid::BlockGrid;
pub use coordinates::ChunkDimensions;

use crate::engine_state::{
    error::GridError,
    voxels::block::Block,
};

/// Position of a chunk in chunk coordinates (not block coordinates).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkCoord {
    /// Chunk index along world x.
    pub x: i32,
    /// Chunk index along world z.
    pub z: i32,
}

impl ChunkCoord {
    /// Creates a chunk coordinate.
    pub const fn new(x: i32, z: i32) -> Self {
        ChunkCoord { x, z }
    }

    /// Coordinates of every chunk within `radius` chunks of `self` (a square),
    /// nearest rings first. Coordinates past the `i32` range are skipped.
    pub fn square_around(self, radius: i32) -> Vec<ChunkCoord> {
        let radius = radius.max(0);
        let mut rings = Vec::new();
        for dx in -radius..=radius {
            for dz in -radius..=radius {
                if let (Some(x), Some(z)) = (self.x.checked_add(dx), self.z.checked_add(dz)) {
                    rings.push((dx.abs().max(dz.abs()), ChunkCoord::new(x, z)));
                }
            }
        }
        rings.sort_by_key(|&(ring, c)| (ring, c.x, c.z));
        rings.into_iter().map(|(_, c)| c).collect()
    }
}

impl fmt::Display for ChunkCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}

/// A generated chunk: its coordinate plus its block grid.
///
/// Chunks are owned by the [`ChunkRegistry`](crate::engine_state::voxels::world::ChunkRegistry)
/// and only handed out behind its lock.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Chunk {
    /// The position of this chunk in chunk coordinates.
    pub coord: ChunkCoord,
    /// The blocks of this chunk.
    pub grid: BlockGrid,
}

impl Chunk {
    /// Wraps a filled grid.
    pub fn new(coord: ChunkCoord, grid: BlockGrid) -> Self {
        Chunk { coord, grid }
    }

    /// Creates a chunk filled with air.
    pub fn empty(coord: ChunkCoord, dimensions: ChunkDimensions) -> Self {
        Chunk::new(coord, BlockGrid::new(dimensions))
    }

    /// The dimensions of this chunk's grid.
    #[inline]
    pub fn dimensions(&self) -> ChunkDimensions {
        self.grid.dimensions()
    }

    /// Shorthand for [`BlockGrid::get`] with local coordinates.
    pub fn get_block_at(&self, x: i64, y: i64, z: i64) -> Result<Block, GridError> {
        self.grid.get(x, y, z)
    }

    /// Shorthand for [`BlockGrid::set`] with local coordinates.
    pub fn set_block_at(&mut self, x: i64, y: i64, z: i64, block: Block) -> Result<(), GridError> {
        self.grid.set(x, y, z, block)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_around_is_ring_ordered() {
        let coords = ChunkCoord::new(5, -3).square_around(1);
        assert_eq!(coords.len(), 9);
        assert_eq!(coords[0], ChunkCoord::new(5, -3));
        assert!(coords.contains(&ChunkCoord::new(4, -4)));
        assert!(coords.contains(&ChunkCoord::new(6, -2)));
        assert_eq!(ChunkCoord::new(0, 0).square_around(-2), vec![ChunkCoord::new(0, 0)]);
    }

    #[test]
    fn square_around_stops_at_i32_limits() {
        let coords = ChunkCoord::new(i32::MAX, i32::MIN).square_around(1);
        assert_eq!(coords.len(), 4);
        assert_eq!(coords[0], ChunkCoord::new(i32::MAX, i32::MIN));
    }
}
