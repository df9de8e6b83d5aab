//! # Chunk Coordinates
//!
//! Conversion between world block coordinates and (chunk coordinate, local
//! coordinate) pairs. Chunks tile the world only horizontally, so the mapping
//! concerns the x and z axes; y is the same in world and local space.
//!
//! Chunk coordinates use true floor division: world x `-1` belongs to chunk `-1`
//! at local x `width - 1`, not to chunk `0`.

use cgmath::Point3;
use serde::{Deserialize, Serialize};

use super::ChunkCoord;

/// Default horizontal size of a chunk in blocks.
pub const DEFAULT_CHUNK_WIDTH: usize = 32;
/// Default vertical size of a chunk in blocks.
pub const DEFAULT_CHUNK_HEIGHT: usize = 256;

/// Fixed size of every chunk in a world: `width × width × height`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChunkDimensions {
    /// Extent along x and z.
    pub width: usize,
    /// Extent along y.
    pub height: usize,
}

impl Default for ChunkDimensions {
    fn default() -> Self {
        ChunkDimensions {
            width: DEFAULT_CHUNK_WIDTH,
            height: DEFAULT_CHUNK_HEIGHT,
        }
    }
}

impl ChunkDimensions {
    /// Creates dimensions for `width × width × height` chunks.
    pub const fn new(width: usize, height: usize) -> Self {
        ChunkDimensions { width, height }
    }

    /// Number of cells in one chunk.
    #[inline]
    pub fn volume(&self) -> usize {
        self.width * self.width * self.height
    }

    #[inline]
    fn width_i32(&self) -> i32 {
        self.width as i32
    }

    /// The chunk containing world column `(world_x, world_z)`.
    #[inline]
    pub fn chunk_of(&self, world_x: i32, world_z: i32) -> ChunkCoord {
        ChunkCoord::new(
            world_x.div_euclid(self.width_i32()),
            world_z.div_euclid(self.width_i32()),
        )
    }

    /// Position of world column `(world_x, world_z)` relative to `chunk`'s origin.
    ///
    /// The result lies in `[0, width)` whenever `chunk == self.chunk_of(world_x, world_z)`.
    #[inline]
    pub fn local_of(&self, world_x: i32, world_z: i32, chunk: ChunkCoord) -> (i64, i64) {
        let w = self.width as i64;
        (
            world_x as i64 - chunk.x as i64 * w,
            world_z as i64 - chunk.z as i64 * w,
        )
    }

    /// Decomposes a world column into its chunk and in-range local position.
    #[inline]
    pub fn split(&self, world_x: i32, world_z: i32) -> (ChunkCoord, usize, usize) {
        let chunk = self.chunk_of(world_x, world_z);
        (
            chunk,
            world_x.rem_euclid(self.width_i32()) as usize,
            world_z.rem_euclid(self.width_i32()) as usize,
        )
    }

    /// Reconstructs the world column from a chunk and local position.
    ///
    /// Returns `None` if the column cannot be written as `i32` world coordinates.
    #[inline]
    pub fn to_world(&self, chunk: ChunkCoord, local_x: usize, local_z: usize) -> Option<(i32, i32)> {
        let axis = |chunk_axis: i32, local: usize| {
            chunk_axis
                .checked_mul(self.width_i32())?
                .checked_add(i32::try_from(local).ok()?)
        };
        Some((axis(chunk.x, local_x)?, axis(chunk.z, local_z)?))
    }

    /// World position of the block at local `(0, 0, 0)` in `chunk`.
    pub fn chunk_origin(&self, chunk: ChunkCoord) -> Option<Point3<i32>> {
        let (x, z) = self.to_world(chunk, 0, 0)?;
        Some(Point3::new(x, 0, z))
    }

    /// Whether every column of `chunk` has an `i32` world coordinate.
    pub fn is_addressable(&self, chunk: ChunkCoord) -> bool {
        let last = self.width.saturating_sub(1);
        self.to_world(chunk, 0, 0).is_some() && self.to_world(chunk, last, last).is_some()
    }
}
