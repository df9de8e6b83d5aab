//! # Block Grid
//!
//! Dense per-chunk block storage.
//!
//! ## Storage
//!
//! - `ids`: one [`BlockId`] per cell, laid out x-fastest, then z, then y, so a
//!   horizontal layer is contiguous.
//! - `metadata`: a sparse map from cell index to [`BlockMetadata`] for the few
//!   blocks that carry any.
//!
//! Every accessor goes through the single bounds-checked [`BlockGrid::index`], so
//! an out-of-range coordinate is reported instead of aliasing a neighbouring cell.

use std::collections::HashMap;

use crate::engine_state::{
    error::GridError,
    voxels::block::{Block, BlockId, BlockMetadata},
};

use super::coordinates::ChunkDimensions;

/// Fixed-size 3D array of blocks for one chunk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockGrid {
    dimensions: ChunkDimensions,
    ids: Vec<BlockId>,
    metadata: HashMap<usize, BlockMetadata>,
}

impl BlockGrid {
    /// Creates a grid filled with air.
    pub fn new(dimensions: ChunkDimensions) -> Self {
        BlockGrid {
            dimensions,
            ids: vec![BlockId::AIR; dimensions.volume()],
            metadata: HashMap::new(),
        }
    }

    /// The dimensions this grid was created with.
    #[inline]
    pub fn dimensions(&self) -> ChunkDimensions {
        self.dimensions
    }

    /// Maps a coordinate to its cell index, or reports it as out of range.
    #[inline]
    fn index(&self, x: i64, y: i64, z: i64) -> Result<usize, GridError> {
        let w = self.dimensions.width as i64;
        let h = self.dimensions.height as i64;
        if x < 0 || z < 0 || y < 0 || x >= w || z >= w || y >= h {
            return Err(GridError::OutOfRange { x, y, z });
        }
        Ok((x + w * (z + w * y)) as usize)
    }

    /// Returns the block at `(x, y, z)`.
    pub fn get(&self, x: i64, y: i64, z: i64) -> Result<Block, GridError> {
        let index = self.index(x, y, z)?;
        Ok(Block {
            id: self.ids[index],
            metadata: self.metadata.get(&index).cloned().unwrap_or_default(),
        })
    }

    /// Returns only the identifier at `(x, y, z)`.
    ///
    /// Same bounds check as [`BlockGrid::get`] without touching metadata.
    #[inline]
    pub fn id_at(&self, x: i64, y: i64, z: i64) -> Result<BlockId, GridError> {
        self.index(x, y, z).map(|index| self.ids[index])
    }

    /// Writes `block` at `(x, y, z)`.
    ///
    /// Out-of-range coordinates leave the grid untouched and return `OutOfRange`.
    pub fn set(&mut self, x: i64, y: i64, z: i64, block: Block) -> Result<(), GridError> {
        let index = self.index(x, y, z)?;
        self.ids[index] = block.id;
        match block.metadata {
            BlockMetadata::None => {
                self.metadata.remove(&index);
            }
            metadata => {
                self.metadata.insert(index, metadata);
            }
        }
        Ok(())
    }

    /// Fills the vertical run `y_range` of column `(x, z)` with `id`.
    ///
    /// Used by generation where whole columns are written at once. Metadata in the
    /// run is cleared.
    pub(crate) fn fill_column(
        &mut self,
        x: usize,
        z: usize,
        y_range: std::ops::Range<usize>,
        id: BlockId,
    ) -> Result<(), GridError> {
        for y in y_range {
            let index = self.index(x as i64, y as i64, z as i64)?;
            self.ids[index] = id;
            self.metadata.remove(&index);
        }
        Ok(())
    }

    /// Highest non-air y in column `(x, z)`, or `None` for an all-air or invalid column.
    pub fn column_top(&self, x: usize, z: usize) -> Option<usize> {
        (0..self.dimensions.height)
            .rev()
            .find(|&y| matches!(self.id_at(x as i64, y as i64, z as i64), Ok(id) if !id.is_air()))
    }

    /// Number of non-air cells.
    pub fn solid_count(&self) -> usize {
        self.ids.iter().filter(|id| !id.is_air()).count()
    }

    /// Raw identifiers in storage order, for hashing and comparison.
    pub fn ids(&self) -> &[BlockId] {
        &self.ids
    }
}
