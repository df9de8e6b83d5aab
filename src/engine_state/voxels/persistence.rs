//! # Chunk Persistence Seam
//!
//! The registry asks a [`ChunkStore`] for previously saved content before it runs
//! terrain generation. No on-disk format exists; [`NullChunkStore`] is the store
//! used unless the embedding application provides its own.

use super::chunk::{BlockGrid, ChunkCoord};

/// Source of previously persisted chunk content.
pub trait ChunkStore: Send + Sync {
    /// Returns saved content for `coord`, or `None` to fall back to generation.
    ///
    /// A returned grid must have the registry's chunk dimensions; grids with other
    /// dimensions are ignored.
    fn try_load_persisted(&self, coord: ChunkCoord) -> Option<BlockGrid>;
}

/// A store that never has anything saved.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullChunkStore;

impl ChunkStore for NullChunkStore {
    fn try_load_persisted(&self, _coord: ChunkCoord) -> Option<BlockGrid> {
        None
    }
}
