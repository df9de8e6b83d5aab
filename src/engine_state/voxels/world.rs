//! # World Module
//!
//! This module provides the [`ChunkRegistry`], the single owner of every chunk in
//! the voxel world. It maps chunk coordinates to chunk state and drives lazy
//! generation.
//!
//! ## Chunk Lifecycle
//!
//! A coordinate is always in exactly one of three states:
//!
//! - **Absent**: nothing is known about the chunk
//! - **Generating**: one caller is producing its content; others wait for that run
//! - **Ready**: the chunk is published and shared through an [`MtResource`]
//!
//! A chunk only becomes visible to readers once its grid is complete, so a reader
//! sees either no chunk or a fully generated one. A failed or cancelled run returns
//! the coordinate to Absent.
//!
//! ## Performance Considerations
//!
//! - The coordinate map is behind one mutex that is only held for bookkeeping;
//!   generation runs outside it, so distinct coordinates generate in parallel
//! - Chunk lookup is O(1) using a hash map
//! - Neighbour queries never wait on or start generation

use std::{
    collections::HashMap,
    panic::{self, AssertUnwindSafe},
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc, Condvar, Mutex, MutexGuard, PoisonError,
    },
};

use log::{debug, warn};

use crate::{
    core::MtResource,
    engine_state::error::WorldError,
};

use super::{
    block::{Block, BlockId},
    chunk::{BlockGrid, Chunk, ChunkCoord, ChunkDimensions},
    persistence::{ChunkStore, NullChunkStore},
    terrain::TerrainGenerator,
};

/// Observable lifecycle state of a chunk coordinate.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ChunkState {
    /// No chunk exists and none is being produced.
    Absent,
    /// A generation run is in flight.
    Generating,
    /// The chunk is published.
    Ready,
}

/// Shared state of one in-flight generation run.
struct PendingGeneration {
    outcome: Mutex<Option<Result<MtResource<Chunk>, WorldError>>>,
    finished: Condvar,
    cancelled: AtomicBool,
}

impl PendingGeneration {
    fn new() -> Self {
        PendingGeneration {
            outcome: Mutex::new(None),
            finished: Condvar::new(),
            cancelled: AtomicBool::new(false),
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    fn finish(&self, outcome: Result<MtResource<Chunk>, WorldError>) {
        *self.outcome.lock().unwrap_or_else(PoisonError::into_inner) = Some(outcome);
        self.finished.notify_all();
    }

    /// Blocks until the owning run has finished and returns its outcome.
    fn wait(&self) -> Result<MtResource<Chunk>, WorldError> {
        let mut outcome = self.outcome.lock().unwrap_or_else(PoisonError::into_inner);
        loop {
            if let Some(result) = outcome.as_ref() {
                return result.clone();
            }
            outcome = self
                .finished
                .wait(outcome)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }
}

enum Slot {
    Generating(Arc<PendingGeneration>),
    Ready(MtResource<Chunk>),
}

/// Authoritative mapping from chunk coordinate to chunk state and content.
///
/// # Examples
///
/// ```
/// use voxel_terrain::engine_state::voxels::{
///     chunk::{ChunkCoord, ChunkDimensions},
///     terrain::{TerrainGenerator, TerrainParams},
///     world::{ChunkRegistry, ChunkState},
/// };
///
/// let generator = TerrainGenerator::new(ChunkDimensions::new(8, 32), TerrainParams::default()).unwrap();
/// let registry = ChunkRegistry::new(generator, 7);
///
/// let chunk = registry.get_or_generate(ChunkCoord::new(0, 0)).unwrap();
/// assert_eq!(chunk.get().coord, ChunkCoord::new(0, 0));
/// assert_eq!(registry.state(ChunkCoord::new(0, 0)), ChunkState::Ready);
/// assert!(registry.get_world_block(100, 0, 100).is_err());
/// ```
pub struct ChunkRegistry {
    generator: TerrainGenerator,
    seed: u32,
    store: Box<dyn ChunkStore>,
    slots: Mutex<HashMap<ChunkCoord, Slot>>,
    generation_runs: AtomicUsize,
}

impl ChunkRegistry {
    /// Creates an empty registry that generates chunks with `generator` and `seed`.
    pub fn new(generator: TerrainGenerator, seed: u32) -> Self {
        Self::with_store(generator, seed, Box::new(NullChunkStore))
    }

    /// Creates an empty registry that consults `store` before generating.
    pub fn with_store(generator: TerrainGenerator, seed: u32, store: Box<dyn ChunkStore>) -> Self {
        ChunkRegistry {
            generator,
            seed,
            store,
            slots: Mutex::new(HashMap::new()),
            generation_runs: AtomicUsize::new(0),
        }
    }

    fn lock_slots(&self) -> MutexGuard<'_, HashMap<ChunkCoord, Slot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Dimensions of every chunk in this world.
    pub fn dimensions(&self) -> ChunkDimensions {
        self.generator.dimensions()
    }

    /// The world seed.
    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// The terrain generator backing this registry.
    pub fn generator(&self) -> &TerrainGenerator {
        &self.generator
    }

    /// Number of times terrain generation has actually run.
    pub fn generation_runs(&self) -> usize {
        self.generation_runs.load(Ordering::Acquire)
    }

    /// Current lifecycle state of `coord`.
    pub fn state(&self, coord: ChunkCoord) -> ChunkState {
        match self.lock_slots().get(&coord) {
            None => ChunkState::Absent,
            Some(Slot::Generating(_)) => ChunkState::Generating,
            Some(Slot::Ready(_)) => ChunkState::Ready,
        }
    }

    /// The published chunk at `coord`, without generating it.
    pub fn get_chunk(&self, coord: ChunkCoord) -> Option<MtResource<Chunk>> {
        match self.lock_slots().get(&coord) {
            Some(Slot::Ready(chunk)) => Some(chunk.clone()),
            _ => None,
        }
    }

    /// Coordinates of every published chunk, sorted.
    pub fn ready_coords(&self) -> Vec<ChunkCoord> {
        let mut coords: Vec<ChunkCoord> = self
            .lock_slots()
            .iter()
            .filter(|(_, slot)| matches!(slot, Slot::Ready(_)))
            .map(|(coord, _)| *coord)
            .collect();
        coords.sort();
        coords
    }

    /// Returns the chunk at `coord`, generating it first if necessary.
    ///
    /// Concurrent and repeated calls for one coordinate share a single generation
    /// run and all receive the same chunk (or the same error). Chunks whose
    /// columns have no `i32` world coordinate are rejected with
    /// [`WorldError::InvalidGenerationInput`] and never reach the store.
    pub fn get_or_generate(&self, coord: ChunkCoord) -> Result<MtResource<Chunk>, WorldError> {
        if !self.dimensions().is_addressable(coord) {
            return Err(WorldError::InvalidGenerationInput(format!(
                "chunk {coord} lies outside the addressable world"
            )));
        }
        let pending = {
            let mut slots = self.lock_slots();
            let in_flight = match slots.get(&coord) {
                Some(Slot::Ready(chunk)) => return Ok(chunk.clone()),
                Some(Slot::Generating(pending)) => Some(pending.clone()),
                None => None,
            };
            match in_flight {
                Some(pending) => {
                    drop(slots);
                    return pending.wait();
                }
                None => {
                    let pending = Arc::new(PendingGeneration::new());
                    slots.insert(coord, Slot::Generating(pending.clone()));
                    pending
                }
            }
        };

        let produced = if pending.is_cancelled() {
            Err(WorldError::Cancelled(coord))
        } else {
            panic::catch_unwind(AssertUnwindSafe(|| self.produce(coord))).unwrap_or_else(|_| {
                Err(WorldError::InvalidGenerationInput(format!(
                    "generation of chunk {coord} panicked"
                )))
            })
        };

        let mut slots = self.lock_slots();
        let outcome = match produced {
            Ok(_) if pending.is_cancelled() => Err(WorldError::Cancelled(coord)),
            other => other,
        };
        let outcome = match outcome {
            Ok(grid) => {
                let chunk = MtResource::new(Chunk::new(coord, grid));
                slots.insert(coord, Slot::Ready(chunk.clone()));
                debug!("Published chunk {}", coord);
                Ok(chunk)
            }
            Err(error) => {
                slots.remove(&coord);
                warn!("Chunk {} was not published: {}", coord, error);
                Err(error)
            }
        };
        pending.finish(outcome.clone());
        outcome
    }

    /// Loads persisted content for `coord` or generates it.
    fn produce(&self, coord: ChunkCoord) -> Result<BlockGrid, WorldError> {
        if let Some(grid) = self.store.try_load_persisted(coord) {
            if grid.dimensions() == self.dimensions() {
                debug!("Loaded persisted chunk {}", coord);
                return Ok(grid);
            }
            warn!(
                "Ignoring persisted chunk {} with dimensions {:?}",
                coord,
                grid.dimensions()
            );
        }
        self.generation_runs.fetch_add(1, Ordering::AcqRel);
        self.generator.generate(coord, self.seed)
    }

    /// Cancels an unpublished generation of `coord`.
    ///
    /// Returns `true` if a run was in flight. The run's result is discarded and
    /// its callers receive [`WorldError::Cancelled`]. Ready chunks are unaffected.
    pub fn cancel(&self, coord: ChunkCoord) -> bool {
        match self.lock_slots().get(&coord) {
            Some(Slot::Generating(pending)) => {
                pending.cancelled.store(true, Ordering::Release);
                true
            }
            _ => false,
        }
    }

    /// Resolves world coordinates to a published chunk and local coordinates.
    fn locate(
        &self,
        x: i32,
        y: i32,
        z: i32,
    ) -> Result<(MtResource<Chunk>, i64, i64, i64), WorldError> {
        let dims = self.dimensions();
        if y < 0 || y as i64 >= dims.height as i64 {
            return Err(WorldError::OutOfRange { x, y, z });
        }
        let (coord, local_x, local_z) = dims.split(x, z);
        let chunk = self.get_chunk(coord).ok_or(WorldError::Missing(coord))?;
        Ok((chunk, local_x as i64, y as i64, local_z as i64))
    }

    /// The block at world `(x, y, z)`.
    ///
    /// Returns `Missing` if the owning chunk is not Ready; never triggers generation.
    pub fn get_world_block(&self, x: i32, y: i32, z: i32) -> Result<Block, WorldError> {
        let (chunk, lx, ly, lz) = self.locate(x, y, z)?;
        let block = chunk
            .get()
            .get_block_at(lx, ly, lz)
            .map_err(|_| WorldError::OutOfRange { x, y, z });
        block
    }

    /// Identifier-only variant of [`ChunkRegistry::get_world_block`].
    pub fn get_world_block_id(&self, x: i32, y: i32, z: i32) -> Result<BlockId, WorldError> {
        let (chunk, lx, ly, lz) = self.locate(x, y, z)?;
        let id = chunk
            .get()
            .grid
            .id_at(lx, ly, lz)
            .map_err(|_| WorldError::OutOfRange { x, y, z });
        id
    }

    /// Writes `block` at world `(x, y, z)`.
    ///
    /// Fails without side effects if the owning chunk is not Ready.
    pub fn set_world_block(&self, x: i32, y: i32, z: i32, block: Block) -> Result<(), WorldError> {
        let (chunk, lx, ly, lz) = self.locate(x, y, z)?;
        let result = chunk
            .get_mut()
            .set_block_at(lx, ly, lz, block)
            .map_err(|_| WorldError::OutOfRange { x, y, z });
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::{block::block_type::BlockType, terrain::TerrainParams};

    fn registry() -> ChunkRegistry {
        let generator =
            TerrainGenerator::new(ChunkDimensions::new(8, 16), TerrainParams::flat(0.25)).unwrap();
        ChunkRegistry::new(generator, 3)
    }

    #[test]
    fn queries_do_not_generate() {
        let registry = registry();
        assert_eq!(
            registry.get_world_block(0, 0, 0),
            Err(WorldError::Missing(ChunkCoord::new(0, 0)))
        );
        assert_eq!(
            registry.set_world_block(-1, 0, 0, Block::new(BlockType::STONE)),
            Err(WorldError::Missing(ChunkCoord::new(-1, 0)))
        );
        assert_eq!(registry.state(ChunkCoord::new(0, 0)), ChunkState::Absent);
        assert_eq!(registry.generation_runs(), 0);
    }

    #[test]
    fn repeated_requests_generate_once() {
        let registry = registry();
        let a = registry.get_or_generate(ChunkCoord::new(1, 1)).unwrap();
        let b = registry.get_or_generate(ChunkCoord::new(1, 1)).unwrap();
        assert!(a.ptr_eq(&b));
        assert_eq!(registry.generation_runs(), 1);
        assert_eq!(registry.ready_coords(), vec![ChunkCoord::new(1, 1)]);
    }

    #[test]
    fn world_blocks_round_trip_through_ready_chunks() {
        let registry = registry();
        registry.get_or_generate(ChunkCoord::new(-1, -1)).unwrap();

        // flat(0.25) on height 16 puts the peak at y = 4
        assert_eq!(registry.get_world_block(-1, 4, -8).unwrap(), Block::new(BlockType::GRASS));
        assert!(registry.get_world_block(-1, 5, -8).unwrap().is_air());

        registry.set_world_block(-8, 10, -1, Block::new(BlockType::STONE)).unwrap();
        assert_eq!(registry.get_world_block_id(-8, 10, -1), Ok(BlockId::from(BlockType::STONE)));
        assert_eq!(
            registry.get_world_block(-8, 16, -1),
            Err(WorldError::OutOfRange { x: -8, y: 16, z: -1 })
        );
        assert_eq!(
            registry.get_world_block(-8, -1, -1),
            Err(WorldError::OutOfRange { x: -8, y: -1, z: -1 })
        );
    }

    #[test]
    fn cancel_only_touches_in_flight_runs() {
        let registry = registry();
        assert!(!registry.cancel(ChunkCoord::new(0, 0)));
        registry.get_or_generate(ChunkCoord::new(0, 0)).unwrap();
        assert!(!registry.cancel(ChunkCoord::new(0, 0)));
        assert_eq!(registry.state(ChunkCoord::new(0, 0)), ChunkState::Ready);
    }
}
