use std::{
    sync::{
        mpsc::{channel, Receiver, Sender},
        Arc, Barrier, Mutex,
    },
    thread,
    time::Duration,
};

use voxel_terrain::engine_state::{
    error::WorldError,
    voxels::{
        block::{block_type::BlockType, Block},
        chunk::{BlockGrid, ChunkCoord, ChunkDimensions},
        persistence::ChunkStore,
        terrain::{TerrainGenerator, TerrainParams},
        world::{ChunkRegistry, ChunkState},
    },
};

const DIMS: ChunkDimensions = ChunkDimensions::new(8, 32);

fn generator() -> TerrainGenerator {
    TerrainGenerator::new(DIMS, TerrainParams::default()).unwrap()
}

/// Blocks every load until the test lets it continue.
struct GateStore {
    entered: Mutex<Sender<ChunkCoord>>,
    release: Mutex<Receiver<()>>,
}

impl ChunkStore for GateStore {
    fn try_load_persisted(&self, coord: ChunkCoord) -> Option<BlockGrid> {
        let _ = self.entered.lock().unwrap().send(coord);
        let _ = self.release.lock().unwrap().recv();
        None
    }
}

/// Fails every load of one coordinate.
struct BrokenStore(ChunkCoord);

impl ChunkStore for BrokenStore {
    fn try_load_persisted(&self, coord: ChunkCoord) -> Option<BlockGrid> {
        if coord == self.0 {
            panic!("storage for chunk {coord} is corrupt");
        }
        None
    }
}

/// Returns grids of the wrong size.
struct WrongSizeStore;

impl ChunkStore for WrongSizeStore {
    fn try_load_persisted(&self, _coord: ChunkCoord) -> Option<BlockGrid> {
        Some(BlockGrid::new(ChunkDimensions::new(2, 2)))
    }
}

/// Serves an empty full-size grid for every coordinate.
struct EmptyStore;

impl ChunkStore for EmptyStore {
    fn try_load_persisted(&self, _coord: ChunkCoord) -> Option<BlockGrid> {
        Some(BlockGrid::new(DIMS))
    }
}

#[test]
fn test_concurrent_requests_generate_once() {
    let registry = Arc::new(ChunkRegistry::new(generator(), 17));
    let coord = ChunkCoord::new(3, -4);
    let barrier = Arc::new(Barrier::new(8));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let registry = registry.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                registry.get_or_generate(coord).unwrap()
            })
        })
        .collect();
    let chunks: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(registry.generation_runs(), 1, "exactly one generation run");
    for chunk in &chunks[1..] {
        assert!(chunk.ptr_eq(&chunks[0]), "every caller gets the same chunk");
    }
    assert_eq!(registry.state(coord), ChunkState::Ready);
}

#[test]
fn test_distinct_chunks_generate_independently() {
    let registry = Arc::new(ChunkRegistry::new(generator(), 17));
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let registry = registry.clone();
            thread::spawn(move || registry.get_or_generate(ChunkCoord::new(i, i)).map(|_| ()))
        })
        .collect();
    for handle in handles {
        handle.join().unwrap().unwrap();
    }
    assert_eq!(registry.generation_runs(), 4);
    assert_eq!(registry.ready_coords().len(), 4);
}

#[test]
fn test_registry_content_matches_generator() {
    let registry = ChunkRegistry::new(generator(), 5);
    let coord = ChunkCoord::new(-1, 2);
    let chunk = registry.get_or_generate(coord).unwrap();
    let expected = generator().generate(coord, 5).unwrap();
    assert_eq!(chunk.get().grid, expected, "registry publishes exactly what was generated");
}

#[test]
fn test_missing_chunk_is_not_generated() {
    let registry = ChunkRegistry::new(generator(), 1);
    assert_eq!(
        registry.get_world_block(-1, 3, 0),
        Err(WorldError::Missing(ChunkCoord::new(-1, 0)))
    );
    assert_eq!(registry.state(ChunkCoord::new(-1, 0)), ChunkState::Absent);
    assert_eq!(registry.generation_runs(), 0);
    assert!(registry.get_chunk(ChunkCoord::new(-1, 0)).is_none());
}

#[test]
fn test_missing_while_generating() {
    let (entered_tx, entered_rx) = channel();
    let (release_tx, release_rx) = channel();
    let store = GateStore {
        entered: Mutex::new(entered_tx),
        release: Mutex::new(release_rx),
    };
    let registry = Arc::new(ChunkRegistry::with_store(generator(), 1, Box::new(store)));
    let coord = ChunkCoord::new(0, 0);

    let worker = {
        let registry = registry.clone();
        thread::spawn(move || registry.get_or_generate(coord).map(|_| ()))
    };
    assert_eq!(entered_rx.recv().unwrap(), coord);

    assert_eq!(registry.state(coord), ChunkState::Generating);
    assert_eq!(registry.get_world_block(1, 1, 1), Err(WorldError::Missing(coord)));
    assert_eq!(
        registry.set_world_block(1, 1, 1, Block::new(BlockType::STONE)),
        Err(WorldError::Missing(coord))
    );

    release_tx.send(()).unwrap();
    worker.join().unwrap().unwrap();
    assert_eq!(registry.state(coord), ChunkState::Ready);
    assert!(registry.get_world_block(1, 1, 1).is_ok());
}

#[test]
fn test_cancelled_generation_is_discarded() {
    let (entered_tx, entered_rx) = channel();
    let (release_tx, release_rx) = channel();
    let store = GateStore {
        entered: Mutex::new(entered_tx),
        release: Mutex::new(release_rx),
    };
    let registry = Arc::new(ChunkRegistry::with_store(generator(), 1, Box::new(store)));
    let coord = ChunkCoord::new(2, 2);

    let worker = {
        let registry = registry.clone();
        thread::spawn(move || registry.get_or_generate(coord).map(|_| ()))
    };
    entered_rx.recv().unwrap();
    assert!(registry.cancel(coord));

    // A second caller joins the run that is still blocked in the store.
    let waiter = {
        let registry = registry.clone();
        thread::spawn(move || registry.get_or_generate(coord).map(|_| ()))
    };
    thread::sleep(Duration::from_millis(100));
    assert_eq!(registry.state(coord), ChunkState::Generating);
    release_tx.send(()).unwrap();

    assert_eq!(worker.join().unwrap(), Err(WorldError::Cancelled(coord)));
    assert_eq!(
        waiter.join().unwrap(),
        Err(WorldError::Cancelled(coord)),
        "callers waiting on a cancelled run share its result"
    );
    assert!(entered_rx.try_recv().is_err(), "the waiter did not start its own run");
    assert_eq!(registry.state(coord), ChunkState::Absent, "cancelled chunk is not published");

    // A later request starts a fresh run.
    release_tx.send(()).unwrap();
    registry.get_or_generate(coord).unwrap();
    assert_eq!(registry.state(coord), ChunkState::Ready);
    assert!(!registry.cancel(coord), "Ready chunks cannot be cancelled");
}

#[test]
fn test_failed_generation_does_not_poison_registry() {
    let broken = ChunkCoord::new(1, 1);
    let registry = ChunkRegistry::with_store(generator(), 1, Box::new(BrokenStore(broken)));

    let error = registry.get_or_generate(broken).map(|_| ()).unwrap_err();
    assert!(matches!(error, WorldError::InvalidGenerationInput(_)), "got {error:?}");
    assert_eq!(registry.state(broken), ChunkState::Absent);

    registry.get_or_generate(ChunkCoord::new(0, 1)).unwrap();
    assert_eq!(registry.ready_coords(), vec![ChunkCoord::new(0, 1)]);
    assert!(registry.get_or_generate(broken).is_err(), "failures are reported again, not cached");
}

#[test]
fn test_invalid_parameters_are_rejected() {
    let params = TerrainParams {
        frequency: f64::NAN,
        ..TerrainParams::default()
    };
    assert!(matches!(
        TerrainGenerator::new(DIMS, params),
        Err(WorldError::InvalidGenerationInput(_))
    ));
}

#[test]
fn test_wrong_size_persisted_grid_is_ignored() {
    let registry = ChunkRegistry::with_store(generator(), 1, Box::new(WrongSizeStore));
    let chunk = registry.get_or_generate(ChunkCoord::new(0, 0)).unwrap();
    assert_eq!(chunk.get().dimensions(), DIMS);
    assert_eq!(registry.generation_runs(), 1);
}

#[test]
fn test_world_edits_round_trip() {
    let registry = ChunkRegistry::new(generator(), 8);
    registry.get_or_generate(ChunkCoord::new(-1, -1)).unwrap();

    for (x, z) in [(-1, -1), (-8, -8), (-5, -2)] {
        let block = Block::new(BlockType::PEBBLED_DIRT);
        registry.set_world_block(x, 31, z, block.clone()).unwrap();
        assert_eq!(registry.get_world_block(x, 31, z), Ok(block));
    }
    assert_eq!(
        registry.set_world_block(0, 31, 0, Block::new(BlockType::STONE)),
        Err(WorldError::Missing(ChunkCoord::new(0, 0)))
    );
    assert_eq!(
        registry.get_world_block(-1, 32, -1),
        Err(WorldError::OutOfRange { x: -1, y: 32, z: -1 })
    );
}

#[test]
fn test_unaddressable_chunk_is_rejected() {
    let registry = ChunkRegistry::with_store(generator(), 1, Box::new(EmptyStore));
    let far = ChunkCoord::new(i32::MAX, 0);

    assert!(matches!(
        registry.get_or_generate(far).map(|_| ()),
        Err(WorldError::InvalidGenerationInput(_))
    ));
    assert_eq!(registry.state(far), ChunkState::Absent);
    assert!(registry.ready_coords().is_empty());

    // The last chunk that still fits in i32 world coordinates loads normally.
    let edge = DIMS.chunk_of(i32::MAX, i32::MIN);
    registry.get_or_generate(edge).unwrap();
    assert_eq!(registry.get_world_block(i32::MAX, 0, i32::MIN), Ok(Block::AIR));
}
