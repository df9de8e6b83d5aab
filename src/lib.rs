#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel Terrain
//!
//! Chunked voxel terrain: lazy, deterministic generation of block columns from
//! seeded noise, a registry that owns every chunk, and a mesher that turns chunks
//! into face geometry for a rendering collaborator.
//!
//! ## Key Modules
//!
//! * `config` - JSON world configuration
//! * `core` - Concurrency primitives used throughout the crate
//! * `engine_state` - The world driver plus voxels, meshing and task management
//!
//! ## Architecture
//!
//! * A world query for a chunk goes to the `ChunkRegistry`
//! * An absent chunk is filled by the `TerrainGenerator` and published atomically
//! * The mesher reads the chunk, asking the registry about neighbouring chunks
//!   without ever generating them, and emits one quad per visible face
//! * Geometry is handed to a `MeshSink` once per block surface
//!
//! ## Usage
//!
//! ```rust
//! use voxel_terrain::{
//!     config::WorldConfig,
//!     engine_state::{voxels::{chunk::ChunkCoord, persistence::NullChunkStore}, EngineState},
//! };
//!
//! let config = WorldConfig::from_json_str(r#"{ "dimensions": { "width": 8, "height": 32 } }"#).unwrap();
//! let mut world = EngineState::new(config, Box::new(NullChunkStore)).unwrap();
//! let geometry = world.load_chunk(ChunkCoord::new(0, 0)).unwrap();
//! assert!(geometry.face_count() > 0);
//! ```

use log::info;

use config::WorldConfig;
use engine_state::{
    error::ConfigError,
    rendering::CollectingMeshSink,
    voxels::persistence::NullChunkStore,
    EngineState,
};

pub mod config;
pub mod core;
pub mod engine_state;

/// Name of the timer logged around the initial world load.
pub const WORLD_LOAD_STOPWATCH: &str = "World Load";

/// Runs a headless world: loads every chunk around the origin, meshes it and logs
/// the result.
///
/// The first command line argument, if present, is a path to a JSON
/// [`WorldConfig`]. Logging is configured through `RUST_LOG`.
pub fn run() -> Result<(), ConfigError> {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();

    info!("Logger initialized");

    let config = match std::env::args().nth(1) {
        Some(path) => {
            info!("Loading world config from {}", path);
            WorldConfig::from_path(path)?
        }
        None => WorldConfig::default(),
    };

    let mut world = EngineState::new(config, Box::new(NullChunkStore))?;
    let mut sink = CollectingMeshSink::default();

    let start = web_time::Instant::now();
    let requested = world.update_focus(0, 0);
    while !world.is_idle() {
        world.process_tasks(&mut sink);
        std::thread::yield_now();
    }

    info!(
        "{}: {} of {} chunks ready, {} surfaces, {} triangles in {:?}",
        WORLD_LOAD_STOPWATCH,
        world.registry().ready_coords().len(),
        requested,
        sink.submissions.len(),
        sink.triangle_count(),
        start.elapsed()
    );
    Ok(())
}
