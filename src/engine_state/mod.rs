//! # Engine State Module
//!
//! The world driver: owns the chunk registry and the task manager, and turns
//! focus movement into chunk loads.
//!
//! ## Key Components
//!
//! * `EngineState` - The main state container for a running world
//! * `error` - Error types shared by every subsystem
//! * `rendering` - Face meshing and the hand-off to a rendering collaborator
//! * `task_management` - Manages asynchronous tasks and worker threads
//! * `voxels` - Handles voxel data, chunks, and world generation
//!
//! ## Architecture
//!
//! `EngineState` is driven once per tick by its owner:
//!
//! 1. `update_focus` queues generation for every chunk within the render
//!    distance of the focus chunk when the focus enters a new chunk
//! 2. `process_tasks` handles finished work (publishing meshing tasks for newly
//!    Ready chunks and submitting geometry to the sink) and schedules queued work
//!
//! `load_chunk` is the synchronous path: it generates and meshes one chunk on the
//! calling thread and returns the geometry directly.

use std::{
    collections::HashSet,
    sync::{
        mpsc::{channel, Receiver, Sender},
        Arc,
    },
};

use log::{debug, info};

use crate::config::WorldConfig;

use error::{ConfigError, WorldError};
use rendering::{meshing, FaceGeometry, MeshSink};
use task_management::TaskManager;
use voxels::{
    block::Block,
    chunk::ChunkCoord,
    persistence::ChunkStore,
    tasks::chunk_generation_task::ChunkGenerationTask,
    terrain::TerrainGenerator,
    world::ChunkRegistry,
};

pub mod error;
pub mod rendering;
pub mod task_management;
pub mod voxels;

/// The main state container for a voxel world.
///
/// # Examples
///
/// ```
/// use voxel_terrain::{
///     config::WorldConfig,
///     engine_state::{
///         rendering::CollectingMeshSink, voxels::persistence::NullChunkStore, EngineState,
///     },
/// };
///
/// let config = WorldConfig::from_json_str(
///     r#"{ "dimensions": { "width": 8, "height": 32 }, "render_distance": 1, "workers": 0 }"#,
/// )
/// .unwrap();
/// let mut engine_state = EngineState::new(config, Box::new(NullChunkStore)).unwrap();
/// let mut sink = CollectingMeshSink::default();
///
/// engine_state.update_focus(0, 0);
/// while !engine_state.is_idle() {
///     engine_state.process_tasks(&mut sink);
/// }
/// assert_eq!(engine_state.registry().ready_coords().len(), 9);
/// ```
pub struct EngineState {
    /// Configuration the world was created from
    config: WorldConfig,
    /// Owner of every chunk
    registry: Arc<ChunkRegistry>,
    /// Task manager for asynchronous operations
    task_manager: TaskManager,
    /// Chunk containing the current focus point
    focus_chunk: Option<ChunkCoord>,
    /// Chunks handed to the task manager that have not failed
    requested: HashSet<ChunkCoord>,
    /// Cloned into every generation task to report failed chunks
    failure_sender: Sender<ChunkCoord>,
    /// Chunks whose generation failed or was cancelled
    failure_receiver: Receiver<ChunkCoord>,
}

impl EngineState {
    /// Creates a world from a configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - World settings; validated before use
    /// * `store` - Consulted for saved chunk content before generating
    pub fn new(config: WorldConfig, store: Box<dyn ChunkStore>) -> Result<Self, ConfigError> {
        config.validate()?;
        let generator = TerrainGenerator::new(config.dimensions, config.terrain.clone())
            .map_err(|error| ConfigError::Invalid(error.to_string()))?;
        let registry = Arc::new(ChunkRegistry::with_store(generator, config.seed, store));
        let task_manager = TaskManager::new(config.workers);
        let (failure_sender, failure_receiver) = channel();

        info!(
            "World created: seed {}, chunks {}x{}x{}, render distance {}",
            config.seed,
            config.dimensions.width,
            config.dimensions.width,
            config.dimensions.height,
            config.render_distance
        );

        Ok(EngineState {
            config,
            registry,
            task_manager,
            focus_chunk: None,
            requested: HashSet::new(),
            failure_sender,
            failure_receiver,
        })
    }

    /// The configuration this world was created from.
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// The chunk registry.
    pub fn registry(&self) -> &Arc<ChunkRegistry> {
        &self.registry
    }

    /// Generates (if needed) and meshes one chunk on the calling thread.
    pub fn load_chunk(&mut self, coord: ChunkCoord) -> Result<FaceGeometry, WorldError> {
        let chunk = self.registry.get_or_generate(coord)?;
        let geometry = meshing::build(&chunk.get(), &self.registry);
        geometry
    }

    /// Queues generation and meshing of `coord`.
    ///
    /// Returns `false` if the chunk was already requested. A chunk whose
    /// generation failed can be requested again once [`EngineState::process_tasks`]
    /// has handled the failure.
    pub fn request_chunk(&mut self, coord: ChunkCoord) -> bool {
        if !self.requested.insert(coord) {
            return false;
        }
        self.task_manager.publish_task(Box::new(ChunkGenerationTask::new(
            self.registry.clone(),
            coord,
            self.failure_sender.clone(),
        )));
        true
    }

    /// Moves the focus point to world column `(world_x, world_z)`.
    ///
    /// When the focus enters a new chunk, every chunk within the render distance
    /// is requested, nearest first.
    ///
    /// # Returns
    /// The number of newly requested chunks
    pub fn update_focus(&mut self, world_x: i32, world_z: i32) -> usize {
        let chunk = self.config.dimensions.chunk_of(world_x, world_z);
        if self.focus_chunk == Some(chunk) {
            return 0;
        }
        self.focus_chunk = Some(chunk);

        let requested = chunk
            .square_around(self.config.render_distance)
            .into_iter()
            .filter(|coord| self.request_chunk(*coord))
            .count();
        debug!("Focus moved to chunk {}, requested {} chunks", chunk, requested);
        requested
    }

    /// Processes completed and queued tasks.
    ///
    /// This should be called each tick. Finished geometry is handed to `sink`.
    pub fn process_tasks(&mut self, sink: &mut dyn MeshSink) {
        self.task_manager.process_completed_tasks(sink);
        for coord in self.failure_receiver.try_iter() {
            debug!("Chunk {} failed, it may be requested again", coord);
            self.requested.remove(&coord);
        }
        self.task_manager.process_queued_tasks();
    }

    /// Whether every requested chunk has been generated and meshed.
    pub fn is_idle(&self) -> bool {
        self.task_manager.is_idle()
    }

    /// See [`ChunkRegistry::get_world_block`].
    pub fn get_world_block(&self, x: i32, y: i32, z: i32) -> Result<Block, WorldError> {
        self.registry.get_world_block(x, y, z)
    }

    /// See [`ChunkRegistry::set_world_block`].
    pub fn set_world_block(&self, x: i32, y: i32, z: i32, block: Block) -> Result<(), WorldError> {
        self.registry.set_world_block(x, y, z, block)
    }
}
