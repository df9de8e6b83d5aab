//! # Chunk Generation Task
//!
//! This module defines the `ChunkGenerationTask` which handles asynchronous
//! generation of chunk data. This task is scheduled when new chunks need to be
//! loaded as the focus point moves through the world.

use std::sync::{mpsc::Sender, Arc};

use log::warn;

use crate::{
    core::MtResource,
    engine_state::{
        error::WorldError,
        rendering::{tasks::chunk_mesh_generation_task::ChunkMeshGenerationTask, MeshSink},
        task_management::task::{Task, TaskResult},
        voxels::{
            chunk::{Chunk, ChunkCoord},
            world::ChunkRegistry,
        },
    },
};

/// A task that generates (or fetches) a chunk through the registry.
///
/// This task is responsible for:
/// 1. Making the chunk at the specified position Ready
/// 2. Scheduling mesh generation for the chunk
/// 3. Reporting the coordinate back if the chunk could not be made Ready
pub struct ChunkGenerationTask {
    /// The registry that owns the chunk
    registry: Arc<ChunkRegistry>,
    /// The position of the chunk to generate (in chunk coordinates)
    coord: ChunkCoord,
    /// Receives `coord` when generation fails or is cancelled
    failures: Sender<ChunkCoord>,
}

impl ChunkGenerationTask {
    /// Creates a new chunk generation task.
    ///
    /// # Arguments
    /// * `registry` - The registry that owns the world's chunks
    /// * `coord` - The chunk coordinates where the chunk should be generated
    /// * `failures` - Channel the coordinate is sent on if no chunk was published
    pub fn new(registry: Arc<ChunkRegistry>, coord: ChunkCoord, failures: Sender<ChunkCoord>) -> Self {
        ChunkGenerationTask {
            registry,
            coord,
            failures,
        }
    }
}

impl Task for ChunkGenerationTask {
    fn process(&self) -> Box<dyn TaskResult + Send> {
        Box::new(ChunkGenerationTaskResult {
            registry: self.registry.clone(),
            coord: self.coord,
            chunk: self.registry.get_or_generate(self.coord),
            failures: self.failures.clone(),
        })
    }
}

/// The result of a chunk generation task.
///
/// Holds the Ready chunk (or the reason it is not Ready) and schedules meshing.
pub struct ChunkGenerationTaskResult {
    registry: Arc<ChunkRegistry>,
    coord: ChunkCoord,
    chunk: Result<MtResource<Chunk>, WorldError>,
    failures: Sender<ChunkCoord>,
}

impl TaskResult for ChunkGenerationTaskResult {
    fn handle_result(self: Box<Self>, _sink: &mut dyn MeshSink) -> Vec<Box<dyn Task + Send>> {
        let ChunkGenerationTaskResult {
            registry,
            coord,
            chunk,
            failures,
        } = *self;
        match chunk {
            Ok(chunk) => {
                let mesh_task: Box<dyn Task + Send> =
                    Box::new(ChunkMeshGenerationTask::new(registry, chunk));
                vec![mesh_task]
            }
            Err(error) => {
                warn!("Skipping mesh for chunk {}: {}", coord, error);
                // The receiving world may already be gone.
                let _ = failures.send(coord);
                Vec::new()
            }
        }
    }
}
