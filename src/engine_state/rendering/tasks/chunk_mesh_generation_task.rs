//! Task for generating face geometry for chunks in a background thread.
//!
//! This module contains the `ChunkMeshGenerationTask` which runs the face
//! visibility mesher for one Ready chunk and hands the result to the mesh sink.

use std::sync::Arc;

use log::warn;

use crate::{
    core::MtResource,
    engine_state::{
        error::WorldError,
        rendering::{meshing, FaceGeometry, MeshSink},
        task_management::task::{Task, TaskResult},
        voxels::{chunk::Chunk, world::ChunkRegistry},
    },
};

/// A task that meshes a chunk in a background thread.
pub struct ChunkMeshGenerationTask {
    /// Registry used for neighbours across the chunk border
    registry: Arc<ChunkRegistry>,
    /// The chunk that needs mesh generation
    chunk: MtResource<Chunk>,
}

impl ChunkMeshGenerationTask {
    /// Creates a new chunk mesh generation task.
    ///
    /// # Arguments
    /// * `registry` - Registry the chunk was published in
    /// * `chunk` - The chunk that needs mesh generation
    pub fn new(registry: Arc<ChunkRegistry>, chunk: MtResource<Chunk>) -> Self {
        ChunkMeshGenerationTask { registry, chunk }
    }
}

impl Task for ChunkMeshGenerationTask {
    fn process(&self) -> Box<dyn TaskResult + Send> {
        let geometry = meshing::build(&self.chunk.get(), &self.registry);
        Box::new(ChunkMeshGenerationTaskResult { geometry })
    }
}

/// The result of a chunk mesh generation task.
pub struct ChunkMeshGenerationTaskResult {
    geometry: Result<FaceGeometry, WorldError>,
}

impl TaskResult for ChunkMeshGenerationTaskResult {
    /// Submits the geometry to the sink; no follow-up tasks.
    fn handle_result(self: Box<Self>, sink: &mut dyn MeshSink) -> Vec<Box<dyn Task + Send>> {
        match self.geometry {
            Ok(geometry) => geometry.submit_to(sink),
            Err(error) => warn!("Chunk mesh was not built: {}", error),
        }
        Vec::new()
    }
}
