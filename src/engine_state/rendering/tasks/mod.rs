//! Background tasks for the rendering side.
//!
//! # Available Tasks
//! - `ChunkMeshGenerationTask`: Generates face geometry for chunks in the background

pub mod chunk_mesh_generation_task;
