//! Rendering side of the voxel world.
//!
//! This module turns chunks into face geometry and hands that geometry to a
//! rendering collaborator. Drawing itself is outside this crate: whatever displays
//! the world implements [`MeshSink`] and receives one call per block surface.

use crate::engine_state::voxels::{block::BlockId, chunk::ChunkCoord};

pub mod meshing;
pub mod tasks;
pub mod vertex;

// Re-export commonly used types
pub use meshing::{build, FaceGeometry};
pub use vertex::FaceVertex;

/// Consumer of meshed chunk geometry.
///
/// `submit_mesh` is called once per block type present in a chunk's visible
/// faces. The three slices are parallel: one normal and one uv per position, three
/// positions per triangle.
pub trait MeshSink {
    /// Receives the triangles of one block surface of one chunk.
    fn submit_mesh(
        &mut self,
        coord: ChunkCoord,
        block: BlockId,
        vertices: &[[f32; 3]],
        normals: &[[f32; 3]],
        uvs: &[[f32; 2]],
    );
}

/// One call recorded by [`CollectingMeshSink`].
#[derive(Clone, Debug, PartialEq)]
pub struct SubmittedMesh {
    /// Chunk the surface belongs to
    pub coord: ChunkCoord,
    /// Block type of the surface
    pub block: BlockId,
    /// Number of triangles submitted
    pub triangles: usize,
}

/// A [`MeshSink`] that records what it was given.
#[derive(Clone, Debug, Default)]
pub struct CollectingMeshSink {
    /// Submissions in arrival order
    pub submissions: Vec<SubmittedMesh>,
}

impl CollectingMeshSink {
    /// Total number of triangles received.
    pub fn triangle_count(&self) -> usize {
        self.submissions.iter().map(|s| s.triangles).sum()
    }

    /// Submissions received for `coord`.
    pub fn for_chunk(&self, coord: ChunkCoord) -> impl Iterator<Item = &SubmittedMesh> {
        self.submissions.iter().filter(move |s| s.coord == coord)
    }
}

impl MeshSink for CollectingMeshSink {
    fn submit_mesh(
        &mut self,
        coord: ChunkCoord,
        block: BlockId,
        vertices: &[[f32; 3]],
        normals: &[[f32; 3]],
        uvs: &[[f32; 2]],
    ) {
        debug_assert_eq!(vertices.len(), normals.len());
        debug_assert_eq!(vertices.len(), uvs.len());
        self.submissions.push(SubmittedMesh {
            coord,
            block,
            triangles: vertices.len() / 3,
        });
    }
}
