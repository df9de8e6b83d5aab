//! Vertex data structures for voxel face geometry.
//!
//! This module defines the vertex format produced by the mesher. The layout is
//! plain old data so a vertex list can be handed to a GPU collaborator as bytes.

use bytemuck::{Pod, Zeroable};
use cgmath::Point3;

/// A vertex of a meshed block face.
///
/// # Memory Layout
/// - Position: [f32; 3] (12 bytes)
/// - Normal: [f32; 3] (12 bytes)
/// - Texture Coordinates: [f32; 2] (8 bytes)
/// - Block Id: u32 (4 bytes)
///
/// Total size: 36 bytes
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct FaceVertex {
    /// Position relative to the chunk origin
    pub position: [f32; 3],
    /// Outward normal of the face this vertex belongs to
    pub normal: [f32; 3],
    /// Texture coordinates within the face (0.0-1.0)
    pub uv: [f32; 2],
    /// Identifier of the block the face belongs to
    pub block_id: u32,
}

impl FaceVertex {
    /// Creates a vertex at `block + offset`.
    ///
    /// # Arguments
    /// * `block` - Local position of the block the face belongs to
    /// * `offset` - Offset of the vertex inside the unit cell
    /// * `normal` - Outward face normal
    /// * `uv` - Texture coordinates
    /// * `block_id` - Raw block identifier
    pub fn new(
        block: Point3<usize>,
        offset: [f32; 3],
        normal: [f32; 3],
        uv: [f32; 2],
        block_id: u16,
    ) -> Self {
        FaceVertex {
            position: [
                block.x as f32 + offset[0],
                block.y as f32 + offset[1],
                block.z as f32 + offset[2],
            ],
            normal,
            uv,
            block_id: block_id as u32,
        }
    }
}
