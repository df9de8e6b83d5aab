//! Per-side face templates for the voxel mesher.
//!
//! Every visible block face is emitted as two triangles copied from the template
//! for its [`BlockSide`] and translated to the block's position. The templates
//! are unit quads on the face of the cell `[0, 1]³`, wound counter-clockwise when
//! seen from outside the block.

use crate::engine_state::voxels::block::block_side::BlockSide;

/// A coordinate axis, used to pick texture coordinates out of a vertex offset.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Axis {
    /// The x axis
    X = 0,
    /// The y axis
    Y = 1,
    /// The z axis
    Z = 2,
}

/// Geometry of one block face in unit-cell space.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FaceTemplate {
    /// Which side of the block this face covers
    pub side: BlockSide,
    /// Six vertex offsets forming two triangles
    pub vertices: [[f32; 3]; 6],
    /// Outward unit normal
    pub normal: [f32; 3],
    /// Axes of the offset that become the (u, v) texture coordinates
    pub uv_axes: [Axis; 2],
}

/// Expands the four corners of a quad into the triangles `(0, 1, 2)` and `(0, 2, 3)`.
const fn quad(corners: [[f32; 3]; 4]) -> [[f32; 3]; 6] {
    [
        corners[0], corners[1], corners[2], corners[0], corners[2], corners[3],
    ]
}

/// Face templates indexed by `BlockSide as usize`.
pub const FACES: [FaceTemplate; 6] = [
    FaceTemplate {
        side: BlockSide::FRONT,
        vertices: quad([[0., 0., 1.], [1., 0., 1.], [1., 1., 1.], [0., 1., 1.]]),
        normal: [0., 0., 1.],
        uv_axes: [Axis::X, Axis::Y],
    },
    FaceTemplate {
        side: BlockSide::BACK,
        vertices: quad([[0., 0., 0.], [0., 1., 0.], [1., 1., 0.], [1., 0., 0.]]),
        normal: [0., 0., -1.],
        uv_axes: [Axis::X, Axis::Y],
    },
    FaceTemplate {
        side: BlockSide::BOTTOM,
        vertices: quad([[0., 0., 0.], [1., 0., 0.], [1., 0., 1.], [0., 0., 1.]]),
        normal: [0., -1., 0.],
        uv_axes: [Axis::X, Axis::Z],
    },
    FaceTemplate {
        side: BlockSide::TOP,
        vertices: quad([[0., 1., 0.], [0., 1., 1.], [1., 1., 1.], [1., 1., 0.]]),
        normal: [0., 1., 0.],
        uv_axes: [Axis::X, Axis::Z],
    },
    FaceTemplate {
        side: BlockSide::LEFT,
        vertices: quad([[0., 0., 0.], [0., 0., 1.], [0., 1., 1.], [0., 1., 0.]]),
        normal: [-1., 0., 0.],
        uv_axes: [Axis::Z, Axis::Y],
    },
    FaceTemplate {
        side: BlockSide::RIGHT,
        vertices: quad([[1., 0., 0.], [1., 1., 0.], [1., 1., 1.], [1., 0., 1.]]),
        normal: [1., 0., 0.],
        uv_axes: [Axis::Z, Axis::Y],
    },
];

impl FaceTemplate {
    /// The template for `side`.
    #[inline]
    pub fn for_side(side: BlockSide) -> &'static FaceTemplate {
        &FACES[side as usize]
    }

    /// Texture coordinates of a vertex offset.
    #[inline]
    pub fn uv(&self, offset: [f32; 3]) -> [f32; 2] {
        [offset[self.uv_axes[0] as usize], offset[self.uv_axes[1] as usize]]
    }
}
