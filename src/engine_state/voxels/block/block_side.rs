//! # Block Side Module
//!
//! This module defines the six faces of a voxel block together with the
//! neighbour offset and outward normal of each face.

use cgmath::Vector3;

/// Represents the six possible faces of a voxel block.
///
/// Each variant is assigned a unique integer value so it can index per-side
/// tables. The order is: [FRONT, BACK, BOTTOM, TOP, LEFT, RIGHT]
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum BlockSide {
    /// The front face (facing positive Z)
    FRONT = 0,

    /// The back face (facing negative Z)
    BACK = 1,

    /// The bottom face (facing negative Y)
    BOTTOM = 2,

    /// The top face (facing positive Y)
    TOP = 3,

    /// The left face (facing negative X)
    LEFT = 4,

    /// The right face (facing positive X)
    RIGHT = 5,
}

/// Offset from a block to the neighbour sharing each face, indexed by `BlockSide`.
const SIDE_OFFSETS: [[i32; 3]; 6] = [
    [0, 0, 1],
    [0, 0, -1],
    [0, -1, 0],
    [0, 1, 0],
    [-1, 0, 0],
    [1, 0, 0],
];

impl BlockSide {
    /// Returns an array containing all six block faces in a consistent order.
    ///
    /// The order is: [FRONT, BACK, BOTTOM, TOP, LEFT, RIGHT]
    pub fn all() -> [BlockSide; 6] {
        [
            BlockSide::FRONT,
            BlockSide::BACK,
            BlockSide::BOTTOM,
            BlockSide::TOP,
            BlockSide::LEFT,
            BlockSide::RIGHT,
        ]
    }

    /// Offset from a block to its neighbour across this face.
    #[inline]
    pub fn offset(self) -> Vector3<i32> {
        let [x, y, z] = SIDE_OFFSETS[self as usize];
        Vector3::new(x, y, z)
    }

    /// Outward unit normal of this face.
    #[inline]
    pub fn normal(self) -> Vector3<f32> {
        let [x, y, z] = SIDE_OFFSETS[self as usize];
        Vector3::new(x as f32, y as f32, z as f32)
    }

    /// The face on the opposite side of the block.
    pub fn opposite(self) -> BlockSide {
        match self {
            BlockSide::FRONT => BlockSide::BACK,
            BlockSide::BACK => BlockSide::FRONT,
            BlockSide::BOTTOM => BlockSide::TOP,
            BlockSide::TOP => BlockSide::BOTTOM,
            BlockSide::LEFT => BlockSide::RIGHT,
            BlockSide::RIGHT => BlockSide::LEFT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Zero;

    #[test]
    fn opposite_offsets_cancel() {
        for side in BlockSide::all() {
            assert!((side.offset() + side.opposite().offset()).is_zero(), "{side:?}");
            assert_eq!(side.opposite().opposite(), side);
        }
    }

    #[test]
    fn offsets_are_unit_axis_steps() {
        for side in BlockSide::all() {
            let o = side.offset();
            assert_eq!(o.x.abs() + o.y.abs() + o.z.abs(), 1, "{side:?}");
        }
        assert_eq!(BlockSide::TOP.offset(), Vector3::new(0, 1, 0));
    }
}
