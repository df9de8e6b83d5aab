//! # Block Type Module
//!
//! This module defines the block palette used by terrain generation.
//! It provides block type identification, conversion to opaque [`BlockId`]s and
//! lookup by name for configuration files.

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

use super::{BlockId, BlockIdSize};

/// Enumerates the block types the terrain generator knows how to place.
///
/// The discriminant of each variant is the [`BlockId`] it is stored as. The
/// `FromPrimitive` derive allows conversion back from stored identifiers.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, FromPrimitive)]
#[allow(non_camel_case_types)]
pub enum BlockType {
    /// An air block, which is non-solid and transparent.
    AIR = 0,

    /// Grass, placed on the topmost block of each column.
    GRASS = 1,

    /// Plain dirt, the first layer below the surface.
    DIRT = 2,

    /// Dirt with stones mixed in, the second layer below the surface.
    PEBBLED_DIRT = 3,

    /// Stone, the filler once all configured layers are exhausted.
    STONE = 4,

    /// The unbreakable layer at the bottom of the world.
    SILICATE = 5,
}

/// Lookup table from configuration names to block types.
static BLOCK_TYPES_BY_NAME: phf::Map<&'static str, BlockType> = phf::phf_map! {
    "air" => BlockType::AIR,
    "grass" => BlockType::GRASS,
    "dirt" => BlockType::DIRT,
    "pebbled_dirt" => BlockType::PEBBLED_DIRT,
    "stone" => BlockType::STONE,
    "silicate" => BlockType::SILICATE,
};

impl BlockType {
    /// Resolves a block type from the name used in configuration files.
    pub fn from_name(name: &str) -> Option<Self> {
        BLOCK_TYPES_BY_NAME.get(name).copied()
    }

    /// Converts a stored identifier back to a palette entry, if it is one.
    pub fn from_id(id: BlockId) -> Option<Self> {
        FromPrimitive::from_u16(id.0)
    }

    /// The configuration name of this block type.
    pub fn name(self) -> &'static str {
        BLOCK_TYPES_BY_NAME
            .entries()
            .find(|(_, block_type)| **block_type == self)
            .map(|(name, _)| *name)
            .unwrap_or("unknown")
    }
}

impl From<BlockType> for BlockId {
    fn from(block_type: BlockType) -> Self {
        BlockId(block_type as BlockIdSize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for name in ["air", "grass", "dirt", "pebbled_dirt", "stone", "silicate"] {
            let block_type = BlockType::from_name(name).expect("palette name should resolve");
            assert_eq!(block_type.name(), name);
        }
        assert_eq!(BlockType::from_name("lava"), None);
    }

    #[test]
    fn ids_map_back_to_types() {
        assert_eq!(BlockId::from(BlockType::AIR), BlockId::AIR);
        assert_eq!(BlockType::from_id(BlockId::from(BlockType::STONE)), Some(BlockType::STONE));
        assert_eq!(BlockType::from_id(BlockId(999)), None);
    }
}
