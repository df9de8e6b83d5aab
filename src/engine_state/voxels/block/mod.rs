//! # Block Module
//!
//! This module provides the core block-related functionality for the voxel world.
//! It includes the opaque block identifier, optional per-block metadata, the block
//! palette used by terrain generation, and block face handling.

use std::{collections::BTreeMap, fmt, sync::Arc};

pub mod block_side;
pub mod block_type;

/// The underlying integer type used to represent block identifiers in memory.
pub type BlockIdSize = u16;

/// Opaque block identifier.
///
/// The core never interprets identifiers beyond the reserved [`BlockId::AIR`]; mapping
/// an identifier to a visual material is left to the rendering collaborator.
///
/// # Memory Layout
/// `#[repr(transparent)]` keeps the identifier the size of a `u16`, and an
/// all-zero buffer is a buffer of air.
#[repr(transparent)]
#[derive(
    Copy,
    Clone,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    bytemuck::Pod,
    bytemuck::Zeroable,
    serde::Serialize,
    serde::Deserialize,
)]
pub struct BlockId(pub BlockIdSize);

impl BlockId {
    /// Empty space.
    pub const AIR: BlockId = BlockId(0);

    /// Returns `true` for the air identifier.
    #[inline]
    pub fn is_air(self) -> bool {
        self == Self::AIR
    }
}

impl fmt::Debug for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlockId({})", self.0)
    }
}

/// Optional key/value data attached to a single block.
///
/// The map is shared behind an `Arc` so copying a block out of a grid never
/// clones the map itself.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum BlockMetadata {
    /// The block carries no metadata.
    #[default]
    None,
    /// Arbitrary string properties.
    KeyValue(Arc<BTreeMap<String, String>>),
}

impl BlockMetadata {
    /// Builds key/value metadata from any iterator of pairs.
    ///
    /// An empty iterator yields [`BlockMetadata::None`].
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        let map: BTreeMap<String, String> = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        if map.is_empty() {
            BlockMetadata::None
        } else {
            BlockMetadata::KeyValue(Arc::new(map))
        }
    }

    /// Looks up a single property.
    pub fn get(&self, key: &str) -> Option<&str> {
        match self {
            BlockMetadata::None => None,
            BlockMetadata::KeyValue(map) => map.get(key).map(String::as_str),
        }
    }

    /// Whether any metadata is present.
    pub fn is_none(&self) -> bool {
        matches!(self, BlockMetadata::None)
    }
}

/// Represents a single voxel block in the world.
///
/// Blocks are immutable values; two blocks are equal iff their identifiers and
/// metadata match.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Block {
    /// The opaque identifier of this block.
    pub id: BlockId,
    /// Metadata attached to this block, if any.
    pub metadata: BlockMetadata,
}

impl Block {
    /// The empty block.
    pub const AIR: Block = Block {
        id: BlockId::AIR,
        metadata: BlockMetadata::None,
    };

    /// Creates a block with no metadata.
    pub fn new(id: impl Into<BlockId>) -> Self {
        Block {
            id: id.into(),
            metadata: BlockMetadata::None,
        }
    }

    /// Creates a block carrying metadata.
    pub fn with_metadata(id: impl Into<BlockId>, metadata: BlockMetadata) -> Self {
        Block {
            id: id.into(),
            metadata,
        }
    }

    /// Returns `true` if this block is air.
    #[inline]
    pub fn is_air(&self) -> bool {
        self.id.is_air()
    }
}

impl From<BlockId> for Block {
    fn from(id: BlockId) -> Self {
        Block::new(id)
    }
}
