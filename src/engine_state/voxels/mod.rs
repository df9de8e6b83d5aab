//! # Voxel World Core
//!
//! This module contains the voxel data model and the systems that fill it.
//!
//! ## Architecture
//!
//! * **Block**: block identifiers, metadata, named block types and face directions
//! * **Chunk**: fixed-size grids of blocks and the world ↔ chunk coordinate mapping
//! * **Terrain**: deterministic noise-driven generation of chunk content
//! * **World**: the registry that owns every chunk and drives lazy generation
//! * **Persistence**: the seam for previously saved chunk content
//! * **Tasks**: chunk generation as a schedulable task
//!
//! ## Data Flow
//!
//! 1. The world receives a request for a chunk coordinate
//! 2. An absent chunk is loaded from the store or generated, then published
//! 3. Ready chunks are handed to meshing
//! 4. Block queries and edits go through the registry and only touch Ready chunks
//!
//! ## Thread Safety
//!
//! * Published chunks are shared behind read-write locks
//! * Generation of distinct chunks runs in parallel; one coordinate is generated once
//! * Neighbour queries never block on generation

pub mod block;
pub mod chunk;
pub mod persistence;
pub mod tasks;
pub mod terrain;
pub mod world;
