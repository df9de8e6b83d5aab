//! # Face Visibility Meshing
//!
//! Turns a chunk's block grid into a flat triangle list containing one quad per
//! visible block face.
//!
//! ## Visibility Rule
//!
//! A face of a solid block is visible when the block across that face is:
//!
//! - air
//! - in a chunk that is not Ready (`Missing`)
//! - outside the world column (`OutOfRange`)
//!
//! Unknown space therefore shows faces instead of hiding them, so the edge of the
//! loaded terrain never has gaps. The top face of a block on the ceiling layer is
//! always visible.
//!
//! Neighbours inside the chunk are read from its grid. Neighbours across a chunk
//! border are resolved through [`ChunkRegistry::get_world_block_id`], which never
//! starts or waits on generation.
//!
//! Adjacent identical faces are not merged.

use std::collections::BTreeMap;

use cgmath::Point3;
use log::debug;

use crate::engine_state::{
    error::WorldError,
    rendering::{vertex::FaceVertex, MeshSink},
    voxels::{
        block::{block_side::BlockSide, BlockId},
        chunk::{Chunk, ChunkCoord},
        world::ChunkRegistry,
    },
};

pub mod face;

use face::FaceTemplate;

/// What lies across a block face.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Neighbor {
    /// A block with the given identifier
    Block(BlockId),
    /// A block in a chunk that is not Ready
    Missing,
    /// A position outside the world column
    OutOfRange,
}

impl From<Result<BlockId, WorldError>> for Neighbor {
    fn from(lookup: Result<BlockId, WorldError>) -> Self {
        match lookup {
            Ok(id) => Neighbor::Block(id),
            Err(WorldError::OutOfRange { .. }) => Neighbor::OutOfRange,
            Err(WorldError::Missing(_))
            | Err(WorldError::Cancelled(_))
            | Err(WorldError::InvalidGenerationInput(_)) => Neighbor::Missing,
        }
    }
}

/// Whether a face with `neighbor` across it should be drawn.
#[inline]
pub fn is_face_visible(neighbor: Neighbor) -> bool {
    match neighbor {
        Neighbor::Block(id) => id.is_air(),
        Neighbor::Missing | Neighbor::OutOfRange => true,
    }
}

/// Looks up the block across `side` of local cell `(x, y, z)` in `chunk`.
pub fn neighbor_of(
    chunk: &Chunk,
    registry: &ChunkRegistry,
    position: Point3<usize>,
    side: BlockSide,
) -> Neighbor {
    let dims = chunk.dimensions();
    let offset = side.offset();
    let nx = position.x as i64 + offset.x as i64;
    let ny = position.y as i64 + offset.y as i64;
    let nz = position.z as i64 + offset.z as i64;

    if ny < 0 || ny >= dims.height as i64 {
        return Neighbor::OutOfRange;
    }

    let width = dims.width as i64;
    if (0..width).contains(&nx) && (0..width).contains(&nz) {
        return match chunk.grid.id_at(nx, ny, nz) {
            Ok(id) => Neighbor::Block(id),
            Err(_) => Neighbor::OutOfRange,
        };
    }

    let Some(origin) = dims.chunk_origin(chunk.coord) else {
        return Neighbor::OutOfRange;
    };
    let world_x = i32::try_from(origin.x as i64 + nx);
    let world_z = i32::try_from(origin.z as i64 + nz);
    match (world_x, world_z) {
        (Ok(wx), Ok(wz)) => registry.get_world_block_id(wx, ny as i32, wz).into(),
        _ => Neighbor::OutOfRange,
    }
}

/// Whether `side` of the solid block at `position` is visible.
pub fn face_visible(
    chunk: &Chunk,
    registry: &ChunkRegistry,
    position: Point3<usize>,
    side: BlockSide,
) -> bool {
    if side == BlockSide::TOP && position.y + 1 == chunk.dimensions().height {
        return true;
    }
    is_face_visible(neighbor_of(chunk, registry, position, side))
}

/// Triangles of every visible face of one block type.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BlockSurface {
    /// Positions, three per triangle
    pub vertices: Vec<[f32; 3]>,
    /// Normals, one per position
    pub normals: Vec<[f32; 3]>,
    /// Texture coordinates, one per position
    pub uvs: Vec<[f32; 2]>,
}

/// Triangle list produced by meshing one chunk.
///
/// Positions are relative to `origin`, the world position of the chunk's local
/// `(0, 0, 0)`. Every face contributes six consecutive vertices.
#[derive(Clone, Debug, PartialEq)]
pub struct FaceGeometry {
    /// The chunk this geometry was built from
    pub coord: ChunkCoord,
    /// World position of the chunk origin
    pub origin: Point3<i32>,
    /// Flat triangle list
    pub vertices: Vec<FaceVertex>,
}

impl FaceGeometry {
    /// Number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.vertices.len() / 3
    }

    /// Number of block faces.
    pub fn face_count(&self) -> usize {
        self.vertices.len() / 6
    }

    /// Number of faces pointing towards `side`.
    pub fn faces_on(&self, side: BlockSide) -> usize {
        let normal = FaceTemplate::for_side(side).normal;
        self.vertices
            .chunks_exact(6)
            .filter(|face| face[0].normal == normal)
            .count()
    }

    /// Whether no face was visible.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Splits the vertices into parallel position, normal and uv arrays.
    pub fn split_arrays(&self) -> (Vec<[f32; 3]>, Vec<[f32; 3]>, Vec<[f32; 2]>) {
        let mut positions = Vec::with_capacity(self.vertices.len());
        let mut normals = Vec::with_capacity(self.vertices.len());
        let mut uvs = Vec::with_capacity(self.vertices.len());
        for vertex in &self.vertices {
            positions.push(vertex.position);
            normals.push(vertex.normal);
            uvs.push(vertex.uv);
        }
        (positions, normals, uvs)
    }

    /// Groups the triangles by block identifier, in identifier order.
    pub fn surfaces(&self) -> BTreeMap<BlockId, BlockSurface> {
        let mut surfaces: BTreeMap<BlockId, BlockSurface> = BTreeMap::new();
        for vertex in &self.vertices {
            let surface = surfaces.entry(BlockId(vertex.block_id as u16)).or_default();
            surface.vertices.push(vertex.position);
            surface.normals.push(vertex.normal);
            surface.uvs.push(vertex.uv);
        }
        surfaces
    }

    /// The vertex buffer as raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Hands every block surface to `sink`.
    pub fn submit_to(&self, sink: &mut dyn MeshSink) {
        for (block, surface) in self.surfaces() {
            sink.submit_mesh(
                self.coord,
                block,
                &surface.vertices,
                &surface.normals,
                &surface.uvs,
            );
        }
    }
}

/// Builds the face geometry of `chunk`.
///
/// # Arguments
/// * `chunk` - The chunk to mesh
/// * `registry` - Used for neighbours across the chunk border; never generates
///
/// # Returns
/// A triangle list owned by the caller, or `InvalidGenerationInput` if the chunk
/// has no `i32` world origin
pub fn build(chunk: &Chunk, registry: &ChunkRegistry) -> Result<FaceGeometry, WorldError> {
    let start = web_time::Instant::now();
    let dims = chunk.dimensions();
    let origin = dims.chunk_origin(chunk.coord).ok_or_else(|| {
        WorldError::InvalidGenerationInput(format!(
            "chunk {} lies outside the addressable world",
            chunk.coord
        ))
    })?;
    let mut vertices = Vec::new();

    for y in 0..dims.height {
        for z in 0..dims.width {
            for x in 0..dims.width {
                let id = match chunk.grid.id_at(x as i64, y as i64, z as i64) {
                    Ok(id) if !id.is_air() => id,
                    _ => continue,
                };
                let position = Point3::new(x, y, z);

                for side in BlockSide::all() {
                    if !face_visible(chunk, registry, position, side) {
                        continue;
                    }
                    let template = FaceTemplate::for_side(side);
                    vertices.extend(template.vertices.iter().map(|&offset| {
                        FaceVertex::new(position, offset, template.normal, template.uv(offset), id.0)
                    }));
                }
            }
        }
    }

    let geometry = FaceGeometry {
        coord: chunk.coord,
        origin,
        vertices,
    };
    debug!(
        "Meshed chunk {}: {} faces in {:?}",
        chunk.coord,
        geometry.face_count(),
        start.elapsed()
    );
    Ok(geometry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::{
        block::{block_type::BlockType, Block},
        chunk::ChunkDimensions,
        terrain::{TerrainGenerator, TerrainParams},
    };

    fn empty_registry(dims: ChunkDimensions) -> ChunkRegistry {
        ChunkRegistry::new(TerrainGenerator::new(dims, TerrainParams::flat(0.5)).unwrap(), 0)
    }

    #[test]
    fn visibility_rule() {
        assert!(is_face_visible(Neighbor::Block(BlockId::AIR)));
        assert!(is_face_visible(Neighbor::Missing));
        assert!(is_face_visible(Neighbor::OutOfRange));
        assert!(!is_face_visible(Neighbor::Block(BlockType::STONE.into())));
    }

    #[test]
    fn lookup_errors_map_to_neighbors() {
        let missing: Result<BlockId, WorldError> = Err(WorldError::Missing(ChunkCoord::new(1, 0)));
        assert_eq!(Neighbor::from(missing), Neighbor::Missing);
        let out: Result<BlockId, WorldError> = Err(WorldError::OutOfRange { x: 0, y: -1, z: 0 });
        assert_eq!(Neighbor::from(out), Neighbor::OutOfRange);
        let cancelled: Result<BlockId, WorldError> = Err(WorldError::Cancelled(ChunkCoord::new(0, 1)));
        assert_eq!(Neighbor::from(cancelled), Neighbor::Missing);
        let failed: Result<BlockId, WorldError> =
            Err(WorldError::InvalidGenerationInput("broken store".into()));
        assert_eq!(Neighbor::from(failed), Neighbor::Missing);
    }

    #[test]
    fn unaddressable_chunk_is_not_meshed() {
        let dims = ChunkDimensions::new(2, 2);
        let registry = empty_registry(dims);
        let mut chunk = Chunk::empty(ChunkCoord::new(i32::MAX, 0), dims);
        chunk.set_block_at(0, 0, 0, Block::new(BlockType::STONE)).unwrap();

        assert!(matches!(
            build(&chunk, &registry),
            Err(WorldError::InvalidGenerationInput(_))
        ));
        assert_eq!(
            neighbor_of(&chunk, &registry, Point3::new(0, 0, 0), BlockSide::LEFT),
            Neighbor::OutOfRange
        );
    }

    #[test]
    fn ceiling_top_face_is_always_visible() {
        let dims = ChunkDimensions::new(2, 2);
        let registry = empty_registry(dims);
        let mut chunk = Chunk::empty(ChunkCoord::new(0, 0), dims);
        for (x, y, z) in [(0, 0, 0), (0, 1, 0)] {
            chunk.set_block_at(x, y, z, Block::new(BlockType::STONE)).unwrap();
        }
        assert!(face_visible(&chunk, &registry, Point3::new(0, 1, 0), BlockSide::TOP));
        assert!(!face_visible(&chunk, &registry, Point3::new(0, 0, 0), BlockSide::TOP));
        assert!(!face_visible(&chunk, &registry, Point3::new(0, 1, 0), BlockSide::BOTTOM));
    }

    #[test]
    fn border_neighbors_are_missing_without_loaded_chunks() {
        let dims = ChunkDimensions::new(2, 2);
        let registry = empty_registry(dims);
        let chunk = Chunk::empty(ChunkCoord::new(0, 0), dims);
        assert_eq!(
            neighbor_of(&chunk, &registry, Point3::new(0, 0, 0), BlockSide::LEFT),
            Neighbor::Missing
        );
        assert_eq!(
            neighbor_of(&chunk, &registry, Point3::new(0, 0, 0), BlockSide::BOTTOM),
            Neighbor::OutOfRange
        );
        assert_eq!(
            neighbor_of(&chunk, &registry, Point3::new(0, 0, 0), BlockSide::RIGHT),
            Neighbor::Block(BlockId::AIR)
        );
        assert_eq!(registry.generation_runs(), 0);
    }

    #[test]
    fn geometry_helpers_agree() {
        let dims = ChunkDimensions::new(3, 3);
        let registry = empty_registry(dims);
        let mut chunk = Chunk::empty(ChunkCoord::new(0, 0), dims);
        chunk.set_block_at(1, 1, 1, Block::new(BlockType::DIRT)).unwrap();
        chunk.set_block_at(1, 2, 1, Block::new(BlockType::GRASS)).unwrap();

        let geometry = build(&chunk, &registry).unwrap();
        assert_eq!(geometry.face_count(), 10);
        assert_eq!(geometry.triangle_count(), 20);
        assert_eq!(geometry.faces_on(BlockSide::TOP), 1);
        assert_eq!(geometry.faces_on(BlockSide::BOTTOM), 1);

        let (positions, normals, uvs) = geometry.split_arrays();
        assert_eq!(positions.len(), 60);
        assert_eq!(normals.len(), 60);
        assert_eq!(uvs.len(), 60);
        assert_eq!(geometry.as_bytes().len(), 60 * std::mem::size_of::<FaceVertex>());

        let surfaces = geometry.surfaces();
        assert_eq!(surfaces.len(), 2);
        assert_eq!(surfaces[&BlockId::from(BlockType::GRASS)].vertices.len(), 5 * 6);
        assert_eq!(surfaces[&BlockId::from(BlockType::DIRT)].vertices.len(), 5 * 6);
    }
}
