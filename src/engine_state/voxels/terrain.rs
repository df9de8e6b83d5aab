//! # Terrain Generation
//!
//! Deterministic heightmap terrain. Each column samples seeded fractal 2D noise at
//! its world coordinates, turns the sample into a `terrain_peak`, and fills the
//! column bottom-up from a layered block palette.
//!
//! Generation is a pure function of `(chunk, seed)` and the generator's
//! parameters: no shared state is read or written, so the same inputs always give
//! identical grids regardless of which thread runs them or in what order.

use std::ops::Range;

use log::debug;
use noise::{Fbm, MultiFractal, NoiseFn, OpenSimplex};
use serde::{Deserialize, Serialize};

use crate::engine_state::{
    error::WorldError,
    voxels::{
        block::{block_type::BlockType, BlockId},
        chunk::{BlockGrid, ChunkCoord, ChunkDimensions},
    },
};

/// Upper bound on fractal octaves accepted by the noise source.
const MAX_OCTAVES: usize = 32;

/// One band of the block palette below the surface.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PaletteLayer {
    /// The layer covers blocks whose depth below the peak is at most this value.
    pub depth: usize,
    /// Palette name of the block used for the layer.
    pub block: String,
}

/// Which blocks make up a column.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    /// Block placed at the peak of each column.
    pub top: String,
    /// Bands below the top block, checked in order.
    pub layers: Vec<PaletteLayer>,
    /// Block used below the last band.
    pub filler: String,
    /// Block at `y == 0`.
    pub bottom: String,
}

impl Default for Palette {
    fn default() -> Self {
        Palette {
            top: "grass".into(),
            layers: vec![
                PaletteLayer {
                    depth: 4,
                    block: "dirt".into(),
                },
                PaletteLayer {
                    depth: 8,
                    block: "pebbled_dirt".into(),
                },
            ],
            filler: "stone".into(),
            bottom: "silicate".into(),
        }
    }
}

/// Parameters of the noise source and of the peak-height formula.
///
/// The peak of a column is `floor(height × (base + amplitude × noise))`, clamped to
/// the chunk height, where `noise` is the fractal sample in roughly `[-1, 1]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainParams {
    /// Horizontal frequency of the base octave, in cycles per block.
    pub frequency: f64,
    /// Number of fractal octaves.
    pub octaves: usize,
    /// Frequency multiplier between octaves.
    pub lacunarity: f64,
    /// Amplitude multiplier between octaves.
    pub persistence: f64,
    /// Mean surface height as a fraction of the chunk height.
    pub base: f64,
    /// How far the noise moves the surface, as a fraction of the chunk height.
    pub amplitude: f64,
    /// Column block layout.
    pub palette: Palette,
}

impl Default for TerrainParams {
    fn default() -> Self {
        TerrainParams {
            frequency: 1.0 / 64.0,
            octaves: 3,
            lacunarity: 2.0,
            persistence: 0.5,
            base: 0.1,
            amplitude: 1.0 / 14.0,
            palette: Palette::default(),
        }
    }
}

impl TerrainParams {
    /// Parameters that produce the same height everywhere.
    pub fn flat(base: f64) -> Self {
        TerrainParams {
            base,
            amplitude: 0.0,
            ..TerrainParams::default()
        }
    }

    /// Checks every numeric parameter, reporting the first unusable one.
    pub fn validate(&self) -> Result<(), WorldError> {
        let invalid = |what: String| Err(WorldError::InvalidGenerationInput(what));

        for (name, value) in [
            ("frequency", self.frequency),
            ("lacunarity", self.lacunarity),
            ("persistence", self.persistence),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return invalid(format!("{name} must be finite and positive, got {value}"));
            }
        }
        if self.octaves == 0 || self.octaves > MAX_OCTAVES {
            return invalid(format!("octaves must be in 1..={MAX_OCTAVES}, got {}", self.octaves));
        }
        if !self.base.is_finite() || !self.amplitude.is_finite() || self.amplitude < 0.0 {
            return invalid(format!(
                "base and amplitude must be finite with amplitude >= 0, got base {} amplitude {}",
                self.base, self.amplitude
            ));
        }
        if self.base - self.amplitude < 0.0 || self.base + self.amplitude > 1.0 {
            return invalid(format!(
                "surface range [{}, {}] leaves the world column",
                self.base - self.amplitude,
                self.base + self.amplitude
            ));
        }
        Ok(())
    }
}

/// Palette with every name resolved to an identifier.
#[derive(Clone, Debug)]
struct ResolvedPalette {
    top: BlockId,
    layers: Vec<(usize, BlockId)>,
    filler: BlockId,
    bottom: BlockId,
}

impl ResolvedPalette {
    fn resolve(palette: &Palette) -> Result<Self, WorldError> {
        let lookup = |name: &str| {
            BlockType::from_name(name)
                .map(BlockId::from)
                .ok_or_else(|| WorldError::InvalidGenerationInput(format!("unknown block `{name}`")))
        };
        Ok(ResolvedPalette {
            top: lookup(&palette.top)?,
            layers: palette
                .layers
                .iter()
                .map(|layer| -> Result<(usize, BlockId), WorldError> {
                    Ok((layer.depth, lookup(&layer.block)?))
                })
                .collect::<Result<_, _>>()?,
            filler: lookup(&palette.filler)?,
            bottom: lookup(&palette.bottom)?,
        })
    }
}

/// Produces fully populated block grids from chunk coordinates and a seed.
#[derive(Clone, Debug)]
pub struct TerrainGenerator {
    dimensions: ChunkDimensions,
    params: TerrainParams,
    palette: ResolvedPalette,
}

impl TerrainGenerator {
    /// Creates a generator, rejecting unusable dimensions or parameters.
    pub fn new(dimensions: ChunkDimensions, params: TerrainParams) -> Result<Self, WorldError> {
        if dimensions.width == 0 || dimensions.height == 0 {
            return Err(WorldError::InvalidGenerationInput(format!(
                "chunk dimensions must be non-zero, got {}x{}",
                dimensions.width, dimensions.height
            )));
        }
        params.validate()?;
        let palette = ResolvedPalette::resolve(&params.palette)?;
        Ok(TerrainGenerator {
            dimensions,
            params,
            palette,
        })
    }

    /// The chunk dimensions this generator fills.
    pub fn dimensions(&self) -> ChunkDimensions {
        self.dimensions
    }

    /// The parameters this generator was built with.
    pub fn params(&self) -> &TerrainParams {
        &self.params
    }

    fn noise(&self, seed: u32) -> Fbm<OpenSimplex> {
        Fbm::<OpenSimplex>::new(seed)
            .set_octaves(self.params.octaves)
            .set_frequency(self.params.frequency)
            .set_lacunarity(self.params.lacunarity)
            .set_persistence(self.params.persistence)
    }

    /// Turns a noise sample into the y of the highest solid block of a column.
    pub fn terrain_peak(&self, noise: f64) -> Result<usize, WorldError> {
        let height = self.dimensions.height as f64;
        let raw = height * (self.params.base + self.params.amplitude * noise);
        if !raw.is_finite() {
            return Err(WorldError::InvalidGenerationInput(format!(
                "terrain peak is not finite for noise sample {noise}"
            )));
        }
        Ok(raw.floor().clamp(0.0, height - 1.0) as usize)
    }

    /// The block at height `y` of a column whose peak is `peak`.
    pub fn column_block(&self, y: usize, peak: usize) -> BlockId {
        if y > peak {
            return BlockId::AIR;
        }
        if y == peak {
            return self.palette.top;
        }
        if y == 0 {
            return self.palette.bottom;
        }
        let depth = peak - y;
        self.palette
            .layers
            .iter()
            .find(|(max_depth, _)| depth <= *max_depth)
            .map(|(_, id)| *id)
            .unwrap_or(self.palette.filler)
    }

    /// Peak height of the column at world `(world_x, world_z)`.
    pub fn surface_height(&self, world_x: i32, world_z: i32, seed: u32) -> Result<usize, WorldError> {
        let sample = self.noise(seed).get([world_x as f64, world_z as f64]);
        self.terrain_peak(sample)
    }

    /// Splits a column with peak `peak` into maximal runs of one block each,
    /// bottom first.
    pub fn column_runs(&self, peak: usize) -> Vec<(Range<usize>, BlockId)> {
        let mut runs: Vec<(Range<usize>, BlockId)> = Vec::new();
        for y in 0..=peak {
            let id = self.column_block(y, peak);
            match runs.last_mut() {
                Some((range, run_id)) if *run_id == id => range.end = y + 1,
                _ => runs.push((y..y + 1, id)),
            }
        }
        runs
    }

    /// Generates the grid for `chunk`.
    pub fn generate(&self, chunk: ChunkCoord, seed: u32) -> Result<BlockGrid, WorldError> {
        let noise = self.noise(seed);
        let mut grid = BlockGrid::new(self.dimensions);

        for z in 0..self.dimensions.width {
            for x in 0..self.dimensions.width {
                let (world_x, world_z) = self.dimensions.to_world(chunk, x, z).ok_or_else(|| {
                    WorldError::InvalidGenerationInput(format!(
                        "chunk {chunk} lies outside the addressable world"
                    ))
                })?;
                let peak = self.terrain_peak(noise.get([world_x as f64, world_z as f64]))?;
                for (range, id) in self.column_runs(peak) {
                    grid.fill_column(x, z, range, id)
                        .map_err(|e| WorldError::InvalidGenerationInput(e.to_string()))?;
                }
            }
        }

        debug!(
            "Generated terrain for chunk {} ({} solid blocks)",
            chunk,
            grid.solid_count()
        );
        Ok(grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator(params: TerrainParams) -> TerrainGenerator {
        TerrainGenerator::new(ChunkDimensions::new(16, 64), params).unwrap()
    }

    #[test]
    fn generation_is_deterministic() {
        let generator = generator(TerrainParams::default());
        for coord in [ChunkCoord::new(0, 0), ChunkCoord::new(-3, 7)] {
            let a = generator.generate(coord, 1234).unwrap();
            let b = generator.generate(coord, 1234).unwrap();
            assert_eq!(a.ids(), b.ids(), "chunk {coord}");
        }
    }

    #[test]
    fn seed_changes_terrain() {
        let generator = TerrainGenerator::new(
            ChunkDimensions::new(16, 256),
            TerrainParams {
                base: 0.5,
                amplitude: 0.4,
                ..TerrainParams::default()
            },
        )
        .unwrap();
        let a = generator.generate(ChunkCoord::new(2, 2), 1).unwrap();
        let b = generator.generate(ChunkCoord::new(2, 2), 2).unwrap();
        assert_ne!(a.ids(), b.ids());
    }

    #[test]
    fn columns_are_solid_up_to_peak_then_air() {
        let generator = generator(TerrainParams::default());
        let coord = ChunkCoord::new(1, -1);
        let grid = generator.generate(coord, 99).unwrap();
        let dims = generator.dimensions();
        for z in 0..dims.width {
            for x in 0..dims.width {
                let (wx, wz) = dims.to_world(coord, x, z).unwrap();
                let peak = generator.surface_height(wx, wz, 99).unwrap();
                assert_eq!(grid.column_top(x, z), Some(peak));
                for y in 0..dims.height {
                    let id = grid.id_at(x as i64, y as i64, z as i64).unwrap();
                    assert_eq!(id.is_air(), y > peak, "column ({x}, {z}) y {y}");
                }
            }
        }
    }

    #[test]
    fn palette_layers_follow_depth() {
        let flat = generator(TerrainParams::flat(0.5));
        let peak = 32;
        assert_eq!(flat.column_block(peak + 1, peak), BlockId::AIR);
        assert_eq!(flat.column_block(peak, peak), BlockId::from(BlockType::GRASS));
        assert_eq!(flat.column_block(peak - 4, peak), BlockId::from(BlockType::DIRT));
        assert_eq!(flat.column_block(peak - 5, peak), BlockId::from(BlockType::PEBBLED_DIRT));
        assert_eq!(flat.column_block(peak - 9, peak), BlockId::from(BlockType::STONE));
        assert_eq!(flat.column_block(0, peak), BlockId::from(BlockType::SILICATE));
        assert_eq!(flat.column_block(0, 0), BlockId::from(BlockType::GRASS));
    }

    #[test]
    fn columns_fill_in_palette_runs() {
        let flat = generator(TerrainParams::flat(0.5));
        assert_eq!(
            flat.column_runs(32),
            vec![
                (0..1, BlockId::from(BlockType::SILICATE)),
                (1..24, BlockId::from(BlockType::STONE)),
                (24..28, BlockId::from(BlockType::PEBBLED_DIRT)),
                (28..32, BlockId::from(BlockType::DIRT)),
                (32..33, BlockId::from(BlockType::GRASS)),
            ]
        );
        assert_eq!(flat.column_runs(0), vec![(0..1, BlockId::from(BlockType::GRASS))]);
    }

    #[test]
    fn unaddressable_chunk_is_rejected() {
        let generator = generator(TerrainParams::default());
        assert!(matches!(
            generator.generate(ChunkCoord::new(i32::MAX, 0), 1),
            Err(WorldError::InvalidGenerationInput(_))
        ));
    }

    #[test]
    fn peak_is_clamped_and_rejects_non_finite() {
        let flat = generator(TerrainParams::flat(0.5));
        assert_eq!(flat.terrain_peak(0.0).unwrap(), 32);
        assert!(matches!(
            flat.terrain_peak(f64::NAN),
            Err(WorldError::InvalidGenerationInput(_))
        ));

        let steep = generator(TerrainParams {
            base: 0.5,
            amplitude: 0.5,
            ..TerrainParams::default()
        });
        assert_eq!(steep.terrain_peak(1.5).unwrap(), 63);
        assert_eq!(steep.terrain_peak(-1.5).unwrap(), 0);
    }

    #[test]
    fn invalid_params_are_rejected() {
        let dims = ChunkDimensions::new(16, 64);
        let cases = [
            TerrainParams {
                frequency: f64::NAN,
                ..TerrainParams::default()
            },
            TerrainParams {
                octaves: 0,
                ..TerrainParams::default()
            },
            TerrainParams {
                amplitude: f64::INFINITY,
                ..TerrainParams::default()
            },
            TerrainParams {
                base: 0.9,
                amplitude: 0.5,
                ..TerrainParams::default()
            },
        ];
        for params in cases {
            assert!(matches!(
                TerrainGenerator::new(dims, params.clone()),
                Err(WorldError::InvalidGenerationInput(_))
            ));
        }

        let mut unknown = TerrainParams::default();
        unknown.palette.top = "lava".into();
        assert!(TerrainGenerator::new(dims, unknown).is_err());
        assert!(TerrainGenerator::new(ChunkDimensions::new(0, 64), TerrainParams::default()).is_err());
    }
}
