use craftworld_config::TerrainConfig;

use crate::error::GenerateError;
use crate::terrain::chunk_generator::StatefulTerrain;
use crate::terrain::noise::{FractalParams, NoiseField};
use crate::terrain::{BlockType, ChunkKey, VoxelPos};

/// Ground at or below this height becomes sand.
const WATER_LEVEL: i32 = 12;
const CLOUD_BAND: std::ops::Range<i32> = 64..72;
/// Trees stay this far from the chunk edge so their canopy never crosses it.
const TREE_MARGIN: i32 = 4;

const GROUND: FractalParams = FractalParams::new(4, 0.5, 2.0);
const MOUNTAINS: FractalParams = FractalParams::new(2, 0.9, 2.0);
const FOLIAGE: FractalParams = FractalParams::new(4, 0.8, 2.0);
const TREES: FractalParams = FractalParams::new(6, 0.5, 2.0);
const CLOUDS: FractalParams = FractalParams::new(8, 0.5, 2.0);

/// Rolling grass and sand terrain with plants, trees and clouds.
#[derive(Clone)]
pub struct CraftTerrain {
    config: TerrainConfig,
    noise:  NoiseField,
}

impl CraftTerrain {
    pub fn new(config: TerrainConfig) -> Self {
        Self {
            config,
            noise: NoiseField::default(),
        }
    }

    fn column(&self, x: i32, z: i32, owned: bool, interior: bool, emit: &mut dyn FnMut(VoxelPos, i32)) {
        let flag = if owned { 1 } else { -1 };
        let (xf, zf) = (x as f32, z as f32);

        let f = self.noise.simplex2(xf * 0.01, zf * 0.01, GROUND);
        let g = self.noise.simplex2(-xf * 0.01, -zf * 0.01, MOUNTAINS);
        let mh = (g * 32.0 + 16.0) as i32;
        let mut h = (f * mh as f32) as i32;
        let mut w = BlockType::Grass;
        if h <= WATER_LEVEL {
            h = WATER_LEVEL;
            w = BlockType::Sand;
        }

        for y in 0..h {
            emit(VoxelPos::new(x, y, z), w.code() * flag);
        }

        if w == BlockType::Grass {
            if self.config.show_plants {
                if self.noise.simplex2(-xf * 0.1, zf * 0.1, FOLIAGE) > 0.6 {
                    emit(VoxelPos::new(x, h, z), BlockType::TallGrass.code() * flag);
                }
                if self.noise.simplex2(xf * 0.05, -zf * 0.05, FOLIAGE) > 0.7 {
                    let flower = BlockType::YellowFlower.code()
                        + (self.noise.simplex2(xf * 0.1, zf * 0.1, FOLIAGE) * 7.0) as i32;
                    emit(VoxelPos::new(x, h, z), flower * flag);
                }
            }

            if self.config.show_trees && interior && self.noise.simplex2(xf, zf, TREES) > 0.84 {
                for y in h + 3..h + 8 {
                    for ox in -3..=3 {
                        for oz in -3..=3 {
                            let d = ox * ox + oz * oz + (y - (h + 4)) * (y - (h + 4));
                            if d < 11 {
                                emit(VoxelPos::new(x + ox, y, z + oz), BlockType::Leaves.code());
                            }
                        }
                    }
                }
                for y in h..h + 7 {
                    emit(VoxelPos::new(x, y, z), BlockType::Wood.code());
                }
            }
        }

        if self.config.show_clouds {
            for y in CLOUD_BAND {
                if self.noise.simplex3(xf * 0.01, y as f32 * 0.1, zf * 0.01, CLOUDS) > 0.75 {
                    emit(VoxelPos::new(x, y, z), BlockType::Cloud.code() * flag);
                }
            }
        }
    }
}

impl StatefulTerrain for CraftTerrain {
    fn reseed(&mut self, seed: Option<i64>) {
        // Seeds are 32-bit on the terrain side; wider values wrap.
        let seed = seed.map_or(0, |s| s as u32);
        if self.noise.seed() != seed {
            self.noise = NoiseField::new(seed);
        }
    }

    /// Emits the chunk plus a one-block padding ring. Padding cells belong to
    /// the neighbouring chunk and carry negated codes.
    fn create_world(
        &self,
        key: ChunkKey,
        emit: &mut dyn FnMut(VoxelPos, i32),
    ) -> Result<(), GenerateError> {
        let size = self.config.chunk_size;
        let overflow = || GenerateError::CoordinateOverflow {
            key,
            chunk_size: size,
        };

        let base_x = key.p.checked_mul(size).ok_or_else(overflow)?;
        let base_z = key.q.checked_mul(size).ok_or_else(overflow)?;
        // whole padded range, tree canopies included, must be representable
        let span = size.checked_add(1).ok_or_else(overflow)?;
        for base in [base_x, base_z] {
            base.checked_sub(1).and_then(|_| base.checked_add(span)).ok_or_else(overflow)?;
        }

        for dx in -1..span {
            for dz in -1..span {
                let owned = (0..size).contains(&dx) && (0..size).contains(&dz);
                let interior = dx - TREE_MARGIN >= 0
                    && dz - TREE_MARGIN >= 0
                    && dx + TREE_MARGIN < size
                    && dz + TREE_MARGIN < size;
                self.column(base_x + dx, base_z + dz, owned, interior, emit);
            }
        }

        Ok(())
    }
}
