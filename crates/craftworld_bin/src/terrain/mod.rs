mod chunk;
mod chunk_generator;
mod craft;
mod noise;

pub use chunk::{BlockType, ChunkData, ChunkKey, VoxelPos};
pub use chunk_generator::{ChunkGenerator, FnGenerator, SeededGenerator, StatefulTerrain, from_fn};
pub use craft::CraftTerrain;
pub use noise::{FractalParams, NoiseField};
