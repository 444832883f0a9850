//! Memoized access to procedurally generated voxel chunks.
//!
//! [`ChunkCache`] keeps a bounded, least-recently-used set of chunks and asks a
//! [`ChunkGenerator`] for anything it does not hold. [`SharedChunkCache`] is the
//! same contract behind a lock for concurrent callers.

// Core modules
pub mod chunk;
pub mod error;
pub mod terrain;

pub use craftworld_config as config;

// Re-export commonly used types
pub use chunk::{CacheStats, ChunkCache, SharedChunkCache};
pub use error::{ConfigError, GenerateError};
pub use terrain::{ChunkData, ChunkGenerator, ChunkKey, CraftTerrain, SeededGenerator, VoxelPos};
