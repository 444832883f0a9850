mod cache;
mod chunk_cache;
mod shared;

pub use crate::chunk::chunk_cache::{CacheStats, ChunkCache};
pub use crate::chunk::shared::SharedChunkCache;
