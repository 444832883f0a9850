use thiserror::Error;

pub use craftworld_config::ConfigError;

use crate::terrain::ChunkKey;

/// Failure while producing a chunk on a cache miss.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("block coordinates of chunk {key} overflow i32 (chunk size {chunk_size})")]
    CoordinateOverflow { key: ChunkKey, chunk_size: i32 },

    #[error("generator failed for chunk {key}: {reason}")]
    Failed { key: ChunkKey, reason: String },
}

impl GenerateError {
    pub fn failed(key: ChunkKey, reason: impl Into<String>) -> Self {
        Self::Failed {
            key,
            reason: reason.into(),
        }
    }

    pub fn key(&self) -> ChunkKey {
        match self {
            Self::CoordinateOverflow { key, .. } | Self::Failed { key, .. } => *key,
        }
    }
}
