//! World configuration shared by the cache, the terrain and the binary.
//!
//! Values come from (in increasing priority) the built-in defaults, an optional
//! JSON file and the `CRAFTWORLD_*` environment variables.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Resident chunk count used when nothing else is configured.
pub const DEFAULT_CACHE_SIZE: usize = 64;

/// Edge length of a chunk, in blocks.
pub const DEFAULT_CHUNK_SIZE: i32 = 32;

pub const ENV_SEED: &str = "CRAFTWORLD_SEED";
pub const ENV_CACHE_SIZE: &str = "CRAFTWORLD_CACHE_SIZE";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cache size must be at least 1 (got {0})")]
    InvalidCacheSize(usize),

    #[error("chunk size must be positive (got {0})")]
    InvalidChunkSize(i32),

    #[error("failed to read config file {path}: {source}")]
    Io {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config file {path}: {source}")]
    Parse {
        path:   PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid value {value:?} for {var}")]
    Env { var: &'static str, value: String },
}

/// Knobs of the Craft terrain generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    pub chunk_size:  i32,
    pub show_plants: bool,
    pub show_trees:  bool,
    pub show_clouds: bool,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            chunk_size:  DEFAULT_CHUNK_SIZE,
            show_plants: true,
            show_trees:  true,
            show_clouds: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// `None` leaves the generator on its own default seed.
    pub seed:       Option<i64>,
    pub cache_size: usize,
    pub terrain:    TerrainConfig,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed:       None,
            cache_size: DEFAULT_CACHE_SIZE,
            terrain:    TerrainConfig::default(),
        }
    }
}

impl WorldConfig {
    pub fn new(seed: Option<i64>, cache_size: usize) -> Result<Self, ConfigError> {
        let config = Self {
            seed,
            cache_size,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Reads a JSON config file. Missing fields fall back to their defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let config = Self::from_json(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;

        debug!("[CONFIG] Loaded {}", path.display());
        Ok(config)
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|var| std::env::var(var).ok())
    }

    /// Applies `CRAFTWORLD_*` overrides fetched through `lookup`.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_SEED) {
            let trimmed = value.trim();
            self.seed = if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") {
                None
            } else {
                Some(trimmed.parse().map_err(|_| ConfigError::Env {
                    var: ENV_SEED,
                    value: value.clone(),
                })?)
            };
        }

        if let Some(value) = lookup(ENV_CACHE_SIZE) {
            self.cache_size = value.trim().parse().map_err(|_| ConfigError::Env {
                var: ENV_CACHE_SIZE,
                value: value.clone(),
            })?;
        }

        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_size < 1 {
            return Err(ConfigError::InvalidCacheSize(self.cache_size));
        }
        if self.terrain.chunk_size <= 0 {
            return Err(ConfigError::InvalidChunkSize(self.terrain.chunk_size));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = WorldConfig::default();
        assert_eq!(config.seed, None);
        assert_eq!(config.cache_size, DEFAULT_CACHE_SIZE);
        assert_eq!(config.terrain.chunk_size, 32);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_cache_size_rejected() {
        assert!(matches!(WorldConfig::new(Some(1), 0), Err(ConfigError::InvalidCacheSize(0))));
        assert!(WorldConfig::new(Some(1), 1).is_ok());
    }

    #[test]
    fn test_partial_json() {
        let config = WorldConfig::from_json(r#"{ "seed": 42, "terrain": { "show_clouds": false } }"#).unwrap();
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.cache_size, DEFAULT_CACHE_SIZE);
        assert!(!config.terrain.show_clouds);
        assert!(config.terrain.show_trees);
    }

    #[test]
    fn test_negative_cache_size_is_malformed() {
        assert!(WorldConfig::from_json(r#"{ "cache_size": -3 }"#).is_err());
    }

    #[test]
    fn test_overrides() {
        let config = WorldConfig::default()
            .with_overrides(|var| match var {
                ENV_SEED => Some("-7".to_string()),
                ENV_CACHE_SIZE => Some(" 5 ".to_string()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.seed, Some(-7));
        assert_eq!(config.cache_size, 5);

        let unseeded = config
            .with_overrides(|var| (var == ENV_SEED).then(|| "none".to_string()))
            .unwrap();
        assert_eq!(unseeded.seed, None);
    }

    #[test]
    fn test_bad_overrides() {
        let bad_size = WorldConfig::default().with_overrides(|var| (var == ENV_CACHE_SIZE).then(|| "0".to_string()));
        assert!(matches!(bad_size, Err(ConfigError::InvalidCacheSize(0))));

        let bad_seed = WorldConfig::default().with_overrides(|var| (var == ENV_SEED).then(|| "abc".to_string()));
        assert!(matches!(bad_seed, Err(ConfigError::Env { var: ENV_SEED, .. })));
    }

    #[test]
    fn test_missing_file() {
        let err = WorldConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
