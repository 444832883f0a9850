use std::num::NonZeroUsize;
use std::sync::Arc;

use craftworld_config::{ConfigError, WorldConfig};
use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::chunk::cache::LruCache;
use crate::error::GenerateError;
use crate::terrain::{ChunkData, ChunkGenerator, ChunkKey};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits:      u64,
    pub misses:    u64,
    pub evictions: u64,
    /// Misses whose generation call failed; nothing was cached for them.
    pub failures:  u64,
}

impl CacheStats {
    /// Generator calls made so far, successful or not.
    pub fn generations(&self) -> u64 {
        self.misses
    }

    pub fn hit_ratio(&self) -> f64 {
        let lookups = self.hits + self.misses;
        if lookups == 0 { 0.0 } else { self.hits as f64 / lookups as f64 }
    }
}

impl std::fmt::Display for CacheStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "hits={} misses={} evictions={} failures={} ({:.1}% hit)",
            self.hits,
            self.misses,
            self.evictions,
            self.failures,
            self.hit_ratio() * 100.0
        )
    }
}

pub(crate) fn capacity(cache_size: usize) -> Result<NonZeroUsize, ConfigError> {
    NonZeroUsize::new(cache_size).ok_or(ConfigError::InvalidCacheSize(cache_size))
}

/// Resident chunks plus bookkeeping, shared by the single-threaded and the
/// locked cache front ends.
#[derive(Debug)]
pub(crate) struct ResidentSet {
    lru:   LruCache<ChunkKey, Arc<ChunkData>>,
    stats: CacheStats,
}

impl ResidentSet {
    pub(crate) fn new(capacity: NonZeroUsize) -> Self {
        Self {
            lru:   LruCache::new(capacity),
            stats: CacheStats::default(),
        }
    }

    /// Hit path: promotes `key` and hands out a shared reference.
    pub(crate) fn lookup(&mut self, key: ChunkKey) -> Option<Arc<ChunkData>> {
        let chunk = self.lru.get(&key).cloned()?;
        self.stats.hits += 1;
        trace!("[CHUNK] Cache hit for {}", key);
        Some(chunk)
    }

    pub(crate) fn record_miss(&mut self, key: ChunkKey) {
        self.stats.misses += 1;
        debug!("[CHUNK] Generating new chunk at {}", key);
    }

    pub(crate) fn record_failure(&mut self, err: &GenerateError) {
        self.stats.failures += 1;
        warn!("[CHUNK] Generation failed: {}", err);
    }

    /// Counts a generation that unwound instead of returning.
    pub(crate) fn record_panic(&mut self, key: ChunkKey) {
        self.stats.failures += 1;
        warn!("[CHUNK] Generation of {} panicked", key);
    }

    /// Stores a freshly generated chunk as most recently used, evicting the
    /// least recently used entry if that pushes the set over capacity.
    pub(crate) fn admit(&mut self, key: ChunkKey, chunk: Arc<ChunkData>) {
        if let Some((evicted, _)) = self.lru.insert(key, chunk) {
            self.stats.evictions += 1;
            debug!("[CHUNK] Evicted {} (total evictions: {})", evicted, self.stats.evictions);
        }
    }

    pub(crate) fn contains(&self, key: ChunkKey) -> bool {
        self.lru.contains(&key)
    }

    pub(crate) fn len(&self) -> usize {
        self.lru.len()
    }

    pub(crate) fn capacity(&self) -> usize {
        self.lru.capacity()
    }

    pub(crate) fn keys(&self) -> Vec<ChunkKey> {
        self.lru.keys().copied().collect()
    }

    pub(crate) fn stats(&self) -> CacheStats {
        self.stats
    }
}

/// Memoizes a [`ChunkGenerator`] under a fixed seed, keeping at most
/// `cache_size` chunks.
///
/// Single owner; use [`SharedChunkCache`](crate::chunk::SharedChunkCache)
/// when several threads request chunks.
pub struct ChunkCache<G> {
    seed:      Option<i64>,
    generator: G,
    resident:  ResidentSet,
}

impl<G: ChunkGenerator> ChunkCache<G> {
    pub fn new(seed: Option<i64>, cache_size: usize, generator: G) -> Result<Self, ConfigError> {
        Ok(Self {
            seed,
            generator,
            resident: ResidentSet::new(capacity(cache_size)?),
        })
    }

    pub fn from_config(config: &WorldConfig, generator: G) -> Result<Self, ConfigError> {
        config.validate()?;
        Self::new(config.seed, config.cache_size, generator)
    }

    /// Returns the chunk at `(p, q)`, generating it on a miss.
    ///
    /// A failed generation leaves the cache exactly as it was.
    pub fn get(&mut self, p: i32, q: i32) -> Result<Arc<ChunkData>, GenerateError> {
        let key = ChunkKey::new(p, q);
        if let Some(chunk) = self.resident.lookup(key) {
            return Ok(chunk);
        }

        self.resident.record_miss(key);
        let chunk = match self.generator.generate(self.seed, key) {
            Ok(chunk) => Arc::new(chunk),
            Err(err) => {
                self.resident.record_failure(&err);
                return Err(err);
            }
        };

        self.resident.admit(key, Arc::clone(&chunk));
        Ok(chunk)
    }

    pub fn seed(&self) -> Option<i64> {
        self.seed
    }

    pub fn contains(&self, p: i32, q: i32) -> bool {
        self.resident.contains(ChunkKey::new(p, q))
    }

    pub fn len(&self) -> usize {
        self.resident.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.resident.capacity()
    }

    /// Resident keys from most to least recently used.
    pub fn resident_keys(&self) -> Vec<ChunkKey> {
        self.resident.keys()
    }

    pub fn stats(&self) -> CacheStats {
        self.resident.stats()
    }
}
