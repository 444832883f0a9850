use std::collections::HashSet;
use std::sync::Arc;

use craftworld_config::{ConfigError, WorldConfig};
use parking_lot::{Condvar, Mutex};
use tracing::trace;

use crate::chunk::chunk_cache::{CacheStats, ResidentSet, capacity};
use crate::error::GenerateError;
use crate::terrain::{ChunkData, ChunkGenerator, ChunkKey};

struct State {
    resident:  ResidentSet,
    in_flight: HashSet<ChunkKey>,
}

/// Thread-safe chunk cache.
///
/// The lock covers cache bookkeeping only; generator calls run unlocked, so
/// misses on different keys can generate in parallel as far as the generator
/// allows. At most one generation per
/// key is in flight: other requesters of that key block until it finishes and
/// then take the cached result. If it fails, one of them retries.
pub struct SharedChunkCache<G> {
    seed:      Option<i64>,
    generator: G,
    state:     Mutex<State>,
    finished:  Condvar,
}

/// Releases an in-flight claim even if the generator unwinds. An unwind
/// never reaches `settled = true` and is counted as a failure.
struct Claim<'a, G> {
    cache:   &'a SharedChunkCache<G>,
    key:     ChunkKey,
    settled: bool,
}

impl<G> Drop for Claim<'_, G> {
    fn drop(&mut self) {
        let mut state = self.cache.state.lock();
        if !self.settled {
            state.resident.record_panic(self.key);
        }
        state.in_flight.remove(&self.key);
        drop(state);
        self.cache.finished.notify_all();
    }
}

impl<G: ChunkGenerator> SharedChunkCache<G> {
    pub fn new(seed: Option<i64>, cache_size: usize, generator: G) -> Result<Self, ConfigError> {
        Ok(Self {
            seed,
            generator,
            state: Mutex::new(State {
                resident:  ResidentSet::new(capacity(cache_size)?),
                in_flight: HashSet::new(),
            }),
            finished: Condvar::new(),
        })
    }

    pub fn from_config(config: &WorldConfig, generator: G) -> Result<Self, ConfigError> {
        config.validate()?;
        Self::new(config.seed, config.cache_size, generator)
    }

    /// Returns the chunk at `(p, q)`, generating it on a miss.
    pub fn get(&self, p: i32, q: i32) -> Result<Arc<ChunkData>, GenerateError> {
        let key = ChunkKey::new(p, q);

        let mut state = self.state.lock();
        loop {
            if let Some(chunk) = state.resident.lookup(key) {
                return Ok(chunk);
            }
            if !state.in_flight.contains(&key) {
                break;
            }
            trace!("[CHUNK] Waiting on in-flight generation of {}", key);
            self.finished.wait(&mut state);
        }

        state.in_flight.insert(key);
        state.resident.record_miss(key);
        drop(state);

        let mut claim = Claim {
            cache: self,
            key,
            settled: false,
        };
        let result = self.generator.generate(self.seed, key);

        let mut state = self.state.lock();
        let result = match result {
            Ok(chunk) => {
                let chunk = Arc::new(chunk);
                state.resident.admit(key, Arc::clone(&chunk));
                Ok(chunk)
            }
            Err(err) => {
                state.resident.record_failure(&err);
                Err(err)
            }
        };
        claim.settled = true;
        // the claim is released only after the chunk is visible to waiters
        drop(state);
        drop(claim);

        result
    }

    pub fn seed(&self) -> Option<i64> {
        self.seed
    }

    pub fn contains(&self, p: i32, q: i32) -> bool {
        self.state.lock().resident.contains(ChunkKey::new(p, q))
    }

    pub fn len(&self) -> usize {
        self.state.lock().resident.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.state.lock().resident.capacity()
    }

    pub fn resident_keys(&self) -> Vec<ChunkKey> {
        self.state.lock().resident.keys()
    }

    pub fn stats(&self) -> CacheStats {
        self.state.lock().resident.stats()
    }
}
