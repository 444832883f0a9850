use parking_lot::Mutex;
use tracing::trace;

use crate::error::GenerateError;
use crate::terrain::{ChunkData, ChunkKey, VoxelPos};

/// Pure chunk generation: the same seed and key always give the same data.
pub trait ChunkGenerator: Send + Sync {
    fn generate(&self, seed: Option<i64>, key: ChunkKey) -> Result<ChunkData, GenerateError>;
}

/// Generator backed by a plain function or closure.
pub struct FnGenerator<F>(F);

pub fn from_fn<F>(f: F) -> FnGenerator<F>
where
    F: Fn(Option<i64>, ChunkKey) -> Result<ChunkData, GenerateError> + Send + Sync,
{
    FnGenerator(f)
}

impl<F> ChunkGenerator for FnGenerator<F>
where
    F: Fn(Option<i64>, ChunkKey) -> Result<ChunkData, GenerateError> + Send + Sync,
{
    fn generate(&self, seed: Option<i64>, key: ChunkKey) -> Result<ChunkData, GenerateError> {
        (self.0)(seed, key)
    }
}

impl<G: ChunkGenerator + ?Sized> ChunkGenerator for std::sync::Arc<G> {
    fn generate(&self, seed: Option<i64>, key: ChunkKey) -> Result<ChunkData, GenerateError> {
        (**self).generate(seed, key)
    }
}

/// A terrain that is seeded in a separate step before generating, and
/// reports blocks through a callback instead of returning them.
pub trait StatefulTerrain: Send {
    /// `None` restores the terrain's default seed.
    fn reseed(&mut self, seed: Option<i64>);

    fn create_world(
        &self,
        key: ChunkKey,
        emit: &mut dyn FnMut(VoxelPos, i32),
    ) -> Result<(), GenerateError>;
}

/// Presents a [`StatefulTerrain`] as a pure [`ChunkGenerator`].
///
/// Each call checks a terrain out of an idle pool (or clones the template
/// when the pool is empty), reseeds it and generates with it, then returns
/// it. Reseed and generation therefore always see the same instance, and
/// calls on different threads never share one.
pub struct SeededGenerator<T> {
    template: T,
    idle:     Mutex<Vec<T>>,
}

impl<T: StatefulTerrain + Clone> SeededGenerator<T> {
    pub fn new(terrain: T) -> Self {
        Self {
            template: terrain,
            idle:     Mutex::new(Vec::new()),
        }
    }

    fn checkout(&self) -> T {
        // pop under the lock, clone outside it
        let reused = self.idle.lock().pop();
        reused.unwrap_or_else(|| self.template.clone())
    }
}

impl<T: StatefulTerrain + Clone + Sync> ChunkGenerator for SeededGenerator<T> {
    fn generate(&self, seed: Option<i64>, key: ChunkKey) -> Result<ChunkData, GenerateError> {
        let mut terrain = self.checkout();
        terrain.reseed(seed);

        let mut chunk = ChunkData::new(key);
        let result = terrain.create_world(key, &mut |pos: VoxelPos, code: i32| chunk.set(pos, code));
        self.idle.lock().push(terrain);
        result?;

        trace!("[TERRAIN] Generated {} with {} blocks", key, chunk.len());
        Ok(chunk)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Writes the current seed as the block code, to expose stale seeding.
    #[derive(Clone)]
    struct EchoSeed {
        seed: i64,
    }

    impl StatefulTerrain for EchoSeed {
        fn reseed(&mut self, seed: Option<i64>) {
            self.seed = seed.unwrap_or(-1);
        }

        fn create_world(
            &self,
            key: ChunkKey,
            emit: &mut dyn FnMut(VoxelPos, i32),
        ) -> Result<(), GenerateError> {
            if key.p == i32::MAX {
                return Err(GenerateError::failed(key, "edge of the world"));
            }
            emit(VoxelPos::new(key.p, 0, key.q), self.seed as i32);
            Ok(())
        }
    }

    #[test]
    fn test_reseeds_before_every_call() {
        let generator = SeededGenerator::new(EchoSeed { seed: 0 });
        let key = ChunkKey::new(2, 3);
        let pos = VoxelPos::new(2, 0, 3);

        assert_eq!(generator.generate(Some(7), key).unwrap().get(pos), Some(7));
        assert_eq!(generator.generate(Some(9), key).unwrap().get(pos), Some(9));
        // None must not inherit the previous seed
        assert_eq!(generator.generate(None, key).unwrap().get(pos), Some(-1));
    }

    #[test]
    fn test_failure_propagates() {
        let generator = SeededGenerator::new(EchoSeed { seed: 0 });
        let err = generator.generate(Some(1), ChunkKey::new(i32::MAX, 0)).unwrap_err();
        assert_eq!(err.key(), ChunkKey::new(i32::MAX, 0));
    }

    #[test]
    fn test_idle_terrain_is_reused() {
        let generator = SeededGenerator::new(EchoSeed { seed: 0 });
        for p in 0..5 {
            generator.generate(Some(p as i64), ChunkKey::new(p, 0)).unwrap();
        }
        generator.generate(Some(1), ChunkKey::new(i32::MAX, 0)).unwrap_err();
        assert_eq!(generator.idle.lock().len(), 1);
    }

    #[test]
    fn test_closure_generator() {
        let generator = from_fn(|seed, key| {
            let mut chunk = ChunkData::new(key);
            chunk.set(VoxelPos::new(0, 0, 0), seed.unwrap_or_default() as i32);
            Ok(chunk)
        });
        let chunk = generator.generate(Some(5), ChunkKey::new(0, 0)).unwrap();
        assert_eq!(chunk.get(VoxelPos::new(0, 0, 0)), Some(5));
    }
}
