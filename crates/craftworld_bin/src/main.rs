mod consts;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use craftworld::config::WorldConfig;
use craftworld::{CraftTerrain, SeededGenerator, SharedChunkCache};
use rayon::prelude::*;
use tracing::{info, warn};

use crate::consts::{CONFIG_PATH_ENV, SPAWN_RADIUS, WARMUP_PASSES};

fn load_config() -> Result<WorldConfig> {
    let path = std::env::args_os()
        .nth(1)
        .or_else(|| std::env::var_os(CONFIG_PATH_ENV))
        .map(PathBuf::from);

    let config = match path {
        Some(path) => WorldConfig::load(&path).with_context(|| format!("loading {}", path.display()))?,
        None => {
            info!("[STARTUP] No config file given, using defaults");
            WorldConfig::default()
        }
    };

    Ok(config.with_env_overrides()?)
}

fn main() -> Result<()> {
    // Initialize logging with a custom format
    tracing_subscriber::fmt()
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_line_number(true)
        .with_max_level(tracing::Level::INFO)
        .compact()
        .init();

    let config = load_config()?;
    info!(
        "[STARTUP] World seed {:?}, cache {} chunks, chunk size {}",
        config.seed, config.cache_size, config.terrain.chunk_size
    );

    let generator = SeededGenerator::new(CraftTerrain::new(config.terrain));
    let cache = SharedChunkCache::from_config(&config, generator)?;

    let spawn: Vec<(i32, i32)> = (-SPAWN_RADIUS..SPAWN_RADIUS)
        .flat_map(|p| (-SPAWN_RADIUS..SPAWN_RADIUS).map(move |q| (p, q)))
        .collect();
    if spawn.len() > cache.capacity() {
        warn!(
            "[STARTUP] Spawn area ({} chunks) exceeds cache capacity ({}), later passes will regenerate",
            spawn.len(),
            cache.capacity()
        );
    }

    for pass in 1..=WARMUP_PASSES {
        let start = Instant::now();
        let blocks: usize = spawn
            .par_iter()
            .map(|&(p, q)| {
                let chunk = cache.get(p, q)?;
                Ok::<_, craftworld::GenerateError>(chunk.iter().filter(|&(_, code)| code > 0).count())
            })
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .sum();

        let elapsed = start.elapsed();
        info!(
            "[CHUNK] Pass {}: {} chunks ({} owned blocks) in {:.2}s, {}",
            pass,
            spawn.len(),
            blocks,
            elapsed.as_secs_f64(),
            cache.stats()
        );
    }

    info!("[SHUTDOWN] {} chunks resident", cache.len());
    Ok(())
}
