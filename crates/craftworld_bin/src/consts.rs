/// Half-width, in chunks, of the square around the origin warmed up on startup.
pub const SPAWN_RADIUS: i32 = 4;

/// Number of passes over the spawn area; every pass after the first should hit.
pub const WARMUP_PASSES: usize = 2;

pub const CONFIG_PATH_ENV: &str = "CRAFTWORLD_CONFIG";
