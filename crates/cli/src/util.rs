use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

/// Installs the global subscriber. `RUST_LOG` takes precedence over `level`.
pub fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    fmt().with_env_filter(filter).with_target(false).init();
}

/// Returns `seed`, or a random seed if it is zero.
pub fn seed_or_random(seed: u64) -> u64 {
    if seed != 0 {
        return seed;
    }
    let seed = loop {
        let candidate: u64 = rand::random();
        if candidate != 0 {
            break candidate;
        }
    };
    info!("No seed provided, using random seed: {seed:#x}");
    seed
}
