use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Level used when `-v` isn't given and `RUST_LOG` is unset.
const DEFAULT_LEVEL: &str = "info";

/// Install the global subscriber.
///
/// `-v`/`-vv` take precedence over `RUST_LOG`.
pub fn init(verbosity: u8) {
    let filter = match verbosity_level(verbosity) {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL)),
    };
    tracing_subscriber::registry().with(fmt::layer().with_target(false).without_time()).with(filter).init();
}

fn verbosity_level(verbosity: u8) -> Option<&'static str> {
    match verbosity {
        0 => None,
        1 => Some("debug"),
        _ => Some("trace"),
    }
}
