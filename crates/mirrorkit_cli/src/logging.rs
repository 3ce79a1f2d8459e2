use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt};

/// Console output on stderr; `RUST_LOG` overrides `level`.
pub fn init_logging(level: Level) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_ascii_lowercase()));
    let _ = fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
