//! Logging setup
//!
//! Filtering follows `RUST_LOG` unless an explicit directive is passed,
//! e.g. `RUST_LOG=csv_editor=debug` or `--log tower_http=debug,info`.

use tracing_subscriber::{EnvFilter, fmt};

/// Install the global fmt subscriber
///
/// # Arguments
/// * `directive` - Filter that takes precedence over `RUST_LOG`
/// * `default` - Filter used when neither is set
pub fn init(directive: Option<&str>, default: &str) -> anyhow::Result<()> {
    let filter = match directive {
        Some(directive) => EnvFilter::try_new(directive)?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
    };

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install logger: {}", e))
}
