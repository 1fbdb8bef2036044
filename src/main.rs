#![cfg(not(tarpaulin_include))]

use clap::Parser;
use csv_editor::{app, config::Config, logging};

/// Main entry point for the web application
///
/// Parses the command line, installs logging and serves the editor until
/// the process is stopped.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    logging::init(config.log.as_deref(), "info,tower_http=info")?;

    app::run(config).await
}
