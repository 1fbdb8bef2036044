use std::path::PathBuf;

use clap::Parser;

/// Default upload limit: 10 MiB
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Server configuration
#[derive(Parser, Debug, Clone)]
#[command(name = "csv-editor", version, about = "Upload, edit and download CSV files in the browser")]
pub struct Config {
    /// Address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(long, short, default_value_t = 3000)]
    pub port: u16,

    /// Serve static assets from this directory instead of the bundled page
    #[arg(long)]
    pub assets_dir: Option<PathBuf>,

    /// Largest accepted upload, in bytes
    #[arg(long, default_value_t = DEFAULT_MAX_UPLOAD_BYTES)]
    pub max_upload_bytes: usize,

    /// Log filter directive (overrides RUST_LOG), e.g. `debug` or `csv_editor=trace`
    #[arg(long)]
    pub log: Option<String>,
}

impl Config {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
