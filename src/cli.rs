//! CLI argument parsing.

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "genrelay", version, about = "Key-injecting relay for generative image and script requests")]
pub struct Cli {
    /// Path to config file (optional; defaults are used when missing)
    #[arg(short, long, default_value = "config.yaml", env = "GENRELAY_CONFIG")]
    pub config: String,

    /// Listen host
    #[arg(long, env = "GENRELAY_HOST")]
    pub host: Option<String>,

    /// Listen port
    #[arg(long, env = "GENRELAY_PORT")]
    pub port: Option<u16>,

    /// Log level
    #[arg(long, default_value = "info", env = "GENRELAY_LOG_LEVEL")]
    pub log_level: String,

    /// Seconds to wait for in-flight requests on shutdown
    #[arg(long, default_value = "10")]
    pub shutdown_timeout: u64,
}
