use std::path::PathBuf;

use clap::Parser;
use frameserver::{config, server};

#[cfg(all(feature = "jemalloc", not(target_env = "msvc")))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

/// Frameserver - named tabular frames over HTTP
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// HTTP server host address
    #[arg(long, default_value = "0.0.0.0")]
    http_host: String,

    /// HTTP server port
    #[arg(long, default_value_t = 9099)]
    http_port: u16,

    /// Directory that relative CSV paths are resolved against
    #[arg(long)]
    datasets_dir: Option<PathBuf>,

    /// Maximum number of rows returned by one take request
    #[arg(long, default_value_t = 1000)]
    max_take_rows: usize,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 30)]
    request_timeout_secs: u64,

    /// Load configuration from a YAML file instead of the flags above
    #[arg(long)]
    config: Option<PathBuf>,

    /// Read configuration from FRAMESERVER_* environment variables (and .env)
    #[arg(long, conflicts_with = "config")]
    from_env: bool,

    /// Run server in daemon mode (stop on SIGINT/SIGTERM)
    #[arg(long)]
    daemon: bool,
}

impl From<Cli> for config::CliConfig {
    fn from(cli: Cli) -> Self {
        config::CliConfig {
            http_host: cli.http_host,
            http_port: cli.http_port,
            datasets_dir: cli.datasets_dir,
            max_take_rows: cli.max_take_rows,
            request_timeout_secs: cli.request_timeout_secs,
            daemon: cli.daemon,
        }
    }
}

#[tokio::main]
async fn main() {
    // Initialize logger - defaults to INFO level, can be overridden with RUST_LOG env var
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    println!("\nFrameserver v{}\n", env!("CARGO_PKG_VERSION"));

    let config = if let Some(path) = cli.config.clone() {
        config::ServerConfig::from_yaml_file(path)
    } else if cli.from_env {
        dotenvy::dotenv().ok();
        config::ServerConfig::from_env()
    } else {
        config::ServerConfig::from_cli(cli.into())
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server::run_with_config(config).await {
        log::error!("HTTP server fatal error: {:?}", e);
        std::process::exit(1);
    }
}
