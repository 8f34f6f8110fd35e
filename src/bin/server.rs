use clap::Parser;
use linekv::cache::Strategy;
use linekv::{Config, Server};
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value_t = 50000)]
    port: u16,

    /// Bind address
    #[arg(short, long, default_value = "127.0.0.1")]
    bind: String,

    /// Maximum number of key-value pairs kept in the in-memory cache
    #[arg(short = 's', long, default_value_t = 1024)]
    cache_size: usize,

    /// Cache replacement strategy (FIFO, LRU, or LFU)
    #[arg(short = 'S', long, default_value = "FIFO")]
    strategy: Strategy,

    /// Root directory for persisted key files
    #[arg(short, long, default_value = "data")]
    data_dir: String,

    /// Config file path (flags above are ignored when set)
    #[arg(short, long)]
    config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing
    let log_level = if args.verbose {
        "debug"
    } else {
        &args.log_level
    };
    tracing_subscriber::fmt()
        .with_env_filter(format!("linekv={}", log_level))
        .init();

    info!(
        "Starting LineKV server v{} on {}:{}",
        env!("CARGO_PKG_VERSION"),
        args.bind,
        args.port
    );

    // Create configuration
    let config = if let Some(config_path) = args.config {
        Config::from_file(&config_path)?
    } else {
        Config {
            bind_addr: args.bind,
            port: args.port,
            cache_size: args.cache_size,
            cache_strategy: args.strategy,
            data_dir: args.data_dir,
            ..Default::default()
        }
    };

    // Create and run server
    let server = Arc::new(Server::new(config)?);

    // Setup signal handler for graceful shutdown
    let server_clone = Arc::clone(&server);
    ctrlc::set_handler(move || {
        info!("Received shutdown signal, shutting down gracefully...");
        server_clone.shutdown();
    })?;

    // Run the server
    if let Err(e) = server.run() {
        error!("Server error: {}", e);
        return Err(e.into());
    }

    info!("Server shutdown complete");
    Ok(())
}
