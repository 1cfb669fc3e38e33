//! RendezKV Binary
//!
//! Runs either the TCP server or the interactive client.

use std::process;

use clap::Parser;
use rendezkv::config::DEFAULT_ADDRESS;
use rendezkv::{client, Config, Engine, Mode, Server};
use tracing_subscriber::{fmt, EnvFilter};

/// RendezKV
#[derive(Parser, Debug)]
#[command(name = "rendezkv")]
#[command(about = "In-memory key-value store over a line-based TCP protocol")]
#[command(version)]
struct Args {
    /// Either 'server' or 'client'
    #[arg(long, default_value = "")]
    mode: String,

    /// Host and port to listen on (server mode) or to connect to (client mode)
    #[arg(long, default_value = DEFAULT_ADDRESS)]
    address: String,

    /// Maximum concurrent connections, 0 for unbounded (server mode)
    #[arg(long, default_value = "0")]
    max_connections: usize,
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,rendezkv=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    let mode: Mode = match args.mode.parse() {
        Ok(mode) => mode,
        Err(e) => {
            // Not an error exit: the process simply has nothing to do
            tracing::error!("{}", e);
            return;
        }
    };

    let config = Config::builder()
        .mode(mode)
        .address(&args.address)
        .max_connections(args.max_connections)
        .build();

    let result = match config.mode {
        Mode::Server => run_server(&config),
        Mode::Client => client::run_interactive(&config),
    };

    if let Err(e) = result {
        tracing::error!("{} failed: {}", config.mode, e);
        process::exit(1);
    }
}

fn run_server(config: &Config) -> rendezkv::Result<()> {
    tracing::info!("RendezKV v{}", rendezkv::VERSION);

    let (engine, guard) = Engine::start(config)?;

    let result = Server::bind(config, engine).and_then(Server::run);

    // The listener is gone; stop the engine before reporting
    match guard.shutdown() {
        Ok(stats) => tracing::info!(?stats, "storage engine stopped"),
        Err(e) => tracing::warn!("storage engine did not stop cleanly: {}", e),
    }

    result
}
