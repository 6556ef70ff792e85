use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use pm_mindmap::{
    cli::{execute_command, Cli, Commands},
    config::{parse_depth_limit, Config, LogFormat},
    server::{AppState, RpcServer},
    storage::{load_seed, DataStore},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };
    if let Some(seed) = cli.seed {
        config.seed.path = seed;
    }
    if let Some(raw) = cli.depth_limit.as_deref() {
        match parse_depth_limit(raw) {
            Ok(limit) => config.hierarchy.depth_limit = limit,
            Err(e) => {
                eprintln!("{}", e);
                std::process::exit(1);
            }
        }
    }

    // Initialize logging
    init_logging(&config);

    info!(version = env!("CARGO_PKG_VERSION"), "pm-mindmap starting...");

    // Load seed data
    let store = match load_seed(&config.seed.path) {
        Ok(Some(snapshot)) => {
            info!(
                path = %config.seed.path.display(),
                stories = snapshot.stories.len(),
                "seed.loaded"
            );
            DataStore::with_snapshot(snapshot)
        }
        Ok(None) => DataStore::new(),
        Err(e) => {
            error!(error = %e, "Failed to load seed data");
            return Err(e.into());
        }
    };

    let state = Arc::new(AppState::new(config, Arc::new(store)));

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            let server = RpcServer::new(state);
            info!("Server ready, waiting for requests on stdin...");

            if let Err(e) = server.run().await {
                error!(error = %e, "Server error");
                return Err(e.into());
            }

            info!("Server shutdown complete");
            Ok(())
        }
        command => {
            let result = execute_command(command, &state);
            if result.exit_code == 0 {
                println!("{}", result.message);
            } else {
                eprintln!("{}", result.message);
            }
            std::process::exit(result.exit_code);
        }
    }
}

/// Initialize tracing/logging
fn init_logging(config: &Config) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}
