//! idscp-bridge - IDSCP2 connector with a REST ingress
//!
//! This is the main entry point for the idscp-bridge CLI application.

use clap::Parser;
use std::process;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use idscp_bridge::cli::{self, CliArgs, Commands};

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();

    // Initialize logging
    init_logging(args.json_logs);

    // Execute subcommand
    let result = match args.command {
        Commands::Serve(cmd) => cli::commands::serve::execute(cmd).await,
        Commands::List(cmd) => cli::commands::list::execute(cmd).await,
        Commands::Ping(cmd) => cli::commands::ping::execute(cmd).await,
        Commands::Config(cmd) => cli::commands::config::execute(cmd).await,
        Commands::Version => cli::commands::version::execute().await,
    };

    // Error handling
    if let Err(e) = result {
        error!("Command execution failed: {}", e);
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Initialize the logging system
fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("idscp_bridge=info"));

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    info!("{} {} starting up", idscp_bridge::NAME, idscp_bridge::VERSION);
}
