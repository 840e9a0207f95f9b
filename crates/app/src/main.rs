//! Aula - academic portal client
//!
//! Command-line client for the portal's topics, proposals, meetings and
//! notifications. Each subcommand drives one view model.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod cli;
mod commands;
mod config;
mod error;
mod scope;
mod session;
mod state;
mod store;
#[cfg(test)]
mod testing;
mod viewmodel;

fn main() {
    let cli = cli::Cli::parse();

    let config = match config::Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e.user_message());
            std::process::exit(1);
        }
    };

    // Logs go to stderr; stdout carries command output
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    tracing::info!("Starting Aula");

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!("Failed to create tokio runtime: {}", e);
            std::process::exit(1);
        }
    };

    let app_state = match state::AppState::new(&config) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("Failed to initialize application: {}", e);
            eprintln!("{}", e.user_message());
            std::process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(commands::run(cli.command, app_state)) {
        tracing::debug!(class = ?e.class(), error = %e, "Command failed");
        eprintln!("{}", e.user_message());
        std::process::exit(1);
    }
}
