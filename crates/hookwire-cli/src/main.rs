#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod commands;
mod config;
mod handlers;
mod server;

use std::process;

use crate::config::{Cli, Command};

// Tracing target constants
pub const TRACING_TARGET_SERVER_STARTUP: &str = "hookwire_cli::server::startup";
pub const TRACING_TARGET_SERVER_SHUTDOWN: &str = "hookwire_cli::server::shutdown";
pub const TRACING_TARGET_CONFIG: &str = "hookwire_cli::config";
pub const TRACING_TARGET_COMMAND: &str = "hookwire_cli::command";

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        tracing::info!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            "application terminated successfully"
        );
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            error = %error,
            "application terminated with error"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

/// Main application entry point.
async fn run() -> anyhow::Result<()> {
    let command = Cli::init().into_command();
    Cli::init_tracing();
    command.log();

    match command {
        Command::Serve(args) => commands::serve(args).await,
        Command::SyncHandlers(args) => commands::sync_handlers(args).await,
        Command::CreateSubscription(args) => commands::create_subscription(args).await,
        Command::AssignHandlers(args) => commands::assign_handlers(args).await,
    }
}
