//! CLI configuration management.
//!
//! This module defines the complete CLI configuration hierarchy:
//!
//! ```text
//! Cli
//! └── command: Command
//!     ├── serve                  # default when no subcommand is given
//!     │   ├── server: ServerConfig          # Host, port, shutdown
//!     │   ├── middleware: MiddlewareConfig  # Body limit, request timeout
//!     │   └── service: ServiceConfig        # Postgres, NATS, dispatch
//!     ├── sync-handlers          # database: PgConfig
//!     ├── create-subscription    # database: PgConfig + subscription fields
//!     └── assign-handlers        # database: PgConfig + handler names
//! ```
//!
//! All configuration can be provided via CLI arguments or environment variables.
//! Use `--help` to see all available options.
//!
//! # Example
//!
//! ```bash
//! # Configure database, queue and server
//! hookwire serve --postgres-url "postgresql://..." --nats-url "nats://..." --nats-token "..." --port 8080
//!
//! # Or via environment variables
//! POSTGRES_URL="postgresql://..." NATS_URL="nats://..." NATS_TOKEN="..." PORT=8080 hookwire
//! ```

mod middleware;
mod server;

use std::ffi::OsString;
use std::{env, process};

use anyhow::Context;
use clap::{Args, FromArgMatches, Parser, Subcommand};
use hookwire_postgres::PgConfig;
use hookwire_server::service::ServiceConfig;
pub use middleware::MiddlewareConfig;
pub use server::ServerConfig;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::{TRACING_TARGET_CONFIG, TRACING_TARGET_SERVER_STARTUP};

/// Program name used when the invocation carries none.
const PROGRAM_NAME: &str = "hookwire";

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "hookwire")]
#[command(about = "Webhook admission and dispatch engine")]
#[command(version)]
pub struct Cli {
    /// Command to run; `serve` when omitted.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Commands understood by the binary.
#[derive(Debug, Clone, Subcommand)]
#[allow(clippy::large_enum_variant)]
pub enum Command {
    /// Serve webhooks and run the dispatch worker.
    Serve(ServeArgs),
    /// Mirror the registered handlers into the persisted catalog.
    SyncHandlers(DatabaseArgs),
    /// Create a webhook subscription.
    CreateSubscription(CreateSubscriptionArgs),
    /// Replace the handlers assigned to a subscription.
    AssignHandlers(AssignHandlersArgs),
}

/// Configuration of the `serve` command.
#[derive(Debug, Clone, Args)]
pub struct ServeArgs {
    /// Server network and lifecycle configuration.
    #[clap(flatten)]
    pub server: ServerConfig,

    /// HTTP middleware configuration (body limit, timeouts).
    #[clap(flatten)]
    pub middleware: MiddlewareConfig,

    /// External service configuration (database, message queue, dispatch).
    #[clap(flatten)]
    pub service: ServiceConfig,
}

impl ServeArgs {
    /// Validates all configuration values.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.server
            .validate()
            .context("invalid server configuration")?;
        self.service
            .validate()
            .context("invalid service configuration")?;
        Ok(())
    }
}

/// Database access for the operator commands.
#[derive(Debug, Clone, Args)]
pub struct DatabaseArgs {
    /// Postgres connection and pool settings.
    #[clap(flatten)]
    pub postgres: PgConfig,
}

/// Configuration of the `create-subscription` command.
#[derive(Debug, Clone, Args)]
pub struct CreateSubscriptionArgs {
    #[clap(flatten)]
    pub database: DatabaseArgs,

    /// Unique subscription name, used in the delivery URL.
    #[arg(long)]
    pub name: String,

    /// Identifier of the upstream resource.
    #[arg(long)]
    pub resource_id: String,

    /// Kind of the upstream resource.
    #[arg(long)]
    pub resource_type: String,
}

/// Configuration of the `assign-handlers` command.
#[derive(Debug, Clone, Args)]
pub struct AssignHandlersArgs {
    #[clap(flatten)]
    pub database: DatabaseArgs,

    /// Name of the subscription to update.
    #[arg(long)]
    pub name: String,

    /// Handler name to assign; repeat for several. Omit to clear the set.
    #[arg(long = "handler")]
    pub handlers: Vec<String>,
}

impl Cli {
    /// Loads environment variables from .env file (if enabled) and parses CLI arguments.
    ///
    /// The .env file is loaded before clap parses arguments, so its variables
    /// act as defaults for every `env` fallback.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    /// Returns the selected command, parsing `serve` arguments from the
    /// environment when no subcommand was given.
    pub fn into_command(self) -> Command {
        match self.command {
            Some(command) => command,
            None => Command::Serve(Self::default_serve_args()),
        }
    }

    fn default_serve_args() -> ServeArgs {
        let program = env::args_os()
            .next()
            .unwrap_or_else(|| OsString::from(PROGRAM_NAME));

        let matches = ServeArgs::augment_args(clap::Command::new(PROGRAM_NAME))
            .get_matches_from([program]);

        ServeArgs::from_arg_matches(&matches).unwrap_or_else(|err| err.exit())
    }

    /// Loads environment variables from .env file if the dotenv feature is enabled.
    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    /// No-op when dotenv feature is disabled.
    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Initializes tracing with environment-based filtering.
    pub fn init_tracing() {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    /// Returns a list of enabled compile-time features.
    fn enabled_features() -> Vec<&'static str> {
        [cfg!(feature = "dotenv").then_some("dotenv")]
            .into_iter()
            .flatten()
            .collect()
    }
}

impl Command {
    /// Returns the subcommand name as typed on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Serve(_) => "serve",
            Self::SyncHandlers(_) => "sync-handlers",
            Self::CreateSubscription(_) => "create-subscription",
            Self::AssignHandlers(_) => "assign-handlers",
        }
    }

    /// Logs build information and configuration (no sensitive information).
    pub fn log(&self) {
        tracing::debug!(
            target: TRACING_TARGET_SERVER_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            command = self.name(),
            pid = process::id(),
            arch = env::consts::ARCH,
            os = env::consts::OS,
            features = ?Cli::enabled_features(),
            "Build information"
        );

        match self {
            Self::Serve(args) => {
                args.server.log();
                args.middleware.log();
                log_database_config(&args.service.postgres);

                let dispatch = &args.service.dispatch;
                tracing::info!(
                    target: TRACING_TARGET_CONFIG,
                    max_retries = dispatch.max_retries,
                    retry_delay_secs = dispatch.retry_delay_secs,
                    ack_wait_secs = dispatch.ack_wait_secs,
                    max_deliver = dispatch.max_deliver,
                    handler_timeout_secs = ?dispatch.handler_timeout_secs,
                    "Dispatch configuration"
                );
            }
            Self::SyncHandlers(args) => log_database_config(&args.postgres),
            Self::CreateSubscription(args) => log_database_config(&args.database.postgres),
            Self::AssignHandlers(args) => log_database_config(&args.database.postgres),
        }
    }
}

fn log_database_config(config: &PgConfig) {
    tracing::info!(
        target: TRACING_TARGET_CONFIG,
        database = %config.database_url_masked(),
        postgres_max_connections = config.postgres_max_connections,
        "Database configuration"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_create_subscription() -> anyhow::Result<()> {
        let cli = Cli::try_parse_from([
            "hookwire",
            "create-subscription",
            "--postgres-url",
            "postgresql://localhost/hookwire",
            "--name",
            "github-events",
            "--resource-id",
            "42",
            "--resource-type",
            "repository",
        ])?;

        let Command::CreateSubscription(args) = cli.into_command() else {
            anyhow::bail!("expected create-subscription");
        };
        assert_eq!(args.name, "github-events");
        assert_eq!(args.resource_id, "42");
        assert_eq!(args.resource_type, "repository");
        Ok(())
    }

    #[test]
    fn parses_repeated_handlers() -> anyhow::Result<()> {
        let cli = Cli::try_parse_from([
            "hookwire",
            "assign-handlers",
            "--postgres-url",
            "postgresql://localhost/hookwire",
            "--name",
            "github-events",
            "--handler",
            "log-events",
            "--handler",
            "noop",
        ])?;

        let Command::AssignHandlers(args) = cli.into_command() else {
            anyhow::bail!("expected assign-handlers");
        };
        assert_eq!(args.handlers, vec!["log-events", "noop"]);
        Ok(())
    }

    #[test]
    fn parses_serve_flags() -> anyhow::Result<()> {
        let cli = Cli::try_parse_from([
            "hookwire",
            "serve",
            "--postgres-url",
            "postgresql://localhost/hookwire",
            "--nats-url",
            "nats://127.0.0.1:4222",
            "--nats-token",
            "local-token",
            "--port",
            "8080",
        ])?;

        let command = cli.into_command();
        assert_eq!(command.name(), "serve");
        let Command::Serve(args) = command else {
            anyhow::bail!("expected serve");
        };
        assert_eq!(args.server.port, 8080);
        assert_eq!(args.service.nats.nats_url, "nats://127.0.0.1:4222");
        Ok(())
    }
}
