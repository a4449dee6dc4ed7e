mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "dqa")]
#[command(version, about = "Data Quality Auditor CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a tolerance spec and list the metric specs it implies
    Check {
        /// Path to the tolerance spec file (YAML or TOML)
        tolerances: String,

        /// Path to the table metadata file (YAML or TOML)
        #[arg(short, long)]
        metadata: Option<String>,

        /// Output format: text, json
        #[arg(short, long, default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },

    /// Profile and audit a table from a fixture of measured counts
    Audit {
        /// Path to the audit fixture file (YAML or TOML)
        fixture: String,

        /// Output format: text, json
        #[arg(short, long, default_value = "text", value_parser = ["text", "json"])]
        format: String,

        /// Only audit the measurements of this group value
        #[arg(short, long)]
        group: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over --verbose
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .with(filter)
        .init();

    match cli.command {
        Commands::Check {
            tolerances,
            metadata,
            format,
        } => commands::check::execute(&tolerances, metadata.as_deref(), &format).await,

        Commands::Audit {
            fixture,
            format,
            group,
        } => commands::audit::execute(&fixture, &format, group.as_deref()).await,
    }
}
