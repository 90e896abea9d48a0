//! Command-line interface for Microledger
//!
//! Creates, appends to, inspects and verifies a file-backed ledger.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod config;

use config::CliConfig;

#[derive(Parser)]
#[command(name = "microledger")]
#[command(about = "Microledger - append-only, hash-chained JSON ledger", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file path
    #[arg(short, long, global = true, default_value = "microledger.toml")]
    config: PathBuf,

    /// Ledger file, overriding the config
    #[arg(short, long, global = true)]
    ledger: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a signing keypair seed
    Keygen {
        /// File to write the hex seed to
        #[arg(short, long)]
        out: PathBuf,
    },

    /// Create the ledger, or check that an existing one opens
    Init,

    /// Append a JSON delta
    Append {
        /// Delta as a JSON object
        delta: String,
    },

    /// Print the node at a sequence number
    Get {
        /// Sequence number (-1 is genesis)
        #[arg(allow_hyphen_values = true)]
        seq: i64,
    },

    /// Print the last node
    Last,

    /// Verify one node, or the whole chain
    Verify {
        /// Sequence number to verify
        #[arg(long, allow_hyphen_values = true)]
        seq: Option<i64>,
    },

    /// Print every node, one JSON document per line
    Dump,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Commands::Keygen { out } = &cli.command {
        return commands::keygen(out).await;
    }

    let mut config = CliConfig::load(&cli.config).await?;
    if let Some(ledger) = cli.ledger {
        config.ledger = ledger;
    }

    match cli.command {
        Commands::Keygen { .. } => Ok(()),
        Commands::Init => commands::init(&config).await,
        Commands::Append { delta } => commands::append(&config, &delta).await,
        Commands::Get { seq } => commands::get(&config, seq).await,
        Commands::Last => commands::last(&config).await,
        Commands::Verify { seq } => commands::verify(&config, seq).await,
        Commands::Dump => commands::dump(&config).await,
    }
}
