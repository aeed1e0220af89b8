//! ChainBind CLI: inspect the bundled contract bindings and run the sample
//! workflow's read paths against JSON-RPC endpoints.
//!
//! # Commands
//! ```text
//! chainbind selectors    [--contract <name>] [--json]
//! chainbind total-supply --config <path>
//! chainbind por          --config <path>
//! chainbind last-message --config <path> --emitter <addr> [--block <n>]
//! chainbind logs         --config <path> [--from-block <n>] [--to-block <n>]
//! ```

use anyhow::Result;
use chainbind_workflow::{init_tracing, LogConfig};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

mod cmd_read;
mod cmd_selectors;
mod config;
mod fetch;
mod rpc;

use config::CliConfig;

#[derive(Parser)]
#[command(
    name = "chainbind",
    about = "Typed contract bindings and proof-of-reserve reads (ChainBind CLI)",
    version
)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print method selectors and event topics of the bundled bindings
    Selectors {
        /// Only this contract (BalanceReader, IERC20, MessageEmitter, ReserveManager)
        #[arg(long)]
        contract: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Sum token supply across every configured chain at the finalized block
    #[command(name = "total-supply")]
    TotalSupply {
        /// Path to the CLI config JSON
        #[arg(short, long)]
        config: PathBuf,
    },

    /// Fetch the reserve feed and compute the reserve update without writing it
    Por {
        #[arg(short, long)]
        config: PathBuf,
    },

    /// Read getLastMessage(emitter) from the primary chain's MessageEmitter
    #[command(name = "last-message")]
    LastMessage {
        #[arg(short, long)]
        config: PathBuf,
        /// Emitter address (0x-prefixed)
        #[arg(long)]
        emitter: String,
        /// Block number (default: finalized)
        #[arg(long)]
        block: Option<u64>,
    },

    /// List and decode MessageEmitted logs on the primary chain
    Logs {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        from_block: Option<u64>,
        #[arg(long)]
        to_block: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let verbose = cli.verbose;

    match cli.command {
        Commands::Selectors { contract, json } => {
            init_logging(LogConfig::default(), verbose);
            cmd_selectors::run(contract.as_deref(), json)
        }
        Commands::TotalSupply { config } => {
            cmd_read::total_supply(&load_config(&config, verbose)?).await
        }
        Commands::Por { config } => cmd_read::por(&load_config(&config, verbose)?).await,
        Commands::LastMessage {
            config,
            emitter,
            block,
        } => cmd_read::last_message(&load_config(&config, verbose)?, &emitter, block).await,
        Commands::Logs {
            config,
            from_block,
            to_block,
        } => cmd_read::logs(&load_config(&config, verbose)?, from_block, to_block).await,
    }
}

fn load_config(path: &Path, verbose: bool) -> Result<CliConfig> {
    let config = CliConfig::load(path)?;
    init_logging(config.log.clone(), verbose);
    Ok(config)
}

fn init_logging(mut log: LogConfig, verbose: bool) {
    if verbose {
        log.level = "debug".into();
    }
    if let Err(e) = init_tracing(&log) {
        eprintln!("warning: tracing not initialised: {e}");
    }
}
