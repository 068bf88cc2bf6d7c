//! pacer CLI - Train racing opponents from recorded human races
//!
//! This CLI provides:
//! - Training a SARSA table or a deep Q network from a player's recording
//! - Inspecting a stored policy

use anyhow::Result;
use clap::{Parser, Subcommand};
use log::LevelFilter;

#[derive(Parser)]
#[command(name = "pacer")]
#[command(version, about = "Train racing opponents from recorded human races", long_about = None)]
struct Cli {
    /// Log debug output (repeat for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train an opponent from a player's recording
    Train(Box<pacer::cli::commands::train::TrainArgs>),

    /// Print a stored policy
    Inspect(pacer::cli::commands::inspect::InspectArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    match cli.command {
        Commands::Train(args) => pacer::cli::commands::train::execute(*args).await,
        Commands::Inspect(args) => pacer::cli::commands::inspect::execute(args),
    }
}
