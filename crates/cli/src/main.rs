//! Developer tools for the combat engine.
//!
//! Run with: `cargo run -p combat-cli -- <command>`

mod commands;
mod dirs;
mod logging;

use anyhow::Result;
use clap::Parser;
use commands::{Inspect, Simulate, Validate};

/// Developer tools for the combat engine
#[derive(Parser)]
#[command(name = "combat-cli")]
#[command(about = "Validate content, run scripted fights and inspect snapshots", long_about = None)]
#[command(version)]
struct Cli {
    /// Mirror log output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Load and validate an ability catalog
    Validate(Validate),

    /// Run a scripted fight and print the combat log
    Simulate(Simulate),

    /// Print the active effects held in a persisted snapshot
    Inspect(Inspect),
}

fn main() -> Result<()> {
    // Load .env file if it exists (for COMBAT_DATA_DIR, RUST_LOG)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let _guard = logging::init(cli.verbose)?;

    match cli.command {
        Command::Validate(cmd) => cmd.execute(),
        Command::Simulate(cmd) => cmd.execute(),
        Command::Inspect(cmd) => cmd.execute(),
    }
}
