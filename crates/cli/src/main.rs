mod commands;
mod harness;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::TestCommand;

/// Clockwise CLI - Approval workflow scenario harness
#[derive(Debug, Parser)]
#[command(
    name = "clockwise",
    version,
    about = "Approval workflow scenario harness"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Execute workflow scenarios
    Test(TestCommand),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let exit_code = match cli.command {
        Commands::Test(cmd) => cmd.execute()?,
    };

    std::process::exit(exit_code);
}
