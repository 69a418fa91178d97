//! Ostinato CLI - replay control sessions and manage looper settings.

mod commands;
mod script;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ostinato")]
#[command(author, version, about = "Ostinato looper control plane", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a session script against a simulated engine
    Simulate(commands::simulate::SimulateArgs),

    /// Inspect or reset the stored settings
    Settings(commands::settings::SettingsArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Simulate(args) => commands::simulate::run(args),
        Commands::Settings(args) => commands::settings::run(args),
    }
}
