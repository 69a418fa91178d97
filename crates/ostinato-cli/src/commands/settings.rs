//! Settings record commands.
//!
//! Shows, resets and locates the durable settings record.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Subcommand};
use ostinato_config::SettingsRecord;
use ostinato_platform::{Settings, SettingsStorage};

use super::common::settings_file;

/// Inspect or reset the durable settings record.
#[derive(Args)]
pub struct SettingsArgs {
    /// Settings record path (platform default if omitted)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: SettingsCommand,
}

#[derive(Subcommand)]
enum SettingsCommand {
    /// Show the stored settings
    Show {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Overwrite the record with the defaults
    Reset,

    /// Print the record path
    Path,
}

/// Run the settings command.
pub fn run(args: SettingsArgs) -> anyhow::Result<()> {
    match args.command {
        SettingsCommand::Show { json } => show(args.settings, json),
        SettingsCommand::Reset => reset(args.settings),
        SettingsCommand::Path => {
            println!("{}", settings_file(args.settings).path().display());
            Ok(())
        }
    }
}

fn show(path: Option<PathBuf>, json: bool) -> anyhow::Result<()> {
    let mut file = settings_file(path);
    let (settings, stored) = match file.load() {
        Ok(settings) => (settings, true),
        Err(e) if e.is_not_found() => (Settings::DEFAULT, false),
        Err(e) => {
            return Err(e).with_context(|| {
                format!("failed to load settings '{}'", file.path().display())
            });
        }
    };
    let record = SettingsRecord::from(settings);

    if json {
        let value = serde_json::json!({
            "path": file.path().display().to_string(),
            "stored": stored,
            "settings": record,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("Settings: {}", file.path().display());
    if !stored {
        println!("  (not stored yet, showing defaults)");
    }
    println!();
    print!("{}", record.to_toml()?);
    Ok(())
}

fn reset(path: Option<PathBuf>) -> anyhow::Result<()> {
    let mut file = settings_file(path);
    file.reset()
        .with_context(|| format!("failed to reset settings '{}'", file.path().display()))?;
    println!("Reset settings: {}", file.path().display());
    Ok(())
}
