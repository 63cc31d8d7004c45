use anyhow::{Context, Result};
use clap::ArgMatches;
use colored::Colorize;

use crate::core::Config;

pub fn execute(matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("show", _)) => show(),
        Some(("path", _)) => {
            println!("{}", Config::get_config_path()?.display());
            Ok(())
        }
        Some(("init", sub_matches)) => init(sub_matches.get_flag("force")),
        _ => {
            println!("Use 'pulsemon config --help' for more information.");
            Ok(())
        }
    }
}

fn show() -> Result<()> {
    let config = Config::load()?;
    let data = serde_json::to_string_pretty(&config).context("Failed to serialize config")?;
    println!("{}", data);
    Ok(())
}

fn init(force: bool) -> Result<()> {
    let path = Config::get_config_path()?;
    if path.exists() && !force {
        println!(
            "{}",
            format!("Config already exists at {}", path.display()).yellow()
        );
        println!("{}", "Use --force to overwrite it with defaults.".dimmed());
        return Ok(());
    }

    Config::default().save_to(&path)?;
    println!("{} {}", "Wrote default config to".green(), path.display());
    Ok(())
}
