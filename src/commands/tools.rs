use std::collections::BTreeMap;

use anyhow::{Context, Result};
use clap::ArgMatches;
use colored::Colorize;

use crate::core::monitors::tools::{availability_specs, status};
use crate::core::probe::{ConcurrentProbeBatch, ProbeExecutor};
use crate::core::runtime::build_runtime;
use crate::core::{tools_config, Config};

/// Probe every configured tool once and print the result.
pub fn execute(matches: &ArgMatches) -> Result<()> {
    let config = Config::load()?;
    let custom = tools_config::load();
    let json = matches.get_flag("json");

    let runtime = build_runtime()?;
    let results: BTreeMap<String, bool> = runtime.block_on(async {
        let batch = ConcurrentProbeBatch::new(ProbeExecutor::new());
        batch.run_all(availability_specs(&config, &custom)).await
    });

    if json {
        let out: BTreeMap<&str, &str> = results.iter().map(|(k, v)| (k.as_str(), status(*v))).collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&out).context("Failed to serialize results")?
        );
        return Ok(());
    }

    let width = results.keys().map(|k| k.len()).max().unwrap_or(0);
    for (label, available) in &results {
        let state = if *available {
            status(true).green()
        } else {
            status(false).red()
        };
        println!("  {:<width$}  {}", label, state, width = width);
    }

    let found = results.values().filter(|v| **v).count();
    println!();
    println!("{}", format!("{}/{} available", found, results.len()).dimmed());
    Ok(())
}
