//! Run the engine, printing every metric update.
//!
//! Activity is fed from stdin, one command per line: `active`, `idle`,
//! or `factor N`.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::ArgMatches;
use colored::Colorize;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::core::runtime::build_runtime;
use crate::core::sink::SharedSink;
use crate::core::{tools_config, ActivitySignal, Config, ConsoleSink, MonitorEngine};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalCommand {
    Active,
    Idle,
    Factor(u32),
}

/// Parse one stdin line; blank or unknown lines yield `None`.
pub fn parse_signal_command(line: &str) -> Option<SignalCommand> {
    let mut words = line.split_whitespace();
    let command = words.next()?.to_ascii_lowercase();
    match (command.as_str(), words.next()) {
        ("active", None) => Some(SignalCommand::Active),
        ("idle", None) => Some(SignalCommand::Idle),
        ("factor", Some(n)) => n.parse().ok().map(SignalCommand::Factor),
        _ => None,
    }
}

fn apply(signal: &ActivitySignal, command: SignalCommand) -> bool {
    match command {
        SignalCommand::Active => signal.set_active(true),
        SignalCommand::Idle => signal.set_active(false),
        SignalCommand::Factor(n) => signal.set_slow_factor(n),
    }
}

async fn feed_signal(signal: Arc<ActivitySignal>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        if line.trim().is_empty() {
            continue;
        }
        match parse_signal_command(&line) {
            Some(command) => {
                if apply(&signal, command) {
                    log::info!("Activity changed: {:?}", signal.mode());
                }
            }
            None => log::warn!("Unknown activity command: {}", line.trim()),
        }
    }
    log::debug!("Activity input closed, keeping current mode");
}

pub fn execute(matches: &ArgMatches) -> Result<()> {
    let mut config = Config::load()?;
    if let Some(factor) = matches.get_one::<u32>("slow-factor") {
        config.slow_factor = *factor;
    }
    if matches.get_flag("idle") {
        config.start_idle = true;
    }
    let json = matches.get_flag("json");

    config.validate().context("Invalid configuration")?;

    let custom = tools_config::load();
    let sink: SharedSink = Arc::new(ConsoleSink::new(json));
    let engine = MonitorEngine::new(&config, sink, custom).context("Failed to start monitors")?;

    if !json {
        println!("{}", "pulsemon".cyan().bold());
        println!(
            "{}",
            format!(
                "{} tasks, {} mode, slow factor {}",
                engine.task_ids().len(),
                if config.start_idle { "idle" } else { "active" },
                config.slow_factor
            )
            .dimmed()
        );
        println!("{}", "Type 'active', 'idle' or 'factor N'. Ctrl+C to stop.".dimmed());
        println!();
    }

    let shutdown = engine.shutdown_handle();
    ctrlc::set_handler(move || {
        let _ = shutdown.send(());
    })
    .map_err(|e| anyhow::anyhow!("Failed to set Ctrl+C handler: {}", e))?;

    let runtime = build_runtime()?;
    let signal = engine.signal();
    runtime.block_on(async move {
        tokio::spawn(feed_signal(signal));
        engine.run().await;
    });

    // stdin reader may still be blocked on a read
    runtime.shutdown_background();

    if !json {
        println!();
        println!("{}", "Stopped.".yellow());
    }
    Ok(())
}
