use anyhow::{bail, Result};
use clap::ArgMatches;
use colored::Colorize;

use crate::core::monitors::network::{interface_for, is_offline, local_ip_spec, public_ip_spec};
use crate::core::probe::{or_placeholder, ProbeExecutor, UNAVAILABLE};
use crate::core::runtime::build_runtime;
use crate::core::Config;

/// One-shot address lookup.
pub fn execute(matches: &ArgMatches) -> Result<()> {
    let config = Config::load()?;
    let runtime = build_runtime()?;
    let executor = ProbeExecutor::new();

    match matches.subcommand() {
        Some(("public-ip", _)) => {
            let spec = public_ip_spec(config.public_ip_ttl());
            match runtime.block_on(executor.run(&spec)) {
                Ok(address) => println!("{}", address),
                Err(_) => println!("{}", UNAVAILABLE.red()),
            }
        }
        Some(("local-ip", _)) => {
            let spec = local_ip_spec(config.probe_timeout());
            let address = or_placeholder(runtime.block_on(executor.run(&spec)));
            if is_offline(&address) {
                println!("{} {}", address, "(offline)".yellow());
            } else {
                let iface = interface_for(&address).unwrap_or_else(|| "?".to_string());
                println!("{} {}", address, format!("({})", iface).dimmed());
            }
        }
        _ => bail!("Use 'pulsemon probe --help' for more information."),
    }
    Ok(())
}
