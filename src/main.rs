use anyhow::Result;
use clap::{Arg, ArgAction, Command};

use pulsemon::commands;

fn main() -> Result<()> {
    pulsemon::init_logging();

    let matches = Command::new("pulsemon")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Adaptive system and network telemetry")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("monitor")
                .about("Run all monitors; reads 'active', 'idle' or 'factor N' from stdin")
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Print updates as JSON lines")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("idle")
                        .long("idle")
                        .help("Start in idle (slow) mode")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("slow-factor")
                        .long("slow-factor")
                        .value_name("N")
                        .help("Multiplier for slow intervals while idle")
                        .value_parser(clap::value_parser!(u32)),
                ),
        )
        .subcommand(
            Command::new("tools")
                .about("Check which tools are installed")
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Print results as JSON")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("probe")
                .about("Look up an address once")
                .subcommand_required(true)
                .arg_required_else_help(true)
                .subcommand(Command::new("public-ip").about("Public IPv4 address"))
                .subcommand(Command::new("local-ip").about("Primary LAN address and interface")),
        )
        .subcommand(
            Command::new("launch")
                .about("Print the command line for a tool launcher")
                .arg(
                    Arg::new("list")
                        .short('l')
                        .long("list")
                        .help("List available launchers")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("tool")
                        .help("Launcher name (e.g. nmap)")
                        .required_unless_present("list")
                        .index(1),
                )
                .arg(
                    Arg::new("input")
                        .help("Value substituted for {input}")
                        .num_args(1..)
                        .index(2),
                ),
        )
        .subcommand(
            Command::new("config")
                .about("Manage configuration")
                .subcommand_required(true)
                .arg_required_else_help(true)
                .subcommand(Command::new("show").about("Print the effective config"))
                .subcommand(Command::new("path").about("Print the config file location"))
                .subcommand(
                    Command::new("init").about("Write the default config").arg(
                        Arg::new("force")
                            .long("force")
                            .help("Overwrite an existing file")
                            .action(ArgAction::SetTrue),
                    ),
                ),
        )
        .get_matches();

    match matches.subcommand() {
        Some(("monitor", sub_matches)) => commands::monitor(sub_matches)?,
        Some(("tools", sub_matches)) => commands::tools(sub_matches)?,
        Some(("probe", sub_matches)) => commands::probe(sub_matches)?,
        Some(("launch", sub_matches)) => commands::launch(sub_matches)?,
        Some(("config", sub_matches)) => commands::config(sub_matches)?,
        _ => unreachable!("subcommand is required"),
    }

    Ok(())
}
