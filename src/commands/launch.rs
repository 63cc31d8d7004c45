use anyhow::{anyhow, bail, Result};
use clap::ArgMatches;
use colored::Colorize;

use crate::core::templates::{builtin_templates, find_template, CommandTemplate};
use crate::core::tools_config;

/// Built-in launchers followed by custom ones.
pub fn all_templates() -> Vec<CommandTemplate> {
    let mut templates = builtin_templates();
    templates.extend(tools_config::load().iter().map(|c| c.template()));
    templates
}

/// Print the command a launcher would run. Nothing is executed.
pub fn execute(matches: &ArgMatches) -> Result<()> {
    let templates = all_templates();

    if matches.get_flag("list") {
        for template in &templates {
            println!("  {:<12} {}", template.label.cyan(), template.template().dimmed());
        }
        return Ok(());
    }

    let tool = matches
        .get_one::<String>("tool")
        .ok_or_else(|| anyhow!("Tool name is required"))?;
    let input = matches
        .get_many::<String>("input")
        .map(|values| values.cloned().collect::<Vec<_>>().join(" "))
        .unwrap_or_default();

    let template = match find_template(&templates, tool) {
        Some(template) => template,
        None => {
            let known: Vec<&str> = templates.iter().map(|t| t.label.as_str()).collect();
            bail!("Unknown tool '{}'. Known tools: {}", tool, known.join(", "));
        }
    };

    match template.build(&input) {
        Some(command) => println!("{}", command),
        None => bail!("{} is required for '{}'", template.prompt, template.label),
    }
    Ok(())
}
