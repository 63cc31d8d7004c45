//! User-defined tool launchers loaded from an optional JSON file.
//!
//! The file is either a flat list of entries or an object with a `scripts`
//! list. Each entry needs a `label` and a `command`; `placeholder` is
//! optional. Anything unreadable or malformed yields zero entries.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;

use super::templates::CommandTemplate;

/// Environment variable overriding the config location.
pub const TOOLS_CONFIG_ENV: &str = "PULSEMON_TOOLS_CONFIG";

const TOOLS_CONFIG_FILE: &str = ".pulsemon-tools.json";
const DEFAULT_PROMPT: &str = "Input (optional)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomProbe {
    pub label: String,
    pub command: String,
    pub placeholder: Option<String>,
}

impl CustomProbe {
    pub fn template(&self) -> CommandTemplate {
        CommandTemplate::new(
            self.label.clone(),
            self.placeholder.as_deref().unwrap_or(DEFAULT_PROMPT),
            self.command.clone(),
        )
    }
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    command: Option<String>,
    #[serde(default)]
    placeholder: Option<String>,
}

impl RawEntry {
    fn into_probe(self) -> Option<CustomProbe> {
        let label = self.label.filter(|l| !l.trim().is_empty())?;
        let command = self.command.filter(|c| !c.trim().is_empty())?;
        Some(CustomProbe {
            label,
            command,
            placeholder: self.placeholder.filter(|p| !p.is_empty()),
        })
    }
}

/// Env override, else `~/.pulsemon-tools.json`.
pub fn config_path() -> Option<PathBuf> {
    match env::var_os(TOOLS_CONFIG_ENV) {
        Some(path) if !path.is_empty() => Some(PathBuf::from(path)),
        _ => dirs::home_dir().map(|home| home.join(TOOLS_CONFIG_FILE)),
    }
}

/// Load custom probes from the default location.
pub fn load() -> Vec<CustomProbe> {
    match config_path() {
        Some(path) => load_from(&path),
        None => Vec::new(),
    }
}

pub fn load_from(path: &Path) -> Vec<CustomProbe> {
    if !path.exists() {
        return Vec::new();
    }

    match fs::read_to_string(path) {
        Ok(raw) => parse(&raw),
        Err(e) => {
            log::debug!("Ignoring unreadable tools config {:?}: {}", path, e);
            Vec::new()
        }
    }
}

pub fn parse(raw: &str) -> Vec<CustomProbe> {
    let document: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(e) => {
            log::debug!("Ignoring malformed tools config: {}", e);
            return Vec::new();
        }
    };

    let entries = match document {
        Value::Array(entries) => entries,
        Value::Object(mut map) => match map.remove("scripts") {
            Some(Value::Array(entries)) => entries,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    };

    entries
        .into_iter()
        .filter_map(|entry| serde_json::from_value::<RawEntry>(entry).ok())
        .filter_map(RawEntry::into_probe)
        .collect()
}
