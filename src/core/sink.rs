//! Destinations for computed metric values.
//!
//! Every write from a polling task goes through [`guarded_write`], so a sink
//! whose target disappeared (display torn down, pipe closed) degrades to a
//! silent no-op instead of taking the task down.

use std::collections::HashMap;
use std::io::{self, Write};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SinkError {
    #[error("sink target not found: {0}")]
    NotFound(String),

    #[error("sink closed: {0}")]
    Closed(String),
}

/// Receives `(key, value)` pairs identified by a stable key such as `cpu.avg.0`.
pub trait MetricSink: Send + Sync {
    fn write(&self, key: &str, value: &str) -> Result<(), SinkError>;
}

pub type SharedSink = Arc<dyn MetricSink>;

/// Write to `sink`, swallowing failures. Returns whether the write landed.
pub fn guarded_write(sink: &dyn MetricSink, key: &str, value: &str) -> bool {
    match sink.write(key, value) {
        Ok(()) => true,
        Err(SinkError::NotFound(_)) => {
            log::trace!("Sink target {} missing, value dropped", key);
            false
        }
        Err(e) => {
            log::debug!("Sink write for {} failed: {}", key, e);
            false
        }
    }
}

/// In-memory sink, mostly for embedding and tests.
///
/// In strict mode only registered keys accept writes; anything else is
/// reported as [`SinkError::NotFound`], like a display element that is gone.
#[derive(Debug, Default)]
pub struct MemorySink {
    strict: bool,
    values: Mutex<HashMap<String, Option<String>>>,
}

impl MemorySink {
    /// Accepts writes to any key.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts writes only to `keys` (and keys registered later).
    pub fn with_targets<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values = keys.into_iter().map(|k| (k.into(), None)).collect();
        Self {
            strict: true,
            values: Mutex::new(values),
        }
    }

    pub fn register(&self, key: &str) {
        self.values.lock().entry(key.to_string()).or_insert(None);
    }

    /// Drop a target; later writes to it report `NotFound` in strict mode.
    pub fn remove(&self, key: &str) {
        self.values.lock().remove(key);
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.values.lock().get(key).cloned().flatten()
    }

    pub fn snapshot(&self) -> HashMap<String, String> {
        self.values
            .lock()
            .iter()
            .filter_map(|(k, v)| v.clone().map(|v| (k.clone(), v)))
            .collect()
    }
}

impl MetricSink for MemorySink {
    fn write(&self, key: &str, value: &str) -> Result<(), SinkError> {
        let mut values = self.values.lock();
        match values.get_mut(key) {
            Some(slot) => *slot = Some(value.to_string()),
            None if self.strict => return Err(SinkError::NotFound(key.to_string())),
            None => {
                values.insert(key.to_string(), Some(value.to_string()));
            }
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct JsonLine<'a> {
    timestamp: String,
    key: &'a str,
    value: &'a str,
}

/// Prints every update to stdout, either as `key: value` or JSON lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleSink {
    json: bool,
}

impl ConsoleSink {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    fn render(&self, key: &str, value: &str) -> String {
        if self.json {
            let line = JsonLine {
                timestamp: chrono::Local::now().to_rfc3339(),
                key,
                value,
            };
            serde_json::to_string(&line).unwrap_or_else(|_| format!("{}: {}", key, value))
        } else {
            format!("{}: {}", key, value)
        }
    }
}

impl MetricSink for ConsoleSink {
    fn write(&self, key: &str, value: &str) -> Result<(), SinkError> {
        let line = self.render(key, value);
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{}", line).map_err(|e| SinkError::Closed(e.to_string()))?;
        stdout.flush().map_err(|e| SinkError::Closed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenSink;

    impl MetricSink for BrokenSink {
        fn write(&self, _key: &str, _value: &str) -> Result<(), SinkError> {
            Err(SinkError::Closed("broken pipe".into()))
        }
    }

    #[test]
    fn test_open_memory_sink_accepts_any_key() {
        let sink = MemorySink::new();
        assert!(guarded_write(&sink, "cpu.avg.0", "Avg. 12%"));
        assert_eq!(sink.get("cpu.avg.0").as_deref(), Some("Avg. 12%"));
    }

    #[test]
    fn test_missing_target_is_silent_noop() {
        let sink = MemorySink::with_targets(["net.local"]);
        assert!(guarded_write(&sink, "net.local", "10.0.0.2"));
        assert!(!guarded_write(&sink, "net.public", "1.2.3.4"));
        assert_eq!(sink.get("net.public"), None);
    }

    #[test]
    fn test_removed_target_degrades_to_noop() {
        let sink = MemorySink::with_targets(["cpu.temp"]);
        assert!(guarded_write(&sink, "cpu.temp", "51°C"));
        sink.remove("cpu.temp");
        assert_eq!(
            sink.write("cpu.temp", "52°C"),
            Err(SinkError::NotFound("cpu.temp".into()))
        );
        assert!(!guarded_write(&sink, "cpu.temp", "52°C"));
    }

    #[test]
    fn test_other_sink_errors_are_swallowed() {
        assert!(!guarded_write(&BrokenSink, "k", "v"));
    }

    #[test]
    fn test_registered_but_unwritten_key_reads_none() {
        let sink = MemorySink::with_targets(Vec::<String>::new());
        sink.register("tool.nmap");
        assert_eq!(sink.get("tool.nmap"), None);
        assert!(guarded_write(&sink, "tool.nmap", "available"));
        assert_eq!(sink.snapshot().len(), 1);
    }

    #[test]
    fn test_console_sink_rendering() {
        assert_eq!(ConsoleSink::new(false).render("net.public", "--"), "net.public: --");

        let json = ConsoleSink::new(true).render("net.public", "--");
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["key"], "net.public");
        assert_eq!(parsed["value"], "--");
        assert!(parsed["timestamp"].is_string());
    }
}
