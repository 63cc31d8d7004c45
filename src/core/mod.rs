// Core engine modules

pub mod aggregate;
pub mod cache;
pub mod config;
pub mod monitors;
pub mod probe;
pub mod runtime;
pub mod scheduler;
pub mod sink;
pub mod templates;
pub mod tools_config;

// Re-export commonly used items
pub use config::Config;
pub use runtime::MonitorEngine;
pub use scheduler::{ActivitySignal, PerfMode, PerfModeController, PollingTask};
pub use sink::{ConsoleSink, MemorySink, MetricSink, SharedSink};
