//! Concrete polling tasks that feed the metric sink.
//!
//! Each submodule builds its `PollingTask`s from a shared [`MonitorContext`];
//! the engine registers them all with one controller.

pub mod cpu;
pub mod network;
pub mod tools;

use std::sync::Arc;

use crate::core::config::Config;
use crate::core::probe::ProbeExecutor;
use crate::core::scheduler::{Cadence, PollingTask};
use crate::core::sink::{guarded_write, SharedSink};
use crate::core::tools_config::CustomProbe;

/// Everything a monitor task needs, cheap to clone into handlers.
#[derive(Clone)]
pub struct MonitorContext {
    pub executor: ProbeExecutor,
    pub sink: SharedSink,
    pub cadence: Cadence,
    pub config: Arc<Config>,
    pub custom: Arc<Vec<CustomProbe>>,
}

impl MonitorContext {
    pub fn new(config: Config, sink: SharedSink, custom: Vec<CustomProbe>) -> Self {
        Self {
            executor: ProbeExecutor::new(),
            sink,
            cadence: config.cadence(),
            config: Arc::new(config),
            custom: Arc::new(custom),
        }
    }

    pub fn with_executor(mut self, executor: ProbeExecutor) -> Self {
        self.executor = executor;
        self
    }

    /// Guarded sink write; a vanished target is not an error.
    pub fn write(&self, key: &str, value: &str) -> bool {
        guarded_write(self.sink.as_ref(), key, value)
    }
}

/// The full monitor set backed by the live system.
pub fn default_tasks(ctx: &MonitorContext) -> Vec<PollingTask> {
    let mut tasks = cpu::tasks(ctx, cpu::SysinfoSource::new());
    tasks.extend(network::tasks(ctx));
    tasks.extend(tools::tasks(ctx));
    tasks
}
