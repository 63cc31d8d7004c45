//! Engine wiring: one controller, one activity signal, all monitors.

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::core::config::Config;
use crate::core::monitors::{default_tasks, MonitorContext};
use crate::core::scheduler::{ActivitySignal, PerfModeController, PollingTask};
use crate::core::sink::SharedSink;
use crate::core::tools_config::CustomProbe;
use crate::error::{PulseError, Result};

/// Owns the scheduler and the activity signal feeding it.
pub struct MonitorEngine {
    signal: Arc<ActivitySignal>,
    controller: PerfModeController,
    shutdown_tx: broadcast::Sender<()>,
}

impl MonitorEngine {
    /// Engine running the full monitor set against `sink`.
    pub fn new(config: &Config, sink: SharedSink, custom: Vec<CustomProbe>) -> Result<Self> {
        config.validate()?;
        let ctx = MonitorContext::new(config.clone(), sink, custom);
        Self::with_tasks(config, default_tasks(&ctx))
    }

    pub fn with_tasks(config: &Config, tasks: Vec<PollingTask>) -> Result<Self> {
        config.validate()?;

        let signal = Arc::new(ActivitySignal::new(config.initial_mode(), config.cadence()));
        let mut controller = PerfModeController::new(&signal);
        for task in tasks {
            controller.register(task)?;
        }

        let (shutdown_tx, _) = broadcast::channel::<()>(1);

        Ok(Self {
            signal,
            controller,
            shutdown_tx,
        })
    }

    /// The signal the event source should drive.
    pub fn signal(&self) -> Arc<ActivitySignal> {
        self.signal.clone()
    }

    /// Sending on this stops `run`.
    pub fn shutdown_handle(&self) -> broadcast::Sender<()> {
        self.shutdown_tx.clone()
    }

    pub fn task_ids(&self) -> Vec<String> {
        self.controller.tasks().iter().map(|t| t.id().to_string()).collect()
    }

    /// Arm every task and follow the signal until shutdown.
    pub async fn run(self) {
        let shutdown = self.shutdown_tx.subscribe();
        let _signal = self.signal;
        log::info!("Monitor engine starting");
        self.controller.run(shutdown).await;
        log::info!("Monitor engine stopped");
    }
}

/// Single-threaded runtime the engine is designed for.
pub fn build_runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| PulseError::runtime(format!("failed to start runtime: {}", e)))
}
