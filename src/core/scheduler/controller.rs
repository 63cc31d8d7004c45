//! Retunes every polling task's timer when the activity signal changes.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use super::signal::{ActivitySignal, PerfMode};
use super::task::PollingTask;
use crate::error::{PulseError, Result};

/// Owns the recurring timers of all registered polling tasks.
///
/// All tasks are re-armed together on each signal change, so related tasks
/// (load and temperature sampling, say) never drift into inconsistent phases.
pub struct PerfModeController {
    signal: watch::Receiver<PerfMode>,
    tasks: Vec<PollingTask>,
    timers: HashMap<String, JoinHandle<()>>,
}

impl PerfModeController {
    pub fn new(signal: &ActivitySignal) -> Self {
        Self {
            signal: signal.subscribe(),
            tasks: Vec::new(),
            timers: HashMap::new(),
        }
    }

    /// Add a task. It starts ticking on the next `apply_mode`.
    ///
    /// Empty or duplicate ids and zero intervals are rejected.
    pub fn register(&mut self, task: PollingTask) -> Result<()> {
        if task.id().is_empty() {
            return Err(PulseError::invalid_task("task id must not be empty"));
        }
        if self.tasks.iter().any(|t| t.id() == task.id()) {
            return Err(PulseError::invalid_task(format!(
                "task '{}' is already registered",
                task.id()
            )));
        }
        if task.fast_interval().is_zero() || task.slow_interval().is_zero() {
            return Err(PulseError::invalid_task(format!(
                "task '{}' has a zero interval",
                task.id()
            )));
        }

        log::debug!(
            "Registered task {} (fast {:?}, slow {:?})",
            task.id(),
            task.fast_interval(),
            task.slow_interval()
        );
        self.tasks.push(task);
        Ok(())
    }

    pub fn tasks(&self) -> &[PollingTask] {
        &self.tasks
    }

    pub fn mode(&self) -> PerfMode {
        *self.signal.borrow()
    }

    /// Interval the task would tick at under the current mode.
    pub fn effective_interval(&self, id: &str) -> Option<Duration> {
        let mode = self.mode();
        self.tasks
            .iter()
            .find(|t| t.id() == id)
            .map(|t| t.effective_interval(mode))
    }

    /// Number of live timers.
    pub fn armed(&self) -> usize {
        self.timers.values().filter(|h| !h.is_finished()).count()
    }

    /// Cancel every task's timer and start a new one at its effective interval.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn apply_mode(&mut self) {
        let mode = *self.signal.borrow_and_update();

        for task in &self.tasks {
            if let Some(previous) = self.timers.remove(task.id()) {
                previous.abort();
            }
            let period = task.effective_interval(mode);
            self.timers
                .insert(task.id().to_string(), spawn_timer(task.clone(), period));
        }

        log::debug!(
            "Applied {} mode to {} tasks (slow factor {})",
            if mode.active { "active" } else { "idle" },
            self.tasks.len(),
            mode.slow_factor
        );
    }

    /// Hook for the signal source. Re-arms synchronously; safe to repeat.
    pub fn on_signal_change(&mut self) {
        self.apply_mode();
    }

    /// Cancel all timers. In-flight handlers are left to finish.
    pub fn shutdown(&mut self) {
        for (_, timer) in self.timers.drain() {
            timer.abort();
        }
    }

    /// Arm all tasks, then follow the signal until `shutdown` fires.
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) {
        log::info!("Scheduler started with {} tasks", self.tasks.len());
        self.apply_mode();

        loop {
            tokio::select! {
                changed = self.signal.changed() => {
                    if changed.is_err() {
                        // Signal source is gone: keep the current cadence.
                        let _ = shutdown.recv().await;
                        break;
                    }
                    self.on_signal_change();
                }
                _ = shutdown.recv() => break,
            }
        }

        self.shutdown();
        log::info!("Scheduler stopped");
    }
}

impl Drop for PerfModeController {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn spawn_timer(task: PollingTask, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            let _ = task.try_fire();
        }
    })
}
