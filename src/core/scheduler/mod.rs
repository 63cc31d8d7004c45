//! Adaptive interval scheduling.
//!
//! Tasks poll fast while the user is active and slow down when idle. The
//! controller subscribes to the activity signal and re-arms every task's
//! timer in one pass on each change.

mod controller;
mod signal;
mod task;

pub use controller::PerfModeController;
pub use signal::{ActivitySignal, Cadence, PerfMode};
pub use task::{PollingTask, TaskFuture, TaskHandler};
