//! The process-wide activity signal, as an injectable object.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// Current activity state plus the idle slowdown multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerfMode {
    pub active: bool,
    pub slow_factor: u32,
}

impl Default for PerfMode {
    fn default() -> Self {
        Self {
            active: true,
            slow_factor: 5,
        }
    }
}

/// Base intervals that `fast(m)` / `slow(m)` scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cadence {
    pub fast_base: Duration,
    pub slow_base: Duration,
}

impl Default for Cadence {
    fn default() -> Self {
        Self {
            fast_base: Duration::from_secs(1),
            slow_base: Duration::from_secs(1),
        }
    }
}

impl Cadence {
    pub fn fast(&self, multiplier: f64) -> Duration {
        self.fast_base.mul_f64(multiplier)
    }

    pub fn slow(&self, multiplier: f64) -> Duration {
        self.slow_base.mul_f64(multiplier)
    }
}

/// Holder of the activity state.
///
/// Only the external event source (focus changes, stdin commands) mutates
/// it. Consumers subscribe explicitly and get notified once per actual
/// change; setting an unchanged value is not a change.
#[derive(Debug)]
pub struct ActivitySignal {
    tx: watch::Sender<PerfMode>,
    cadence: Cadence,
}

impl ActivitySignal {
    pub fn new(initial: PerfMode, cadence: Cadence) -> Self {
        let (tx, _rx) = watch::channel(PerfMode {
            slow_factor: initial.slow_factor.max(1),
            ..initial
        });
        Self { tx, cadence }
    }

    pub fn subscribe(&self) -> watch::Receiver<PerfMode> {
        self.tx.subscribe()
    }

    pub fn mode(&self) -> PerfMode {
        *self.tx.borrow()
    }

    pub fn cadence(&self) -> Cadence {
        self.cadence
    }

    pub fn fast(&self, multiplier: f64) -> Duration {
        self.cadence.fast(multiplier)
    }

    pub fn slow(&self, multiplier: f64) -> Duration {
        self.cadence.slow(multiplier)
    }

    /// Replace the whole mode. Returns whether anything changed.
    pub fn set(&self, mode: PerfMode) -> bool {
        let mode = PerfMode {
            slow_factor: mode.slow_factor.max(1),
            ..mode
        };
        self.tx.send_if_modified(|current| {
            if *current == mode {
                return false;
            }
            *current = mode;
            true
        })
    }

    pub fn set_active(&self, active: bool) -> bool {
        self.tx.send_if_modified(|current| {
            if current.active == active {
                return false;
            }
            current.active = active;
            true
        })
    }

    /// A factor of zero is treated as one.
    pub fn set_slow_factor(&self, slow_factor: u32) -> bool {
        let slow_factor = slow_factor.max(1);
        self.tx.send_if_modified(|current| {
            if current.slow_factor == slow_factor {
                return false;
            }
            current.slow_factor = slow_factor;
            true
        })
    }
}

impl Default for ActivitySignal {
    fn default() -> Self {
        Self::new(PerfMode::default(), Cadence::default())
    }
}
