//! Polling tasks and their in-flight guard.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use tokio::task::JoinHandle;

use super::signal::PerfMode;

pub type TaskFuture = BoxFuture<'static, ()>;
pub type TaskHandler = Arc<dyn Fn() -> TaskFuture + Send + Sync>;

/// A recurring sampling job with independent fast and slow intervals.
///
/// Clones share the handler and the busy flag, so the non-overlap guarantee
/// holds across timer re-arms.
#[derive(Clone)]
pub struct PollingTask {
    id: String,
    fast_interval: Duration,
    slow_interval: Duration,
    handler: TaskHandler,
    busy: Arc<AtomicBool>,
}

impl PollingTask {
    pub fn new<F, Fut>(id: impl Into<String>, fast_interval: Duration, slow_interval: Duration, handler: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self {
            id: id.into(),
            fast_interval,
            slow_interval,
            handler: Arc::new(move || handler().boxed()),
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn fast_interval(&self) -> Duration {
        self.fast_interval
    }

    pub fn slow_interval(&self) -> Duration {
        self.slow_interval
    }

    /// `fast_interval` when active, `slow_interval * slow_factor` when idle.
    pub fn effective_interval(&self, mode: PerfMode) -> Duration {
        if mode.active {
            self.fast_interval
        } else {
            self.slow_interval.saturating_mul(mode.slow_factor.max(1))
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Start the handler unless the previous invocation is still running.
    ///
    /// A dropped tick returns `None`; nothing is queued.
    pub fn try_fire(&self) -> Option<JoinHandle<()>> {
        if self.busy.swap(true, Ordering::AcqRel) {
            log::trace!("Task {} still running, tick dropped", self.id);
            return None;
        }

        let guard = BusyGuard(self.busy.clone());
        let run = (self.handler)();
        Some(tokio::spawn(async move {
            let _guard = guard;
            run.await;
        }))
    }
}

impl std::fmt::Debug for PollingTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollingTask")
            .field("id", &self.id)
            .field("fast_interval", &self.fast_interval)
            .field("slow_interval", &self.slow_interval)
            .field("busy", &self.is_busy())
            .finish()
    }
}

/// Clears the busy flag however the handler ends (completion, abort, panic).
struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_effective_interval() {
        let task = PollingTask::new("load", Duration::from_millis(500), Duration::from_millis(1500), || async {});

        let active = PerfMode {
            active: true,
            slow_factor: 5,
        };
        let idle = PerfMode {
            active: false,
            slow_factor: 5,
        };
        assert_eq!(task.effective_interval(active), Duration::from_millis(500));
        assert_eq!(task.effective_interval(idle), Duration::from_millis(7500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_fire_while_busy_is_dropped() {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = runs.clone();
        let task = PollingTask::new("slow", Duration::from_secs(1), Duration::from_secs(1), move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_secs(5)).await;
            }
        });

        let first = task.try_fire().expect("first fire starts");
        assert!(task.is_busy());
        assert!(task.try_fire().is_none());
        assert!(task.clone().try_fire().is_none());

        first.await.unwrap();
        assert!(!task.is_busy());
        assert_eq!(runs.load(Ordering::SeqCst), 1);

        let again = task.try_fire().expect("fires again once idle");
        again.await.unwrap();
        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_aborted_handler_releases_busy_flag() {
        let task = PollingTask::new("hang", Duration::from_secs(1), Duration::from_secs(1), || async {
            std::future::pending::<()>().await;
        });

        let handle = task.try_fire().unwrap();
        tokio::task::yield_now().await;
        handle.abort();
        let _ = handle.await;

        assert!(!task.is_busy());
    }
}
