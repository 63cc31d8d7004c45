use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use pulsemon::core::scheduler::{ActivitySignal, Cadence, PerfMode, PerfModeController, PollingTask};

fn task(id: &str, cadence: Cadence, fast: f64, slow: f64, hits: Arc<AtomicUsize>) -> PollingTask {
    PollingTask::new(id, cadence.fast(fast), cadence.slow(slow), move || {
        let hits = hits.clone();
        async move {
            hits.fetch_add(1, Ordering::SeqCst);
        }
    })
}

#[tokio::test(start_paused = true)]
async fn test_every_task_retuned_after_transition() {
    let cadence = Cadence::default();
    let signal = ActivitySignal::new(
        PerfMode {
            active: true,
            slow_factor: 5,
        },
        cadence,
    );
    let mut controller = PerfModeController::new(&signal);
    let hits = Arc::new(AtomicUsize::new(0));

    let multipliers = [("load", 0.5, 1.5), ("temp", 2.0, 5.0), ("speed", 1.0, 2.0), ("tasks", 5.0, 10.0)];
    for (id, fast, slow) in multipliers {
        controller.register(task(id, cadence, fast, slow, hits.clone())).unwrap();
    }
    controller.apply_mode();

    signal.set_active(false);
    controller.on_signal_change();
    for (id, _, slow) in multipliers {
        assert_eq!(
            controller.effective_interval(id),
            Some(cadence.slow(slow) * 5),
            "idle interval for {}",
            id
        );
    }

    signal.set_active(true);
    controller.on_signal_change();
    for (id, fast, _) in multipliers {
        assert_eq!(controller.effective_interval(id), Some(cadence.fast(fast)));
    }
}

#[tokio::test(start_paused = true)]
async fn test_slow_factor_change_applies_to_idle_cadence() {
    let signal = ActivitySignal::new(
        PerfMode {
            active: false,
            slow_factor: 2,
        },
        Cadence::default(),
    );
    let mut controller = PerfModeController::new(&signal);
    let hits = Arc::new(AtomicUsize::new(0));
    controller
        .register(task("net", Cadence::default(), 5.0, 5.0, hits))
        .unwrap();
    controller.apply_mode();
    assert_eq!(controller.effective_interval("net"), Some(Duration::from_secs(10)));

    assert!(signal.set_slow_factor(4));
    controller.on_signal_change();
    assert_eq!(controller.effective_interval("net"), Some(Duration::from_secs(20)));

    assert!(!signal.set_slow_factor(4));
}
