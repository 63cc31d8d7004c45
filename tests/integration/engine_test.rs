use std::sync::Arc;
use std::time::Duration;

use pulsemon::core::config::Config;
use pulsemon::core::sink::{guarded_write, MemorySink, MetricSink};
use pulsemon::core::scheduler::PollingTask;
use pulsemon::MonitorEngine;

fn writer(sink: Arc<MemorySink>, key: &'static str) -> PollingTask {
    PollingTask::new(key, Duration::from_millis(200), Duration::from_millis(200), move || {
        let sink = sink.clone();
        async move {
            guarded_write(sink.as_ref(), key, "ok");
        }
    })
}

#[tokio::test(start_paused = true)]
async fn test_engine_survives_removed_sink_targets() {
    let sink = Arc::new(MemorySink::with_targets(["cpu.avg.0", "net.local"]));
    let engine = MonitorEngine::with_tasks(
        &Config::default(),
        vec![writer(sink.clone(), "cpu.avg.0"), writer(sink.clone(), "net.local")],
    )
    .unwrap();

    let shutdown = engine.shutdown_handle();
    let runner = tokio::spawn(engine.run());

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(sink.get("cpu.avg.0").as_deref(), Some("ok"));

    sink.remove("net.local");
    tokio::time::sleep(Duration::from_millis(600)).await;
    assert!(sink.write("net.local", "x").is_err());
    assert_eq!(sink.get("cpu.avg.0").as_deref(), Some("ok"));
    assert!(!runner.is_finished());

    shutdown.send(()).unwrap();
    runner.await.unwrap();
}

#[test]
fn test_engine_registers_full_monitor_set() {
    let sink = Arc::new(MemorySink::new());
    let engine = MonitorEngine::new(&Config::default(), sink, Vec::new()).unwrap();
    let ids = engine.task_ids();

    for id in ["cpu.load", "cpu.speed", "cpu.tasks", "net.local", "net.public", "tools"] {
        assert!(ids.iter().any(|t| t == id), "missing task {}", id);
    }
}
