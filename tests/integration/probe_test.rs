use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use pulsemon::core::probe::{
    or_placeholder, ConcurrentProbeBatch, ProbeError, ProbeExecutor, ProbeOperation, ProbeSpec,
    Validator, PLACEHOLDER,
};

fn counted(calls: Arc<AtomicUsize>, value: &'static str) -> ProbeOperation {
    ProbeOperation::custom(move || {
        let calls = calls.clone();
        async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(value.to_string())
        }
    })
}

#[tokio::test(start_paused = true)]
async fn test_cached_public_ip_style_chain() {
    let executor = ProbeExecutor::new();
    let first = Arc::new(AtomicUsize::new(0));
    let second = Arc::new(AtomicUsize::new(0));

    let spec = ProbeSpec::new()
        .variant(counted(first.clone(), "<html>blocked</html>"), Duration::from_secs(2), Validator::Ipv4)
        .variant(counted(second.clone(), "198.51.100.4\n"), Duration::from_secs(2), Validator::Ipv4)
        .cached("public", Duration::from_secs(60));

    assert_eq!(executor.run(&spec).await.unwrap(), "198.51.100.4");
    assert_eq!(executor.run(&spec).await.unwrap(), "198.51.100.4");
    assert_eq!(first.load(Ordering::SeqCst), 1);
    assert_eq!(second.load(Ordering::SeqCst), 1);

    tokio::time::advance(Duration::from_secs(61)).await;
    executor.run(&spec).await.unwrap();
    assert_eq!(second.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_all_variants_failing_gives_placeholder() {
    let executor = ProbeExecutor::new();
    let spec = ProbeSpec::new()
        .variant(
            ProbeOperation::custom(|| async { Err(ProbeError::Http("503".into())) }),
            Duration::from_secs(1),
            Validator::NonEmpty,
        )
        .variant(
            ProbeOperation::custom(|| async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Ok("late".to_string())
            }),
            Duration::from_secs(1),
            Validator::NonEmpty,
        );

    let result = executor.run(&spec).await;
    assert_eq!(result, Err(ProbeError::Unavailable));
    assert_eq!(or_placeholder(result), PLACEHOLDER);
}

#[tokio::test(start_paused = true)]
async fn test_batch_isolates_failures() {
    let batch = ConcurrentProbeBatch::new(ProbeExecutor::new());
    let specs = (0..5).map(|i| {
        let op = if i == 2 {
            ProbeOperation::custom(|| async { Err(ProbeError::NotFound("x".into())) })
        } else {
            ProbeOperation::custom(|| async { Ok("/usr/bin/tool".to_string()) })
        };
        (
            format!("tool{}", i),
            ProbeSpec::new().variant(op, Duration::from_millis(500), Validator::NonEmpty),
        )
    });

    let results = batch.run_all(specs).await;
    assert_eq!(results.len(), 5);
    assert_eq!(results.get("tool2"), Some(&false));
    assert_eq!(results.values().filter(|v| **v).count(), 4);
}
