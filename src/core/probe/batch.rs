//! Fan-out of independent availability probes.

use std::collections::BTreeMap;
use std::time::Duration;

use futures_util::stream::{FuturesUnordered, StreamExt};

use super::{ProbeExecutor, ProbeOperation, ProbeSpec, Validator};

/// Runs many unrelated probes at once and reports which ones succeeded.
///
/// A failing or hanging probe never affects its siblings: each one is
/// bounded by its own variant timeouts and any error collapses to `false`.
#[derive(Clone)]
pub struct ConcurrentProbeBatch {
    executor: ProbeExecutor,
}

impl ConcurrentProbeBatch {
    pub fn new(executor: ProbeExecutor) -> Self {
        Self { executor }
    }

    /// Run every probe concurrently and wait for all of them.
    ///
    /// Results are recorded in completion order; the returned map is keyed by
    /// label. A repeated label keeps whichever probe finished last.
    pub async fn run_all<I>(&self, specs: I) -> BTreeMap<String, bool>
    where
        I: IntoIterator<Item = (String, ProbeSpec)>,
    {
        let mut pending: FuturesUnordered<_> = specs
            .into_iter()
            .map(|(label, spec)| {
                let executor = self.executor.clone();
                async move {
                    let available = executor.run(&spec).await.is_ok();
                    (label, available)
                }
            })
            .collect();

        let mut results = BTreeMap::new();
        while let Some((label, available)) = pending.next().await {
            log::trace!("Probe {} resolved: {}", label, available);
            results.insert(label, available);
        }
        results
    }
}

/// Probe for "is `binary` installed": a PATH lookup bounded by `timeout`.
pub fn tool_spec(binary: &str, timeout: Duration) -> ProbeSpec {
    ProbeSpec::new().variant(ProbeOperation::which(binary), timeout, Validator::NonEmpty)
}
