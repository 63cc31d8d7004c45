//! Periodic availability check for pentest tools and custom launchers.

use std::sync::Arc;

use super::MonitorContext;
use crate::core::config::Config;
use crate::core::probe::{tool_spec, ConcurrentProbeBatch, ProbeSpec};
use crate::core::scheduler::PollingTask;
use crate::core::tools_config::CustomProbe;

pub const AVAILABLE: &str = "available";
pub const MISSING: &str = "missing";

/// `(label, spec)` for every configured tool and every custom entry.
///
/// Custom entries are probed by the first word of their command and
/// labelled `custom.<label>`.
pub fn availability_specs(config: &Config, customs: &[CustomProbe]) -> Vec<(String, ProbeSpec)> {
    let timeout = config.probe_timeout();
    let mut specs: Vec<(String, ProbeSpec)> = config
        .tools
        .iter()
        .map(|tool| (tool.clone(), tool_spec(tool, timeout)))
        .collect();

    for custom in customs {
        let template = custom.template();
        if let Some(program) = template.program() {
            specs.push((format!("custom.{}", custom.label), tool_spec(program, timeout)));
        }
    }
    specs
}

pub fn status(available: bool) -> &'static str {
    if available {
        AVAILABLE
    } else {
        MISSING
    }
}

pub fn tasks(ctx: &MonitorContext) -> Vec<PollingTask> {
    let cadence = ctx.cadence;
    let batch = Arc::new(ConcurrentProbeBatch::new(ctx.executor.clone()));
    let ctx = ctx.clone();

    vec![PollingTask::new("tools", cadence.fast(30.0), cadence.slow(120.0), move || {
        let (ctx, batch) = (ctx.clone(), batch.clone());
        async move {
            let results = batch.run_all(availability_specs(&ctx.config, &ctx.custom)).await;
            for (label, available) in results {
                ctx.write(&format!("tool.{}", label), status(available));
            }
        }
    })]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sink::MemorySink;

    fn context(tools: Vec<&str>, custom: Vec<CustomProbe>) -> (Arc<MemorySink>, MonitorContext) {
        let sink = Arc::new(MemorySink::new());
        let config = Config {
            tools: tools.into_iter().map(String::from).collect(),
            ..Default::default()
        };
        (sink.clone(), MonitorContext::new(config, sink, custom))
    }

    #[test]
    fn test_specs_include_custom_programs() {
        let custom = vec![CustomProbe {
            label: "whois".into(),
            command: "whois {input}".into(),
            placeholder: None,
        }];
        let (_, ctx) = context(vec!["nmap", "john"], custom);

        let labels: Vec<String> = availability_specs(&ctx.config, &ctx.custom)
            .into_iter().map(|(l, _)| l).collect();
        assert_eq!(labels, vec!["nmap", "john", "custom.whois"]);
    }

    #[tokio::test]
    async fn test_missing_tool_is_reported() {
        let (sink, ctx) = context(vec!["definitely-not-installed-pulsemon"], Vec::new());
        let task = tasks(&ctx).remove(0);
        task.try_fire().unwrap().await.unwrap();

        assert_eq!(
            sink.get("tool.definitely-not-installed-pulsemon").as_deref(),
            Some(MISSING)
        );
    }
}
