//! CPU load, temperature, clock speed and task count.

use std::sync::Arc;

use parking_lot::Mutex;
use sysinfo::{Components, ProcessesToUpdate, System};

use super::MonitorContext;
use crate::core::aggregate::LoadAggregator;
use crate::core::probe::PLACEHOLDER;
use crate::core::scheduler::PollingTask;

/// Where CPU samples come from. `None` means "no reading this tick".
pub trait LoadSource: Send + 'static {
    fn core_count(&self) -> usize;

    /// Per-core load in percent.
    fn core_loads(&mut self) -> Option<Vec<f32>>;

    /// Hottest sensor reading in degrees Celsius.
    fn temperature(&mut self) -> Option<f32>;

    /// Per-core clock in MHz.
    fn frequencies(&mut self) -> Option<Vec<u64>>;

    fn process_count(&mut self) -> Option<usize>;
}

/// Live readings through `sysinfo`.
pub struct SysinfoSource {
    system: System,
    components: Components,
}

impl SysinfoSource {
    pub fn new() -> Self {
        let mut system = System::new();
        system.refresh_cpu_usage();
        Self {
            system,
            components: Components::new_with_refreshed_list(),
        }
    }
}

impl Default for SysinfoSource {
    fn default() -> Self {
        Self::new()
    }
}

impl LoadSource for SysinfoSource {
    fn core_count(&self) -> usize {
        self.system.cpus().len()
    }

    fn core_loads(&mut self) -> Option<Vec<f32>> {
        self.system.refresh_cpu_usage();
        let loads: Vec<f32> = self.system.cpus().iter().map(|cpu| cpu.cpu_usage()).collect();
        (!loads.is_empty()).then_some(loads)
    }

    fn temperature(&mut self) -> Option<f32> {
        self.components.refresh(true);
        self.components
            .iter()
            .filter_map(|component| component.temperature())
            .filter(|t| t.is_finite() && *t > 0.0)
            .reduce(f32::max)
    }

    fn frequencies(&mut self) -> Option<Vec<u64>> {
        self.system.refresh_cpu_frequency();
        let freqs: Vec<u64> = self
            .system
            .cpus()
            .iter()
            .map(|cpu| cpu.frequency())
            .filter(|mhz| *mhz > 0)
            .collect();
        (!freqs.is_empty()).then_some(freqs)
    }

    fn process_count(&mut self) -> Option<usize> {
        self.system.refresh_processes(ProcessesToUpdate::All, true);
        Some(self.system.processes().len())
    }
}

pub fn load_key(bucket: usize) -> String {
    format!("cpu.avg.{}", bucket)
}

fn format_temperature(celsius: Option<f32>) -> String {
    match celsius {
        Some(c) => format!("{:.0}°C", c),
        None => format!("{}°C", PLACEHOLDER),
    }
}

fn format_ghz(mhz: Option<u64>) -> String {
    match mhz {
        Some(mhz) => format!("{:.2} GHz", mhz as f64 / 1000.0),
        None => format!("{} GHz", PLACEHOLDER),
    }
}

/// Load (two halves), temperature (not on Windows), speed and task count.
pub fn tasks<S: LoadSource>(ctx: &MonitorContext, source: S) -> Vec<PollingTask> {
    let cadence = ctx.cadence;
    let aggregator = Arc::new(Mutex::new(LoadAggregator::halves(source.core_count())));
    let source = Arc::new(Mutex::new(source));
    let mut tasks = Vec::with_capacity(4);

    {
        let (ctx, source) = (ctx.clone(), source.clone());
        tasks.push(PollingTask::new("cpu.load", cadence.fast(0.5), cadence.slow(1.5), move || {
            let (ctx, source, aggregator) = (ctx.clone(), source.clone(), aggregator.clone());
            async move {
                let sample = source.lock().core_loads();
                let mut aggregator = aggregator.lock();
                if !aggregator.update(sample.as_deref()) {
                    return;
                }
                for (i, bucket) in aggregator.current().iter().enumerate() {
                    ctx.write(&load_key(i), &bucket.display_percent());
                }
            }
        }));
    }

    if !cfg!(windows) {
        let (ctx, source) = (ctx.clone(), source.clone());
        tasks.push(PollingTask::new("cpu.temp", cadence.fast(2.0), cadence.slow(5.0), move || {
            let (ctx, source) = (ctx.clone(), source.clone());
            async move {
                let reading = source.lock().temperature();
                ctx.write("cpu.temp", &format_temperature(reading));
            }
        }));
    }

    {
        let (ctx, source) = (ctx.clone(), source.clone());
        tasks.push(PollingTask::new("cpu.speed", cadence.fast(1.0), cadence.slow(2.0), move || {
            let (ctx, source) = (ctx.clone(), source.clone());
            async move {
                let freqs = source.lock().frequencies();
                let (avg, max) = match freqs {
                    Some(f) => (Some(f.iter().sum::<u64>() / f.len() as u64), f.iter().copied().max()),
                    None => (None, None),
                };
                ctx.write("cpu.speed", &format_ghz(avg));
                ctx.write("cpu.speed_max", &format_ghz(max));
            }
        }));
    }

    {
        let ctx = ctx.clone();
        tasks.push(PollingTask::new("cpu.tasks", cadence.fast(5.0), cadence.slow(10.0), move || {
            let (ctx, source) = (ctx.clone(), source.clone());
            async move {
                let count = source.lock().process_count();
                let value = count.map_or_else(|| PLACEHOLDER.to_string(), |n| n.to_string());
                ctx.write("cpu.tasks", &value);
            }
        }));
    }

    tasks
}
