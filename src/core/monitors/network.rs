//! Local and public IP address tasks.

use std::net::IpAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[cfg(any(not(target_os = "macos"), test))]
use once_cell::sync::Lazy;
#[cfg(any(not(target_os = "macos"), test))]
use regex::Regex;
use sysinfo::Networks;

use super::MonitorContext;
use crate::core::probe::{or_placeholder, ProbeOperation, ProbeSpec, Validator, PLACEHOLDER};
use crate::core::scheduler::PollingTask;

pub const PUBLIC_IP_CACHE_KEY: &str = "net.public";
pub const PUBLIC_IP_TIMEOUT: Duration = Duration::from_millis(2500);

const OFFLINE_IFACE: &str = "(offline)";

#[cfg(any(not(any(target_os = "macos", windows)), test))]
static FIRST_FIELD: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\S+)").expect("valid regex"));
#[cfg(any(windows, test))]
static WINDOWS_IPV4: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)IPv4 Address[^:]*:\s*([0-9.]+)").expect("valid regex"));

/// Per-OS chain for the primary LAN address.
pub fn local_ip_spec(timeout: Duration) -> ProbeSpec {
    let spec = ProbeSpec::new();

    #[cfg(target_os = "macos")]
    let spec = spec
        .variant(ProbeOperation::command("ipconfig", ["getifaddr", "en0"]), timeout, Validator::NonEmpty)
        .variant(ProbeOperation::command("ipconfig", ["getifaddr", "en1"]), timeout, Validator::NonEmpty);

    #[cfg(windows)]
    let spec = spec.variant(
        ProbeOperation::command("ipconfig", Vec::<String>::new()),
        timeout,
        Validator::Capture(WINDOWS_IPV4.clone()),
    );

    #[cfg(not(any(target_os = "macos", windows)))]
    let spec = spec.variant(
        ProbeOperation::command("hostname", ["-I"]),
        timeout,
        Validator::Capture(FIRST_FIELD.clone()),
    );

    spec
}

/// Two `curl` services, then a direct HTTP request; cached for `ttl`.
pub fn public_ip_spec(ttl: Duration) -> ProbeSpec {
    ProbeSpec::new()
        .variant(
            ProbeOperation::command("curl", ["-s", "ifconfig.me"]),
            PUBLIC_IP_TIMEOUT,
            Validator::Ipv4,
        )
        .variant(
            ProbeOperation::command("curl", ["-s", "api.ipify.org"]),
            PUBLIC_IP_TIMEOUT,
            Validator::Ipv4,
        )
        .variant(
            ProbeOperation::http_get("https://api.ipify.org"),
            PUBLIC_IP_TIMEOUT,
            Validator::Ipv4,
        )
        .cached(PUBLIC_IP_CACHE_KEY, ttl)
}

/// No address, or only loopback.
pub fn is_offline(address: &str) -> bool {
    let address = address.trim();
    address.is_empty() || address == PLACEHOLDER || address.starts_with("127.")
}

/// Name of the interface carrying `address`, if any.
pub fn interface_for(address: &str) -> Option<String> {
    let addr: IpAddr = address.trim().parse().ok()?;
    let networks = Networks::new_with_refreshed_list();
    networks
        .iter()
        .find(|(_, data)| data.ip_networks().iter().any(|net| net.addr == addr))
        .map(|(name, _)| name.clone())
}

pub fn local_ip_task(ctx: &MonitorContext, spec: ProbeSpec) -> PollingTask {
    let cadence = ctx.cadence;
    let ctx = ctx.clone();
    let spec = Arc::new(spec);
    let offline = Arc::new(AtomicBool::new(false));

    PollingTask::new("net.local", cadence.fast(5.0), cadence.slow(5.0), move || {
        let (ctx, spec, offline) = (ctx.clone(), spec.clone(), offline.clone());
        async move {
            let address = or_placeholder(ctx.executor.run(&spec).await);
            let now_offline = is_offline(&address);
            if offline.swap(now_offline, Ordering::Relaxed) != now_offline {
                log::info!("Network is {}", if now_offline { "offline" } else { "online" });
            }

            let iface = if now_offline {
                OFFLINE_IFACE.to_string()
            } else {
                interface_for(&address).unwrap_or_else(|| PLACEHOLDER.to_string())
            };

            ctx.write("net.local", &address);
            ctx.write("net.iface", &iface);
            ctx.write("net.state", if now_offline { "offline" } else { "online" });
        }
    })
}

pub fn public_ip_task(ctx: &MonitorContext, spec: ProbeSpec) -> PollingTask {
    let cadence = ctx.cadence;
    let ctx = ctx.clone();
    let spec = Arc::new(spec);

    PollingTask::new("net.public", cadence.fast(60.0), cadence.slow(60.0), move || {
        let (ctx, spec) = (ctx.clone(), spec.clone());
        async move {
            let address = or_placeholder(ctx.executor.run(&spec).await);
            ctx.write("net.public", &address);
        }
    })
}

pub fn tasks(ctx: &MonitorContext) -> Vec<PollingTask> {
    vec![
        local_ip_task(ctx, local_ip_spec(ctx.config.probe_timeout())),
        public_ip_task(ctx, public_ip_spec(ctx.config.public_ip_ttl())),
    ]
}
