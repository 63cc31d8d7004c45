//! Runs probe specs: cache lookup, then the fallback chain under timeouts.

use std::env;
use std::ffi::OsString;
use std::process::Stdio;
use std::sync::Arc;

use tokio::process::Command;

use super::{ProbeError, ProbeOperation, ProbeSpec, ProbeVariant};
use crate::core::cache::TtlCache;

const USER_AGENT: &str = concat!("pulsemon/", env!("CARGO_PKG_VERSION"));

/// Executes probes and owns the cache shared between them.
///
/// Cloning is cheap; clones share the same cache and HTTP client, so
/// concurrent `run` calls on distinct specs only contend on the cache lock.
#[derive(Clone)]
pub struct ProbeExecutor {
    cache: Arc<TtlCache<String, String>>,
    http: reqwest::Client,
}

impl ProbeExecutor {
    pub fn new() -> Self {
        Self::with_cache(Arc::new(TtlCache::new()))
    }

    pub fn with_cache(cache: Arc<TtlCache<String, String>>) -> Self {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|e| {
                log::debug!("Falling back to default HTTP client: {}", e);
                reqwest::Client::new()
            });

        Self { cache, http }
    }

    pub fn cache(&self) -> &Arc<TtlCache<String, String>> {
        &self.cache
    }

    /// Resolve `spec` to a value.
    ///
    /// A live cache entry short-circuits everything. Otherwise variants run
    /// strictly in order and the first validated output wins. When the chain
    /// is exhausted the result is [`ProbeError::Unavailable`], which callers
    /// are expected to render as a placeholder.
    pub async fn run(&self, spec: &ProbeSpec) -> Result<String, ProbeError> {
        if let Some(key) = spec.cache_key.as_deref() {
            if let Some(hit) = self.cache.get(key) {
                log::trace!("Probe cache hit for {}", key);
                return Ok(hit);
            }
        }

        for (index, variant) in spec.variants.iter().enumerate() {
            match self.attempt(variant).await {
                Ok(value) => {
                    if let (Some(key), Some(ttl)) = (&spec.cache_key, spec.ttl) {
                        self.cache.insert(key.clone(), value.clone(), ttl);
                    }
                    return Ok(value);
                }
                Err(e) => {
                    log::debug!(
                        "Probe variant {} ({}) failed: {}",
                        index + 1,
                        variant.operation.describe(),
                        e
                    );
                }
            }
        }

        Err(ProbeError::Unavailable)
    }

    async fn attempt(&self, variant: &ProbeVariant) -> Result<String, ProbeError> {
        // Dropping the inner future on timeout kills the child process
        // (kill_on_drop) or closes the HTTP connection.
        let raw = tokio::time::timeout(variant.timeout, self.execute(&variant.operation))
            .await
            .map_err(|_| ProbeError::Timeout(variant.timeout))??;

        variant.validator.check(&raw).ok_or(ProbeError::Rejected)
    }

    async fn execute(&self, operation: &ProbeOperation) -> Result<String, ProbeError> {
        match operation {
            ProbeOperation::Command { program, args } => run_command(program, args).await,
            ProbeOperation::Shell(line) => {
                let (shell, flag) = platform_shell();
                run_command(shell, &[flag.to_string(), line.clone()]).await
            }
            ProbeOperation::HttpGet(url) => self.fetch(url).await,
            ProbeOperation::Which(binary) => find_binary(binary.clone(), env::var_os("PATH")).await,
            ProbeOperation::Custom(operation) => operation().await,
        }
    }

    async fn fetch(&self, url: &str) -> Result<String, ProbeError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| ProbeError::Http(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ProbeError::Http(format!("status {}", response.status())));
        }

        response
            .text()
            .await
            .map_err(|e| ProbeError::Http(e.to_string()))
    }
}

impl Default for ProbeExecutor {
    fn default() -> Self {
        Self::new()
    }
}

/// PATH lookup on the blocking pool, so the variant timeout can cut it short
/// and sibling probes keep running while a slow PATH is walked.
async fn find_binary(binary: String, paths: Option<OsString>) -> Result<String, ProbeError> {
    tokio::task::spawn_blocking(move || {
        let cwd = env::current_dir().unwrap_or_default();
        which::which_in(&binary, paths, cwd)
            .map(|path| path.to_string_lossy().into_owned())
            .map_err(|_| ProbeError::NotFound(binary.clone()))
    })
    .await
    .map_err(|e| ProbeError::Spawn {
        program: "which".to_string(),
        reason: e.to_string(),
    })?
}

async fn run_command(program: &str, args: &[String]) -> Result<String, ProbeError> {
    let spawn_error = |e: std::io::Error| ProbeError::Spawn {
        program: program.to_string(),
        reason: e.to_string(),
    };

    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .kill_on_drop(true);
    #[cfg(unix)]
    command.process_group(0);

    let child = command.spawn().map_err(spawn_error)?;
    #[cfg(unix)]
    let mut group = ProcessGroupGuard(child.id());

    let output = child.wait_with_output().await.map_err(spawn_error)?;
    #[cfg(unix)]
    group.disarm();

    if !output.status.success() {
        return Err(ProbeError::ExitStatus {
            program: program.to_string(),
            code: output.status.code(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Kills the child's whole process group unless the wait completed.
///
/// `kill_on_drop` only reaches the direct child; anything a shell forked
/// would otherwise outlive a timed-out probe.
#[cfg(unix)]
struct ProcessGroupGuard(Option<u32>);

#[cfg(unix)]
impl ProcessGroupGuard {
    fn disarm(&mut self) {
        self.0 = None;
    }
}

#[cfg(unix)]
impl Drop for ProcessGroupGuard {
    fn drop(&mut self) {
        if let Some(pgid) = self.0.take() {
            log::trace!("Killing process group {}", pgid);
            unsafe {
                libc::kill(-(pgid as libc::pid_t), libc::SIGKILL);
            }
        }
    }
}

#[cfg(windows)]
fn platform_shell() -> (&'static str, &'static str) {
    ("cmd", "/C")
}

#[cfg(not(windows))]
fn platform_shell() -> (&'static str, &'static str) {
    ("sh", "-c")
}
