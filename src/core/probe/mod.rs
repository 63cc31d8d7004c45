//! Probing external tools and endpoints.
//!
//! A probe is an ordered chain of variants. Each variant pairs an operation
//! (spawn a command, fetch a URL, look up a binary) with a timeout and a
//! validator. The executor walks the chain and stops at the first variant
//! whose output validates.

mod batch;
mod executor;

pub use batch::{tool_spec, ConcurrentProbeBatch};
pub use executor::ProbeExecutor;

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Display value for a probe that produced nothing.
pub const PLACEHOLDER: &str = "--";

/// Display value for a tool or endpoint that could not be reached.
pub const UNAVAILABLE: &str = "unavailable";

static IPV4_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\.\d+\.\d+\.\d+$").unwrap());

/// Why a single probe variant did not produce a value.
///
/// Only [`ProbeError::Unavailable`] is ever returned from
/// [`ProbeExecutor::run`]; the other variants are logged per attempt.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProbeError {
    #[error("no probe variant succeeded")]
    Unavailable,

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("failed to spawn {program}: {reason}")]
    Spawn { program: String, reason: String },

    #[error("{program} exited with status {code:?}")]
    ExitStatus { program: String, code: Option<i32> },

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("{0} not found on PATH")]
    NotFound(String),

    #[error("output rejected by validator")]
    Rejected,
}

pub type OperationFuture = BoxFuture<'static, Result<String, ProbeError>>;
pub type OperationFn = Arc<dyn Fn() -> OperationFuture + Send + Sync>;

/// The external call behind one probe variant.
#[derive(Clone)]
pub enum ProbeOperation {
    /// Spawn `program` directly with `args`.
    Command { program: String, args: Vec<String> },
    /// Run a command line through the platform shell.
    Shell(String),
    /// GET a URL and use the response body.
    HttpGet(String),
    /// Resolve a binary on PATH.
    Which(String),
    /// Caller-supplied async operation.
    Custom(OperationFn),
}

impl ProbeOperation {
    pub fn command<I, S>(program: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ProbeOperation::Command {
            program: program.to_string(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    pub fn shell<S: Into<String>>(line: S) -> Self {
        ProbeOperation::Shell(line.into())
    }

    pub fn http_get<S: Into<String>>(url: S) -> Self {
        ProbeOperation::HttpGet(url.into())
    }

    pub fn which<S: Into<String>>(binary: S) -> Self {
        ProbeOperation::Which(binary.into())
    }

    pub fn custom<F, Fut>(operation: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<String, ProbeError>> + Send + 'static,
    {
        ProbeOperation::Custom(Arc::new(move || operation().boxed()))
    }

    /// Short human-readable form used in logs.
    pub fn describe(&self) -> String {
        match self {
            ProbeOperation::Command { program, args } if args.is_empty() => program.clone(),
            ProbeOperation::Command { program, args } => format!("{} {}", program, args.join(" ")),
            ProbeOperation::Shell(line) => format!("sh: {}", line),
            ProbeOperation::HttpGet(url) => format!("GET {}", url),
            ProbeOperation::Which(binary) => format!("which {}", binary),
            ProbeOperation::Custom(_) => "custom".to_string(),
        }
    }
}

impl fmt::Debug for ProbeOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

/// Decides whether raw output counts as success, and what value to keep.
#[derive(Clone)]
pub enum Validator {
    /// Any non-empty output.
    NonEmpty,
    /// Dotted-decimal IPv4 address.
    Ipv4,
    /// First capture group of the pattern, searched anywhere in the output.
    Capture(Regex),
    /// Caller-supplied predicate over the trimmed output.
    Custom(Arc<dyn Fn(&str) -> bool + Send + Sync>),
}

impl Validator {
    pub fn custom<F>(predicate: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Validator::Custom(Arc::new(predicate))
    }

    /// Returns the accepted value, or `None` when the output is rejected.
    pub fn check(&self, output: &str) -> Option<String> {
        let output = output.trim();
        match self {
            Validator::NonEmpty => (!output.is_empty()).then(|| output.to_string()),
            Validator::Ipv4 => is_ipv4(output).then(|| output.to_string()),
            Validator::Capture(pattern) => pattern
                .captures(output)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().trim().to_string())
                .filter(|value| !value.is_empty()),
            Validator::Custom(predicate) => {
                (!output.is_empty() && predicate(output)).then(|| output.to_string())
            }
        }
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Validator::NonEmpty => f.write_str("NonEmpty"),
            Validator::Ipv4 => f.write_str("Ipv4"),
            Validator::Capture(pattern) => write!(f, "Capture({})", pattern.as_str()),
            Validator::Custom(_) => f.write_str("Custom"),
        }
    }
}

pub fn is_ipv4(value: &str) -> bool {
    IPV4_PATTERN.is_match(value)
}

/// One link of a fallback chain.
#[derive(Debug, Clone)]
pub struct ProbeVariant {
    pub operation: ProbeOperation,
    pub timeout: Duration,
    pub validator: Validator,
}

/// Ordered fallback chain plus optional caching.
///
/// The result is cached only when both `cache_key` and `ttl` are set.
#[derive(Debug, Clone, Default)]
pub struct ProbeSpec {
    pub variants: Vec<ProbeVariant>,
    pub cache_key: Option<String>,
    pub ttl: Option<Duration>,
}

impl ProbeSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn variant(mut self, operation: ProbeOperation, timeout: Duration, validator: Validator) -> Self {
        self.variants.push(ProbeVariant {
            operation,
            timeout,
            validator,
        });
        self
    }

    pub fn cached<S: Into<String>>(mut self, key: S, ttl: Duration) -> Self {
        self.cache_key = Some(key.into());
        self.ttl = Some(ttl);
        self
    }
}

/// Collapses a probe result into something safe to display.
pub fn or_placeholder(result: Result<String, ProbeError>) -> String {
    result.unwrap_or_else(|_| PLACEHOLDER.to_string())
}
