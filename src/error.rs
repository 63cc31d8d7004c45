use thiserror::Error;

/// Custom error type for the pulsemon engine
///
/// Probe and sink failures never show up here: they are absorbed where they
/// happen and turned into placeholders. What remains are conditions that
/// should stop the program.
#[derive(Error, Debug)]
pub enum PulseError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid polling task: {0}")]
    InvalidTask(String),

    #[error("Runtime error: {0}")]
    Runtime(String),
}

/// Result type alias for pulsemon
pub type Result<T> = std::result::Result<T, PulseError>;

impl PulseError {
    /// Create a config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        PulseError::Config(msg.into())
    }

    /// Create an invalid task error
    pub fn invalid_task<S: Into<String>>(msg: S) -> Self {
        PulseError::InvalidTask(msg.into())
    }

    pub fn runtime<S: Into<String>>(msg: S) -> Self {
        PulseError::Runtime(msg.into())
    }
}
