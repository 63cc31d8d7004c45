// pulsemon library - public API

// Re-export error types
pub mod error;
pub use error::{PulseError, Result};

// Module declarations
pub mod commands;
pub mod core;

// Re-export commonly used types
pub use core::config::Config;
pub use core::runtime::MonitorEngine;

// Initialize logging
pub fn init_logging() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();
}
