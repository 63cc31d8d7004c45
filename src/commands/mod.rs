// Command handlers module
pub mod config;
pub mod launch;
pub mod monitor;
pub mod probe;
pub mod tools;

// Re-exports for cleaner imports
pub use config::execute as config;
pub use launch::execute as launch;
pub use monitor::execute as monitor;
pub use probe::execute as probe;
pub use tools::execute as tools;
