//! Shared utilities: configuration and logging setup.

pub mod config;
pub mod logger;

pub use config::Config;
