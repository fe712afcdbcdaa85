//! Environment-backed configuration.
//!
//! Host and port come from the CLI; everything pointing at external
//! capabilities is read from the environment with development defaults.

use std::env;

use crate::infrastructure::calls::DEFAULT_CALLS_BASE_URL;

#[derive(Debug, Clone)]
pub struct Config {
    pub calls_base_url: String,
    pub calls_app_id: String,
    pub calls_app_secret: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            calls_base_url: get_env("CALLS_BASE_URL", DEFAULT_CALLS_BASE_URL),
            calls_app_id: get_env("CALLS_APP_ID", ""),
            calls_app_secret: get_env("CALLS_APP_SECRET", ""),
        }
    }
}

fn get_env(key: &str, default: &str) -> String {
    match env::var(key) {
        Ok(value) if !value.is_empty() => value,
        _ => default.to_string(),
    }
}
