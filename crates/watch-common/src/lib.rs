//! # watch-common
//!
//! Shared utilities: configuration loading and telemetry setup.

pub mod config;
pub mod telemetry;

// Re-export commonly used types at crate root
pub use config::{AppConfig, AppSettings, ConfigError, DatabaseSettings, Environment};
pub use telemetry::{
    TracingConfig, TracingError, init_tracing, init_tracing_with_config, try_init_tracing,
    try_init_tracing_with_config,
};
