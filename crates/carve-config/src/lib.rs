//! Configuration and logging setup for Carve

pub mod config;
pub mod logging;

pub use config::{CarveConfig, ExtractionConfig, LogFormat, LoggingConfig, CONFIG_FILES, ENV_PREFIX};
