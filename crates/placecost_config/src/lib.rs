//! Parsing and validation of `placecost.toml` engine configuration files.
//!
//! This crate reads the configuration file and produces a strongly-typed
//! [`CostConfig`]: channel-factor exponent, small-net threshold, bounding-box
//! form, drift tolerance, timing mode, and the stress-harness settings.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{
    load_config, load_config_from_path, load_config_from_str, validate_config, CONFIG_FILE_NAME,
};
pub use types::*;
