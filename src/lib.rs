//! Layered TOML configuration discovered across the executable's directory,
//! `XDG_CONFIG_DIRS` and `XDG_CONFIG_HOME`, merged so the most specific
//! directory wins field by field.

pub mod config;

pub use config::{load, ConfigError, Duration, LoadFailure, Loader};
