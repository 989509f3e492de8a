//! Cascading configuration loading.

mod duration;
mod env;
mod error;
mod file;
mod loader;
mod merge;
mod resolve;

pub use duration::{parse_duration, Duration, DurationParseError};
pub use env::{
    expand, EnvDirSpec, Environment, ProcessEnv, CONFIG_DIRS, CONFIG_HOME, XDG_CONFIG_DIRS,
    XDG_CONFIG_HOME,
};
pub use error::{Attempt, AttemptError, ConfigError, LoadFailure};
pub use loader::{load, LoadReport, Loader};
pub use resolve::SearchPath;
