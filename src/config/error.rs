use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// No directory on the search path yielded a decodable file.
    #[error(transparent)]
    NotFound(LoadFailure),

    #[error("config file name must not contain a directory component: '{0}'")]
    InvalidFileName(String),

    #[error("failed to serialize config target: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("config target must serialize to a table")]
    TargetNotTable,
}

impl ConfigError {
    /// Returns `true` if the error means the file was found nowhere.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ConfigError::NotFound(_))
    }
}

/// Why a single candidate file did not contribute to the merge.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AttemptError {
    #[error("file not found")]
    Missing,

    #[error("failed to read file: {0}")]
    Read(#[source] std::io::Error),

    #[error("failed to parse file: {0}")]
    Parse(#[source] toml::de::Error),

    #[error("failed to decode file into config target: {0}")]
    Decode(#[source] serde_json::Error),
}

/// One candidate path and the reason it was skipped.
#[derive(Debug)]
pub struct Attempt {
    pub path: PathBuf,
    pub error: AttemptError,
}

/// Every lookup made while searching for a config file that was never found.
///
/// Attempts are kept in visit order, lowest precedence first.
#[derive(Debug)]
pub struct LoadFailure {
    file_name: String,
    attempts: Vec<Attempt>,
}

impl LoadFailure {
    pub(crate) fn new(file_name: impl Into<String>, attempts: Vec<Attempt>) -> Self {
        Self {
            file_name: file_name.into(),
            attempts,
        }
    }

    /// The file name that was searched for.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn attempts(&self) -> &[Attempt] {
        &self.attempts
    }
}

impl fmt::Display for LoadFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config file '{}' load failed, searched:", self.file_name)?;
        if self.attempts.is_empty() {
            return write!(f, " no directories");
        }
        for attempt in &self.attempts {
            write!(f, "\n  {}: {}", attempt.path.display(), attempt.error)?;
        }
        Ok(())
    }
}

impl std::error::Error for LoadFailure {}
