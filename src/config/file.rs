//! Reading a single candidate config file.

use std::path::Path;

use super::error::AttemptError;

/// Loads and parses a TOML config file.
///
/// A missing file is reported as [`AttemptError::Missing`] so the caller can
/// tell it apart from a file that exists but could not be used.
pub(crate) fn read_table(path: &Path) -> Result<toml::Table, AttemptError> {
    match std::fs::read_to_string(path) {
        Ok(contents) => toml::from_str(&contents).map_err(AttemptError::Parse),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(AttemptError::Missing),
        Err(e) => Err(AttemptError::Read(e)),
    }
}
