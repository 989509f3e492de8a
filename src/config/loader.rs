use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::env::{Environment, ProcessEnv};
use super::error::{Attempt, AttemptError, ConfigError, LoadFailure};
use super::file::read_table;
use super::merge::deep_merge;
use super::resolve::{search_path, ExecDir, SearchPath};

/// Loads `file_name` from every directory on the standard search path and
/// overlays the results onto `target`.
///
/// Uses the process environment and the running executable's directory. See
/// [`Loader`] for the search order and merge rules.
pub fn load<T>(file_name: &str, target: &mut T) -> Result<(), ConfigError>
where
    T: Serialize + DeserializeOwned,
{
    Loader::new().load(file_name, target)
}

/// Cascading loader for a config file that may exist in several directories.
///
/// The search path is resolved on every call, lowest precedence first:
/// the executable's directory, then `XDG_CONFIG_DIRS` (reversed, so the
/// first-listed directory ranks highest), then `XDG_CONFIG_HOME` (default
/// `$HOME/.config`).
///
/// Each file found is decoded as TOML and overlaid onto the result of the
/// files before it: keys it sets win, nested tables merge key by key, and keys
/// it omits keep their earlier value. The target's own value seeds the merge,
/// so fields no file mentions are left as the caller set them.
///
/// ## Round-trip requirement
///
/// Seeding serializes the target and the result is deserialized back, so the
/// target must survive a serde round-trip through a JSON-like value. Fields
/// marked `#[serde(skip)]` (or `skip_serializing`) are not seeded and come
/// back as their `Default` whenever a file is loaded. Keep runtime-only state
/// outside the config type. Floats that are NaN or infinite are also not
/// representable and serialize as unset.
///
/// Directories where the file is missing, unreadable, malformed or does not
/// fit the target type are skipped. Loading fails with
/// [`ConfigError::NotFound`] only when no directory contributed.
///
/// ## Example
///
/// ```no_run
/// use serde::{Deserialize, Serialize};
/// use xdg_cascade::{Duration, Loader};
///
/// #[derive(Default, Serialize, Deserialize)]
/// struct ServerConfig {
///     listen: String,
///     timeout: Option<Duration>,
/// }
///
/// let mut config = ServerConfig {
///     listen: "127.0.0.1:8080".into(),
///     ..Default::default()
/// };
/// Loader::new().load("server.toml", &mut config)?;
/// # Ok::<(), xdg_cascade::ConfigError>(())
/// ```
#[derive(Debug, Clone, Default)]
#[must_use = "a loader does nothing until .load() is called"]
pub struct Loader<E = ProcessEnv> {
    env: E,
    exec_dir: ExecDir,
}

/// What a successful load drew on.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Files overlaid onto the target, in the order they were applied.
    pub loaded: Vec<PathBuf>,
    /// Candidates that contributed nothing.
    pub skipped: Vec<Attempt>,
}

impl Loader<ProcessEnv> {
    /// Creates a loader reading the process environment.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<E: Environment> Loader<E> {
    /// Resolves environment variables through `env` instead.
    pub fn with_env<F: Environment>(self, env: F) -> Loader<F> {
        Loader {
            env,
            exec_dir: self.exec_dir,
        }
    }

    /// Uses `dir` as the lowest-precedence directory in place of the
    /// executable's directory.
    pub fn with_exec_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.exec_dir = ExecDir::Fixed(dir.as_ref().to_path_buf());
        self
    }

    /// Leaves the executable's directory out of the search path.
    pub fn without_exec_dir(mut self) -> Self {
        self.exec_dir = ExecDir::Disabled;
        self
    }

    /// Resolves the directories that would be searched right now.
    pub fn search_path(&self) -> SearchPath {
        search_path(&self.exec_dir, &self.env)
    }

    /// Loads `file_name` from the search path into `target`.
    ///
    /// `target` is only written when at least one file contributed.
    pub fn load<T>(&self, file_name: &str, target: &mut T) -> Result<(), ConfigError>
    where
        T: Serialize + DeserializeOwned,
    {
        self.load_report(file_name, target).map(|_| ())
    }

    /// Like [`load`](Self::load), also reporting which files were used.
    pub fn load_report<T>(
        &self,
        file_name: &str,
        target: &mut T,
    ) -> Result<LoadReport, ConfigError>
    where
        T: Serialize + DeserializeOwned,
    {
        check_file_name(file_name)?;

        let mut merged = serde_json::to_value(&*target)?;
        if !merged.is_object() {
            return Err(ConfigError::TargetNotTable);
        }

        let mut report = LoadReport::default();
        let mut decoded = None;

        for dir in self.search_path() {
            let path = dir.join(file_name);
            match overlay::<T>(&merged, &path) {
                Ok((table, value)) => {
                    tracing::debug!(path = %path.display(), "loaded config file");
                    merged = table;
                    decoded = Some(value);
                    report.loaded.push(path);
                }
                Err(error) => {
                    match &error {
                        AttemptError::Missing => {
                            tracing::trace!(path = %path.display(), "config file not present");
                        }
                        error => {
                            tracing::warn!(path = %path.display(), %error, "skipping config file");
                        }
                    }
                    report.skipped.push(Attempt { path, error });
                }
            }
        }

        match decoded {
            Some(value) => {
                *target = value;
                Ok(report)
            }
            None => Err(ConfigError::NotFound(LoadFailure::new(
                file_name,
                report.skipped,
            ))),
        }
    }
}

/// Overlays the file at `path` onto a copy of `merged` and decodes the result.
///
/// The file only counts if the combined value still fits `T`.
fn overlay<T: DeserializeOwned>(
    merged: &Value,
    path: &Path,
) -> Result<(Value, T), AttemptError> {
    let table = read_table(path)?;
    let overlay = serde_json::to_value(table).map_err(AttemptError::Decode)?;

    let mut candidate = merged.clone();
    deep_merge(&mut candidate, overlay);

    let value = serde_json::from_value(candidate.clone()).map_err(AttemptError::Decode)?;
    Ok((candidate, value))
}

fn check_file_name(file_name: &str) -> Result<(), ConfigError> {
    let mut components = Path::new(file_name).components();
    match (components.next(), components.next()) {
        (Some(std::path::Component::Normal(name)), None) if name == file_name => Ok(()),
        _ => Err(ConfigError::InvalidFileName(file_name.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Opts {
        path: String,
        depth: i64,
    }

    fn write(dir: &Path, contents: &str) {
        std::fs::write(dir.join("app.toml"), contents).unwrap();
    }

    fn loader(exec_dir: &Path) -> Loader<HashMap<String, String>> {
        Loader::new()
            .with_env(HashMap::new())
            .with_exec_dir(exec_dir)
    }

    #[test]
    fn test_check_file_name() {
        assert!(check_file_name("app.toml").is_ok());
        assert!(check_file_name(".apprc").is_ok());
        for bad in ["", "conf/app.toml", "/app.toml", "..", ".", "./app.toml"] {
            assert!(
                matches!(check_file_name(bad), Err(ConfigError::InvalidFileName(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_invalid_file_name_visits_nothing() {
        let dir = TempDir::new().unwrap();
        let mut opts = Opts::default();
        let result = loader(dir.path()).load("sub/app.toml", &mut opts);
        assert!(matches!(result, Err(ConfigError::InvalidFileName(_))));
    }

    #[test]
    fn test_report_lists_loaded_and_skipped() {
        let exec = TempDir::new().unwrap();
        let home = TempDir::new().unwrap();
        write(home.path(), "path = \"/home\"\ndepth = 1");

        let mut env = HashMap::new();
        env.insert(
            "XDG_CONFIG_HOME".to_string(),
            home.path().to_string_lossy().into_owned(),
        );

        let mut opts = Opts::default();
        let report = loader(exec.path())
            .with_env(env)
            .load_report("app.toml", &mut opts)
            .unwrap();

        assert_eq!(report.loaded, vec![home.path().join("app.toml")]);
        assert_eq!(report.skipped.len(), 1);
        assert!(matches!(report.skipped[0].error, AttemptError::Missing));
        assert_eq!(
            opts,
            Opts {
                path: "/home".into(),
                depth: 1
            }
        );
    }

    #[test]
    fn test_non_table_target() {
        let dir = TempDir::new().unwrap();
        let mut value = 5i64;
        let result = loader(dir.path()).load("app.toml", &mut value);
        assert!(matches!(result, Err(ConfigError::TargetNotTable)));
    }

    #[test]
    fn test_unmentioned_u64_beyond_toml_range_survives() {
        #[derive(Debug, PartialEq, Serialize, Deserialize)]
        struct Limits {
            depth: i64,
            limit: u64,
        }

        let exec = TempDir::new().unwrap();
        write(exec.path(), "depth = 2");

        let mut limits = Limits {
            depth: 0,
            limit: u64::MAX,
        };
        loader(exec.path()).load("app.toml", &mut limits).unwrap();
        assert_eq!(
            limits,
            Limits {
                depth: 2,
                limit: u64::MAX
            }
        );
    }

    #[test]
    fn test_skipped_fields_reset_to_default_on_load() {
        #[derive(Debug, Serialize, Deserialize)]
        struct WithRuntime {
            depth: i64,
            #[serde(skip)]
            runtime: String,
        }

        let exec = TempDir::new().unwrap();
        let mut target = WithRuntime {
            depth: 0,
            runtime: "caller".into(),
        };

        // Nothing found: the target is untouched, runtime state included.
        let err = loader(exec.path()).load("app.toml", &mut target).unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(target.runtime, "caller");

        // Loaded: fields serde never sees come back as their default.
        write(exec.path(), "depth = 2");
        loader(exec.path()).load("app.toml", &mut target).unwrap();
        assert_eq!(target.depth, 2);
        assert_eq!(target.runtime, "");
    }

    #[test]
    fn test_wrongly_typed_file_is_skipped() {
        let exec = TempDir::new().unwrap();
        write(exec.path(), "depth = \"deep\"");

        let mut opts = Opts::default();
        let err = loader(exec.path()).load("app.toml", &mut opts).unwrap_err();

        let ConfigError::NotFound(failure) = &err else {
            panic!("expected NotFound, got {err:?}");
        };
        assert!(matches!(failure.attempts()[0].error, AttemptError::Decode(_)));
        assert_eq!(opts, Opts::default());
    }
}
