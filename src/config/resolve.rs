//! Search path resolution.
//!
//! Directories are ordered lowest precedence first:
//!
//! 1. the directory holding the running executable
//! 2. `XDG_CONFIG_DIRS`, reversed so its first entry ranks highest
//! 3. `XDG_CONFIG_HOME`, or `$HOME/.config` when unset
//!
//! Nothing here touches the filesystem beyond locating the executable.

use std::path::{Path, PathBuf};

use super::env::{Environment, CONFIG_DIRS, CONFIG_HOME};

/// Ordered candidate directories, lowest precedence first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPath {
    dirs: Vec<PathBuf>,
}

impl SearchPath {
    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    pub fn len(&self) -> usize {
        self.dirs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PathBuf> {
        self.dirs.iter()
    }

    fn push_tier(&mut self, dirs: impl IntoIterator<Item = PathBuf>) {
        self.dirs
            .extend(dirs.into_iter().filter(|d| !d.as_os_str().is_empty()));
    }
}

impl<'a> IntoIterator for &'a SearchPath {
    type Item = &'a PathBuf;
    type IntoIter = std::slice::Iter<'a, PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.dirs.iter()
    }
}

impl IntoIterator for SearchPath {
    type Item = PathBuf;
    type IntoIter = std::vec::IntoIter<PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.dirs.into_iter()
    }
}

/// Where the executable-relative tier comes from.
#[derive(Debug, Clone, Default)]
pub(crate) enum ExecDir {
    #[default]
    Detect,
    Fixed(PathBuf),
    Disabled,
}

impl ExecDir {
    fn resolve(&self) -> Option<PathBuf> {
        match self {
            ExecDir::Detect => current_exe_dir(),
            ExecDir::Fixed(dir) => Some(dir.clone()),
            ExecDir::Disabled => None,
        }
    }
}

fn current_exe_dir() -> Option<PathBuf> {
    match std::env::current_exe() {
        Ok(exe) => exe.parent().map(Path::to_path_buf),
        Err(e) => {
            tracing::warn!(error = %e, "could not determine executable directory");
            None
        }
    }
}

/// Builds the search path from an executable directory and an environment.
pub(crate) fn search_path(exec_dir: &ExecDir, env: &impl Environment) -> SearchPath {
    let mut path = SearchPath::default();

    path.push_tier(exec_dir.resolve());

    let mut system = CONFIG_DIRS.resolve(env);
    system.reverse();
    path.push_tier(system);

    path.push_tier(CONFIG_HOME.resolve(env));

    tracing::debug!(dirs = ?path.dirs, "resolved config search path");
    path
}
