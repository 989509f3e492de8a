//! Environment lookup and the environment-derived directory tiers.

use std::collections::{BTreeMap, HashMap};
use std::ffi::{OsStr, OsString};
use std::path::PathBuf;

/// System-wide config search path, a platform path list.
pub const XDG_CONFIG_DIRS: &str = "XDG_CONFIG_DIRS";

/// User-specific config directory.
pub const XDG_CONFIG_HOME: &str = "XDG_CONFIG_HOME";

/// Read-only access to environment variables.
///
/// The loader never touches `std::env` directly; everything goes through this
/// trait so callers can resolve against a fixed set of variables.
pub trait Environment {
    /// Returns the value of `key`, or `None` if it is unset.
    ///
    /// Values are paths, so they need not be valid Unicode.
    fn var(&self, key: &str) -> Option<OsString>;
}

/// The environment of the current process.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl Environment for ProcessEnv {
    fn var(&self, key: &str) -> Option<OsString> {
        std::env::var_os(key)
    }
}

impl Environment for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<OsString> {
        self.get(key).map(OsString::from)
    }
}

impl Environment for HashMap<OsString, OsString> {
    fn var(&self, key: &str) -> Option<OsString> {
        self.get(OsStr::new(key)).cloned()
    }
}

impl Environment for BTreeMap<String, String> {
    fn var(&self, key: &str) -> Option<OsString> {
        self.get(key).map(OsString::from)
    }
}

impl<E: Environment + ?Sized> Environment for &E {
    fn var(&self, key: &str) -> Option<OsString> {
        (**self).var(key)
    }
}

/// How one precedence tier is read from the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvDirSpec {
    pub variable: &'static str,
    /// Template used when the variable is unset or empty. `$VAR` and
    /// `${VAR}` references are expanded against the same environment.
    pub default: Option<&'static str>,
    /// Whether the value is a path list rather than a single directory.
    pub list: bool,
}

pub const CONFIG_DIRS: EnvDirSpec = EnvDirSpec {
    variable: XDG_CONFIG_DIRS,
    default: None,
    list: true,
};

pub const CONFIG_HOME: EnvDirSpec = EnvDirSpec {
    variable: XDG_CONFIG_HOME,
    default: Some("$HOME/.config"),
    list: false,
};

impl EnvDirSpec {
    /// Resolves the tier to zero or more directories, in the order the
    /// environment lists them. Empty entries are dropped.
    ///
    /// When the variable is unset or empty the default template is used. A
    /// template naming an unset or empty variable (`$HOME` with no `HOME`) is
    /// not expanded to a partial path such as `/.config`; the tier then
    /// contributes no directories at all.
    pub fn resolve(&self, env: &impl Environment) -> Vec<PathBuf> {
        let value = match env.var(self.variable).filter(|v| !v.is_empty()) {
            Some(value) => value,
            None => match self.default.and_then(|template| expand(template, env)) {
                Some(value) => value,
                None => {
                    if let Some(template) = self.default {
                        tracing::debug!(
                            variable = self.variable,
                            template,
                            "default config directory could not be expanded"
                        );
                    }
                    return Vec::new();
                }
            },
        };

        if self.list {
            std::env::split_paths(&value)
                .filter(|p| !p.as_os_str().is_empty())
                .collect()
        } else {
            vec![PathBuf::from(value)]
        }
    }
}

/// Expands `$VAR` and `${VAR}` references in `template`.
///
/// Returns `None` if any referenced variable is unset or empty, or if a
/// `${` is never closed. A `$` not followed by a name is kept literally.
pub fn expand(template: &str, env: &impl Environment) -> Option<OsString> {
    let mut result = OsString::with_capacity(template.len());
    let mut buf = [0u8; 4];
    let mut chars = template.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '$' {
            result.push(ch.encode_utf8(&mut buf));
            continue;
        }

        let name = match chars.peek() {
            Some('{') => {
                chars.next();
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(c) => name.push(c),
                        None => return None,
                    }
                }
                name
            }
            Some(c) if is_name_char(*c) => {
                let mut name = String::new();
                while let Some(&c) = chars.peek() {
                    if !is_name_char(c) {
                        break;
                    }
                    name.push(c);
                    chars.next();
                }
                name
            }
            _ => {
                result.push("$");
                continue;
            }
        };

        let value = env.var(&name).filter(|v| !v.is_empty())?;
        result.push(value);
    }

    Some(result)
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
