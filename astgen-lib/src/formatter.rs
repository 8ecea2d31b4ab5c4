//! This module finds and runs an external source formatter over the generated files.
//!
//! Formatting is best-effort. A missing formatter, or one that fails, never fails the run.

use crate::driver::GeneratedFiles;
use std::{
    env,
    ffi::OsString,
    path::{Path, PathBuf},
    process::Command,
};
use tracing::{debug, instrument, warn};

/// The environment variable holding an explicit path to the formatter.
pub const FORMATTER_ENV_VAR: &str = "CLANG_FORMAT";

/// The name of the formatter to look for on the `PATH`.
pub const FORMATTER_NAME: &str = "clang-format";

/// An external formatter that rewrites files in place.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Formatter {
    /// The path to the formatter executable.
    path: PathBuf,
}

impl Formatter {
    /// Use the formatter at the given path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The path to the formatter executable.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Find a formatter from `$CLANG_FORMAT`, or failing that, by searching the `PATH`.
    pub fn from_env() -> Option<Self> {
        Self::discover(env::var_os(FORMATTER_ENV_VAR), env::var_os("PATH"))
    }

    /// Find a formatter, preferring the explicit path over searching the given search path.
    fn discover(explicit: Option<OsString>, search_path: Option<OsString>) -> Option<Self> {
        if let Some(path) = explicit.filter(|path| !path.is_empty()) {
            debug!(?path, "Using formatter from ${FORMATTER_ENV_VAR}");
            return Some(Self::new(path));
        }

        let executable = format!("{FORMATTER_NAME}{}", env::consts::EXE_SUFFIX);
        let found = env::split_paths(&search_path?)
            .map(|dir| dir.join(&executable))
            .find(|candidate| is_executable(candidate))?;

        debug!(path = ?found, "Found formatter on the PATH");
        Some(Self::new(found))
    }

    /// Format both generated files in place.
    #[instrument(skip(self), fields(formatter = ?self.path))]
    pub fn format(&self, files: &GeneratedFiles) {
        let status = Command::new(&self.path)
            .arg("-i")
            .arg(&files.declarations)
            .arg(&files.definitions)
            .status();

        match status {
            Ok(status) if status.success() => debug!("Formatted generated files"),
            Ok(status) => warn!(%status, "Formatter failed, leaving files unformatted"),
            Err(error) => warn!(%error, "Couldn't run formatter, leaving files unformatted"),
        }
    }
}

/// Is there an executable file at this path?
#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .is_ok_and(|metadata| metadata.is_file() && metadata.permissions().mode() & 0o111 != 0)
}

/// Is there an executable file at this path?
#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
