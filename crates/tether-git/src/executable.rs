//! Discovery of the git executable.
//!
//! The executable is resolved once, by whoever starts the program, and the
//! resulting [`GitExecutable`] is handed to every [`ProcessRunner`] that needs
//! it. There is no process-wide cache: cloning the value is the memoization.
//!
//! [`ProcessRunner`]: crate::ProcessRunner

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Resolved path to a git executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitExecutable {
    path: PathBuf,
}

impl GitExecutable {
    /// Locate `git` on the `PATH`.
    ///
    /// # Errors
    /// Returns [`Error::ExecutableNotFound`] if no executable named `git` exists.
    pub fn discover() -> Result<Self> {
        Self::find("git")
    }

    /// Locate an executable by name, or validate an explicit path.
    ///
    /// Names containing a path separator are checked in place; bare names are
    /// searched for on the `PATH`.
    ///
    /// # Errors
    /// Returns [`Error::ExecutableNotFound`] if the lookup fails.
    pub fn find(name: impl AsRef<OsStr>) -> Result<Self> {
        let name = name.as_ref();
        let path = which::which(name).map_err(|source| Error::ExecutableNotFound {
            name: name.to_string_lossy().into_owned(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "resolved git executable");
        Ok(Self { path })
    }

    /// Locate an executable using an explicit search path instead of `PATH`.
    ///
    /// # Errors
    /// Returns [`Error::ExecutableNotFound`] if the lookup fails.
    pub fn find_in(
        name: impl AsRef<OsStr>,
        search_path: impl AsRef<OsStr>,
        cwd: impl AsRef<Path>,
    ) -> Result<Self> {
        let name = name.as_ref();
        let path = which::which_in(name, Some(search_path), cwd).map_err(|source| {
            Error::ExecutableNotFound {
                name: name.to_string_lossy().into_owned(),
                source,
            }
        })?;
        Ok(Self { path })
    }

    /// Path of the executable.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AsRef<OsStr> for GitExecutable {
    fn as_ref(&self) -> &OsStr {
        self.path.as_os_str()
    }
}
