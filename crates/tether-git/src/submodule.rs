//! Submodule detection and repair.

use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};
use crate::porcelain::Porcelain;
use crate::repository::RepositoryHandle;
use crate::runner::CommandRunner;

/// What to do when `git submodule status` reports a broken configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BrokenSubmodules {
    /// Fail with [`Error::BrokenSubmoduleConfiguration`].
    #[default]
    Raise,
    /// Return the diagnostic as text.
    Report,
}

impl<R: CommandRunner> RepositoryHandle<R> {
    /// Initialise and update all submodules, recursively.
    ///
    /// Returns `Ok(None)` when there is nothing to do or the update worked,
    /// and `Ok(Some(diagnostic))` when the update failed (or the configuration
    /// is broken and `policy` is [`BrokenSubmodules::Report`]).
    ///
    /// # Errors
    /// Returns [`Error::BrokenSubmoduleConfiguration`] under
    /// [`BrokenSubmodules::Raise`] when `.gitmodules` and the git metadata
    /// disagree.
    pub fn update_submodules(&self, policy: BrokenSubmodules) -> Result<Option<String>> {
        let status = self.run(Porcelain::Submodule, &["status"])?;
        if !status.success() {
            if policy == BrokenSubmodules::Raise {
                return Err(Error::BrokenSubmoduleConfiguration {
                    path: self.workdir().to_path_buf(),
                    output: status.output,
                });
            }
            return Ok(Some(format!(
                "Broken submodules configuration detected for {}\ngit status returned {}",
                self.workdir().display(),
                status.output
            )));
        }
        if status.output.is_empty() {
            return Ok(None);
        }

        let update = self.run(Porcelain::Submodule, &["update", "--init", "--recursive"])?;
        if update.success() {
            Ok(None)
        } else {
            Ok(Some(format!("Failed to update submodules\n{}", update.output)))
        }
    }

    /// Paths of the submodules registered in this repository.
    ///
    /// `Ok(None)` when the listing itself failed.
    ///
    /// # Errors
    /// Returns error only if git could not be run.
    pub fn submodule_paths(&self) -> Result<Option<Vec<String>>> {
        let result = self.run(Porcelain::Submodule, &[])?;
        if !result.success() {
            tracing::warn!(
                repo = %self.workdir().display(),
                "git submodules configuration is broken: {}",
                result.output
            );
            return Ok(None);
        }
        Ok(Some(
            result
                .output
                .lines()
                .filter_map(|line| line.split_whitespace().nth(1))
                .map(str::to_string)
                .collect(),
        ))
    }
}

/// Root of the work tree containing `path`, `None` outside any work tree.
///
/// # Errors
/// Returns error only if git could not be run.
pub fn repo_root<R: CommandRunner>(runner: &R, path: &Path) -> Result<Option<PathBuf>> {
    let dir = if path.is_file() {
        path.parent().unwrap_or(path)
    } else {
        path
    };
    if !dir.is_dir() {
        return Ok(None);
    }
    let result = runner.run(dir, &["rev-parse", "--show-toplevel"])?;
    Ok(result
        .success()
        .then(|| PathBuf::from(result.output.trim())))
}

/// Whether `path` is the root of a git work tree.
///
/// # Errors
/// Returns error only if git could not be run.
pub fn is_git<R: CommandRunner>(runner: &R, path: &Path) -> Result<bool> {
    let Some(root) = repo_root(runner, path)? else {
        return Ok(false);
    };
    Ok(same_path(&root, path))
}

/// Whether `path` is a submodule of the repository containing it.
///
/// An initialised submodule has a `.git` file (gitlink); a directory with its
/// own `.git` directory is an independent repository. Uninitialised
/// submodules are empty directories, so those, and anything else without a
/// gitlink, are looked up in the parent's submodule listing. A parent whose
/// listing fails counts the path as a submodule.
///
/// # Errors
/// Returns error if the directory cannot be read or git could not be run.
pub fn is_submodule<R: CommandRunner>(runner: &R, path: &Path) -> Result<bool> {
    // A relative `vendor` has an empty parent; anchor it to the cwd first.
    let path = &std::path::absolute(path)?;
    if !path.is_dir() {
        return Ok(false);
    }

    let is_empty = fs::read_dir(path)?.next().is_none();
    let parent_root = if is_empty {
        repo_root(runner, path)?
    } else {
        let dot_git = path.join(".git");
        if dot_git.is_dir() {
            return Ok(false);
        }
        if dot_git.is_file() {
            return Ok(true);
        }
        match path.parent() {
            Some(parent) => repo_root(runner, parent)?,
            None => None,
        }
    };

    let Some(parent_root) = parent_root else {
        return Ok(false);
    };
    let parent = RepositoryHandle::with_runner(&parent_root, runner);
    let Some(listing) = parent.submodule_paths()? else {
        return Ok(true);
    };
    let Some(relative) = relative_to(path, &parent_root) else {
        return Ok(false);
    };
    Ok(listing.iter().any(|p| *p == relative))
}

/// `path` relative to `root`, with `/` separators.
fn relative_to(path: &Path, root: &Path) -> Option<String> {
    let path = path.canonicalize().ok()?;
    let root = root.canonicalize().ok()?;
    let rel = path.strip_prefix(&root).ok()?;
    let parts: Vec<String> = rel
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    Some(parts.join("/"))
}

fn same_path(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
