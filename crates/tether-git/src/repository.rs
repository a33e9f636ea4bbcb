//! Repository handle providing high-level git operations.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::executable::GitExecutable;
use crate::porcelain::Porcelain;
use crate::runner::{CommandResult, CommandRunner, ProcessRunner, display_command};
use crate::transaction::{ActiveTransaction, Transaction};

/// Result of checking the working tree before a destructive operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorktreeCheck {
    /// No unstaged or staged-but-uncommitted changes.
    Clean,
    /// The tree has local modifications; `reason` is meant for the user.
    Dirty {
        /// Human-readable description of what is dirty.
        reason: String,
    },
}

impl WorktreeCheck {
    /// Whether the tree is clean.
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        matches!(self, Self::Clean)
    }
}

/// A git working tree bound to a command runner.
///
/// Every command runs with the working tree as its current directory. A
/// handle executes one command at a time; drive several repositories with
/// several handles.
pub struct RepositoryHandle<R: CommandRunner = ProcessRunner> {
    workdir: PathBuf,
    runner: R,
}

impl RepositoryHandle<ProcessRunner> {
    /// Bind a handle to `workdir`, spawning the given git executable.
    ///
    /// The path does not need to exist yet (see [`RepositoryHandle::clone_remote`]).
    pub fn open(workdir: impl Into<PathBuf>, git: GitExecutable) -> Self {
        Self::with_runner(workdir, ProcessRunner::new(git))
    }
}

impl<R: CommandRunner> RepositoryHandle<R> {
    /// Bind a handle to `workdir` using an arbitrary runner.
    pub fn with_runner(workdir: impl Into<PathBuf>, runner: R) -> Self {
        Self {
            workdir: workdir.into(),
            runner,
        }
    }

    /// The working tree this handle operates on.
    #[must_use]
    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// The runner commands are issued through.
    #[must_use]
    pub const fn runner(&self) -> &R {
        &self.runner
    }

    // === Command execution ===

    /// Run `git <args>` in the working tree. A nonzero exit is returned, not raised.
    ///
    /// # Errors
    /// Returns error only if the process could not be run.
    pub fn call(&self, args: &[&str]) -> Result<CommandResult> {
        self.runner.run(&self.workdir, args)
    }

    /// Run `git <args>` in the working tree and fail on a nonzero exit.
    ///
    /// Returns the command output on success.
    ///
    /// # Errors
    /// Returns [`Error::CommandFailed`] on a nonzero exit.
    pub fn call_checked(&self, args: &[&str]) -> Result<String> {
        let result = self.call(args)?;
        if result.success() {
            Ok(result.output)
        } else {
            Err(Error::CommandFailed {
                command: display_command(args),
                code: result.code,
                output: result.output,
            })
        }
    }

    /// Run an allow-listed porcelain command in soft mode.
    ///
    /// # Errors
    /// Returns error only if the process could not be run.
    pub fn run(&self, verb: Porcelain, args: &[&str]) -> Result<CommandResult> {
        self.call(&with_verb(verb, args))
    }

    /// Run an allow-listed porcelain command in strict mode.
    ///
    /// # Errors
    /// Returns [`Error::CommandFailed`] on a nonzero exit.
    pub fn run_checked(&self, verb: Porcelain, args: &[&str]) -> Result<String> {
        self.call_checked(&with_verb(verb, args))
    }

    // === Transactions ===

    /// Open a transaction on this handle.
    ///
    /// The handle stays borrowed until the returned guard is finished or
    /// dropped, so at most one transaction is active at a time.
    pub fn begin(&mut self) -> ActiveTransaction<'_, R> {
        ActiveTransaction::new(self)
    }

    /// Run `f` inside a transaction and return the transaction with `f`'s value.
    pub fn transaction<T>(
        &mut self,
        f: impl FnOnce(&mut ActiveTransaction<'_, R>) -> T,
    ) -> (Transaction, T) {
        let mut tx = self.begin();
        let value = f(&mut tx);
        (tx.finish(), value)
    }

    // === Configuration ===

    /// Read a config value, `None` if unset.
    ///
    /// # Errors
    /// Returns error only if git could not be run.
    pub fn get_config(&self, name: &str) -> Result<Option<String>> {
        let result = self.run(Porcelain::Config, &["--get", name])?;
        Ok(result
            .success()
            .then(|| result.output.trim().to_string()))
    }

    /// Set a config value, creating it if needed.
    ///
    /// # Errors
    /// Returns [`Error::CommandFailed`] if git rejects the value.
    pub fn set_config(&self, name: &str, value: &str) -> Result<()> {
        self.run_checked(Porcelain::Config, &[name, value])?;
        Ok(())
    }

    /// Point remote `name` at `url`, replacing any previous definition.
    ///
    /// # Errors
    /// Returns [`Error::CommandFailed`] if the remote cannot be added.
    pub fn set_remote(&self, name: &str, url: &str) -> Result<()> {
        if self.get_config(&format!("remote.{name}.url"))?.as_deref() == Some(url) {
            return Ok(());
        }
        self.run(Porcelain::Remote, &["rm", name])?;
        self.run_checked(Porcelain::Remote, &["add", name, url])?;
        Ok(())
    }

    /// Configure `branch` to track `remote_name/remote_branch`.
    ///
    /// `remote_branch` defaults to `branch`. The branch is created at HEAD if
    /// it does not exist.
    ///
    /// # Errors
    /// Returns [`Error::NoCommits`] on a repository without commits, or
    /// [`Error::CommandFailed`] if branch creation or config writes fail.
    pub fn set_tracking_branch(
        &self,
        branch: &str,
        remote_name: &str,
        remote_branch: Option<&str>,
    ) -> Result<()> {
        let remote_branch = remote_branch.unwrap_or(branch);
        if self.is_empty()? {
            return Err(Error::NoCommits(self.workdir.clone()));
        }
        if !self.branch_exists(branch)? {
            self.run_checked(Porcelain::Branch, &[branch])?;
        }
        self.set_config(&format!("branch.{branch}.remote"), remote_name)?;
        self.set_config(
            &format!("branch.{branch}.merge"),
            &format!("refs/heads/{remote_branch}"),
        )?;
        Ok(())
    }

    // === Clone ===

    /// Clone `url` into this handle's working tree.
    ///
    /// Runs from the parent directory, which is created if missing. `extra`
    /// goes before the url (e.g. `["--branch", "devel"]`).
    ///
    /// # Errors
    /// Returns [`Error::CommandFailed`] if the clone fails.
    pub fn clone_remote(&self, url: &str, extra: &[&str]) -> Result<()> {
        let parent = match self.workdir.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let target = self.workdir.file_name().ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("cannot clone into {}", self.workdir.display()),
            )
        })?;
        let target = target.to_string_lossy();
        fs::create_dir_all(&parent)?;

        let mut args = vec!["clone"];
        args.extend_from_slice(extra);
        args.push(url);
        args.push(&*target);

        let result = self.runner.run(&parent, &args)?;
        if result.success() {
            Ok(())
        } else {
            Err(Error::CommandFailed {
                command: display_command(&args),
                code: result.code,
                output: result.output,
            })
        }
    }

    // === Working tree state ===

    /// Whether the working tree is a valid git work tree.
    ///
    /// # Errors
    /// Returns error only if git could not be run.
    pub fn is_valid(&self) -> Result<bool> {
        if !self.workdir.is_dir() {
            return Ok(false);
        }
        Ok(self
            .call(&["rev-parse", "--is-inside-work-tree"])?
            .success())
    }

    /// Whether the repository has no commits yet.
    ///
    /// # Errors
    /// Returns error only if git could not be run.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(!self.call(&["rev-parse", "--verify", "HEAD"])?.success())
    }

    /// Check for unstaged changes and for staged changes not yet committed.
    ///
    /// Submodule state is ignored.
    ///
    /// # Errors
    /// Returns error only if git could not be run.
    pub fn require_clean_worktree(&self) -> Result<WorktreeCheck> {
        self.call(&["update-index", "-q", "--ignore-submodules", "--refresh"])?;
        let unstaged = !self
            .call(&["diff-files", "--quiet", "--ignore-submodules"])?
            .success();
        let staged = !self
            .call(&["diff-index", "--cached", "--quiet", "--ignore-submodules", "HEAD"])?
            .success();

        let reason = match (unstaged, staged) {
            (false, false) => return Ok(WorktreeCheck::Clean),
            (true, false) => "You have unstaged changes".to_string(),
            (false, true) => "Your index contains uncommitted changes".to_string(),
            (true, true) => {
                "You have unstaged changes. Additionally, your index contains uncommitted changes"
                    .to_string()
            }
        };
        Ok(WorktreeCheck::Dirty { reason })
    }

    /// `git status --porcelain` output, `None` if status failed.
    ///
    /// # Errors
    /// Returns error only if git could not be run.
    pub fn status_porcelain(&self, untracked: bool) -> Result<Option<String>> {
        let result = if untracked {
            self.run(Porcelain::Status, &["--porcelain"])?
        } else {
            self.run(Porcelain::Status, &["--porcelain", "--untracked-files=no"])?
        };
        Ok(result.success().then_some(result.output))
    }

    /// Whether `git status` reports nothing.
    ///
    /// With `untracked == false`, untracked files do not count. `None` if
    /// status failed.
    ///
    /// # Errors
    /// Returns error only if git could not be run.
    pub fn is_clean(&self, untracked: bool) -> Result<Option<bool>> {
        Ok(self
            .status_porcelain(untracked)?
            .map(|out| out.lines().all(|l| l.trim().is_empty())))
    }
}

pub(crate) fn with_verb<'a>(verb: Porcelain, args: &[&'a str]) -> Vec<&'a str> {
    std::iter::once(verb.as_str())
        .chain(args.iter().copied())
        .collect()
}

impl<R: CommandRunner> std::fmt::Debug for RepositoryHandle<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepositoryHandle")
            .field("workdir", &self.workdir)
            .finish_non_exhaustive()
    }
}
