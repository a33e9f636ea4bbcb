//! Fail-fast command sequences.
//!
//! A transaction is opened with [`RepositoryHandle::begin`] (or the scoped
//! [`RepositoryHandle::transaction`]). Every command issued through the
//! returned [`ActiveTransaction`] runs in soft mode; the first nonzero exit
//! marks the transaction failed and every later command is skipped without
//! spawning a process.
//!
//! The guard borrows the handle mutably, so a second transaction cannot be
//! opened on the same handle while one is active, and the handle is unbound
//! again as soon as the guard goes away, whichever path leaves the scope.

use crate::error::{Error, Result};
use crate::porcelain::Porcelain;
use crate::repository::{RepositoryHandle, with_verb};
use crate::runner::{CommandResult, CommandRunner, display_command};

/// Outcome flag and diagnostic log shared by a sequence of commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    ok: bool,
    output: String,
}

impl Default for Transaction {
    fn default() -> Self {
        Self {
            ok: true,
            output: String::new(),
        }
    }
}

impl Transaction {
    /// Whether every command so far succeeded (or a failure was compensated).
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.ok
    }

    /// Accumulated `"<command> failed\n<output>"` entries.
    #[must_use]
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Convert into a `Result`, yielding the diagnostic log either way.
    ///
    /// # Errors
    /// Returns [`Error::TransactionFailed`] carrying the log if the
    /// transaction is not ok.
    pub fn into_result(self) -> Result<String> {
        if self.ok {
            Ok(self.output)
        } else {
            Err(Error::TransactionFailed(self.output))
        }
    }

    fn record_failure(&mut self, args: &[&str], output: &str) {
        self.ok = false;
        if !self.output.is_empty() {
            self.output.push('\n');
        }
        self.output.push_str(&display_command(args));
        self.output.push_str(" failed\n");
        self.output.push_str(output);
    }
}

/// A transaction bound to a repository handle.
#[derive(Debug)]
pub struct ActiveTransaction<'a, R: CommandRunner> {
    repo: &'a RepositoryHandle<R>,
    state: Transaction,
}

impl<'a, R: CommandRunner> ActiveTransaction<'a, R> {
    pub(crate) fn new(repo: &'a RepositoryHandle<R>) -> Self {
        Self {
            repo,
            state: Transaction::default(),
        }
    }

    /// Issue `git <args>` as part of the transaction.
    ///
    /// Returns `Ok(None)` without running anything once the transaction has
    /// failed.
    ///
    /// # Errors
    /// Returns an error only if the process could not be run at all.
    pub fn call(&mut self, args: &[&str]) -> Result<Option<CommandResult>> {
        if !self.state.ok {
            tracing::debug!("transaction failed, skipping {}", display_command(args));
            return Ok(None);
        }

        let result = self.repo.call(args)?;
        if !result.success() {
            self.state.record_failure(args, &result.output);
        }
        Ok(Some(result))
    }

    /// Issue an allow-listed porcelain command as part of the transaction.
    ///
    /// # Errors
    /// Returns an error only if the process could not be run at all.
    pub fn run(&mut self, verb: Porcelain, args: &[&str]) -> Result<Option<CommandResult>> {
        self.call(&with_verb(verb, args))
    }

    /// Whether every command so far succeeded.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.state.ok
    }

    /// Accumulated diagnostic log.
    #[must_use]
    pub fn output(&self) -> &str {
        &self.state.output
    }

    /// Mark the transaction ok again so a compensating command can run.
    ///
    /// The diagnostic log is kept.
    pub const fn restore(&mut self) {
        self.state.ok = true;
    }

    /// Release the handle and hand back the transaction value.
    #[must_use]
    pub fn finish(self) -> Transaction {
        self.state
    }
}
