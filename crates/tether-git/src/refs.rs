//! Ref resolution and ancestry queries.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::porcelain::Porcelain;
use crate::repository::RepositoryHandle;
use crate::runner::CommandRunner;

/// A full object hash, as printed by `git show-ref --hash`.
///
/// Accepts 40 (SHA-1) or 64 (SHA-256) lowercase or uppercase hex digits;
/// stored lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RefSha(String);

impl RefSha {
    /// Validate and wrap a hash.
    ///
    /// # Errors
    /// Returns [`Error::InvalidSha`] if `sha` is not 40 or 64 hex digits.
    pub fn new(sha: impl Into<String>) -> Result<Self> {
        let sha = sha.into();
        let valid = matches!(sha.len(), 40 | 64) && sha.bytes().all(|b| b.is_ascii_hexdigit());
        if valid {
            Ok(Self(sha.to_ascii_lowercase()))
        } else {
            Err(Error::InvalidSha(sha))
        }
    }

    /// The hash as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First eight characters, for messages.
    #[must_use]
    pub fn short(&self) -> &str {
        &self.0[..8]
    }
}

impl FromStr for RefSha {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl AsRef<str> for RefSha {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RefSha {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whether a local commit can be fast-forwarded to a remote one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FastForward {
    /// The local commit is an ancestor of the remote commit.
    Yes,
    /// The histories diverged.
    No,
    /// The merge base could not be computed (e.g. unrelated histories).
    Indeterminate {
        /// What git said.
        diagnostic: String,
    },
}

impl<R: CommandRunner> RepositoryHandle<R> {
    /// Resolve a full ref name (`refs/heads/main`) to its hash.
    ///
    /// An unknown ref is `Ok(None)`, not an error.
    ///
    /// # Errors
    /// Returns error only if git could not be run.
    pub fn resolve_sha(&self, reference: &str) -> Result<Option<RefSha>> {
        let result = self.call(&["show-ref", "--verify", "--hash", reference])?;
        if !result.success() {
            return Ok(None);
        }
        match RefSha::new(result.output.trim()) {
            Ok(sha) => Ok(Some(sha)),
            Err(_) => {
                tracing::warn!(reference, output = %result.output, "unexpected show-ref output");
                Ok(None)
            }
        }
    }

    /// Check whether `local` can be fast-forwarded to `remote`.
    ///
    /// # Errors
    /// Returns error only if git could not be run.
    pub fn is_fast_forward(&self, local: &RefSha, remote: &RefSha) -> Result<FastForward> {
        let result = self.call(&["merge-base", local.as_str(), remote.as_str()])?;
        if !result.success() {
            tracing::error!(output = %result.output, "calling merge-base failed");
            return Ok(FastForward::Indeterminate {
                diagnostic: format!("Calling merge-base failed\n{}", result.output),
            });
        }

        if result.output.trim() == local.as_str() {
            Ok(FastForward::Yes)
        } else {
            Ok(FastForward::No)
        }
    }

    /// Full name of the ref `HEAD` points to, `None` when detached.
    ///
    /// # Errors
    /// Returns error only if git could not be run.
    pub fn current_ref(&self) -> Result<Option<String>> {
        let result = self.call(&["symbolic-ref", "HEAD"])?;
        if !result.success() {
            return Ok(None);
        }
        Ok(result.output.lines().next().map(str::to_string))
    }

    /// Name of the checked-out branch, `None` when detached.
    ///
    /// # Errors
    /// Returns error only if git could not be run.
    pub fn current_branch(&self) -> Result<Option<String>> {
        Ok(self.current_ref()?.map(|r| {
            r.strip_prefix("refs/heads/")
                .map_or_else(|| r.clone(), str::to_string)
        }))
    }

    /// The `remote/branch` that `branch` (or the current branch) tracks.
    ///
    /// # Errors
    /// Returns error only if git could not be run.
    pub fn tracking_branch(&self, branch: Option<&str>) -> Result<Option<String>> {
        let branch = match branch {
            Some(b) => b.to_string(),
            None => match self.current_branch()? {
                Some(b) => b,
                None => return Ok(None),
            },
        };

        let Some(remote) = self.get_config(&format!("branch.{branch}.remote"))? else {
            return Ok(None);
        };
        let Some(merge) = self.get_config(&format!("branch.{branch}.merge"))? else {
            return Ok(None);
        };
        let merge = merge.strip_prefix("refs/heads/").unwrap_or(&merge);
        Ok(Some(format!("{remote}/{merge}")))
    }

    /// Whether a local branch exists.
    ///
    /// # Errors
    /// Returns error only if git could not be run.
    pub fn branch_exists(&self, name: &str) -> Result<bool> {
        Ok(self
            .call(&["show-ref", "--verify", &format!("refs/heads/{name}")])?
            .success())
    }

    /// Names of all local branches.
    ///
    /// # Errors
    /// Returns [`Error::CommandFailed`] if branches cannot be listed.
    pub fn local_branches(&self) -> Result<Vec<String>> {
        let out = self.run_checked(Porcelain::Branch, &["--no-color"])?;
        Ok(out
            .lines()
            .filter(|l| l.len() > 2)
            .map(|l| l[2..].to_string())
            .collect())
    }
}
