//! Branch descriptors.
//!
//! A [`BranchDescriptor`] names a local branch and, optionally, the remote it
//! tracks and the name of the branch on that remote. The sync engine builds
//! every ref and command argument from it, so names are checked before they
//! reach the command line.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A local branch and the remote branch it synchronizes with.
///
/// ```
/// use tether_core::BranchDescriptor;
///
/// let devel = BranchDescriptor::new("devel").unwrap().tracking("origin");
/// assert_eq!(devel.remote_ref().as_deref(), Some("origin/devel"));
///
/// let renamed = devel.with_remote_branch("main");
/// assert_eq!(renamed.remote_ref().as_deref(), Some("origin/main"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchDescriptor {
    /// Local branch name.
    pub name: String,

    /// Remote this branch tracks. Absent or empty means untracked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracks: Option<String>,

    /// Branch name on the remote, when it differs from `name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_branch: Option<String>,
}

impl BranchDescriptor {
    /// Describe an untracked local branch.
    ///
    /// # Errors
    /// Returns [`Error::InvalidBranchName`] if `name` is not usable on a git
    /// command line.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let descriptor = Self {
            name: name.into(),
            tracks: None,
            remote_branch: None,
        };
        descriptor.validate()?;
        Ok(descriptor)
    }

    /// Set the tracked remote.
    #[must_use]
    pub fn tracking(mut self, remote: impl Into<String>) -> Self {
        self.tracks = Some(remote.into());
        self
    }

    /// Override the branch name on the remote.
    #[must_use]
    pub fn with_remote_branch(mut self, remote_branch: impl Into<String>) -> Self {
        self.remote_branch = Some(remote_branch.into());
        self
    }

    /// The tracked remote, `None` if untracked.
    #[must_use]
    pub fn tracks(&self) -> Option<&str> {
        self.tracks.as_deref().filter(|t| !t.is_empty())
    }

    /// Branch name on the remote (defaults to the local name).
    #[must_use]
    pub fn remote_branch(&self) -> &str {
        self.remote_branch
            .as_deref()
            .filter(|b| !b.is_empty())
            .unwrap_or(&self.name)
    }

    /// `<remote>/<remote_branch>`, `None` if untracked.
    #[must_use]
    pub fn remote_ref(&self) -> Option<String> {
        self.tracks()
            .map(|remote| format!("{remote}/{}", self.remote_branch()))
    }

    /// `refs/remotes/<remote>/<remote_branch>`, `None` if untracked.
    #[must_use]
    pub fn remote_tracking_ref(&self) -> Option<String> {
        self.remote_ref().map(|r| format!("refs/remotes/{r}"))
    }

    /// `refs/heads/<name>`.
    #[must_use]
    pub fn local_ref(&self) -> String {
        format!("refs/heads/{}", self.name)
    }

    /// Check every name in the descriptor.
    ///
    /// # Errors
    /// Returns [`Error::InvalidBranchName`] for the first unusable name.
    pub fn validate(&self) -> Result<()> {
        validate_name(&self.name)?;
        if let Some(remote) = self.tracks() {
            validate_name(remote)?;
        }
        if let Some(remote_branch) = self.remote_branch.as_deref().filter(|b| !b.is_empty()) {
            validate_name(remote_branch)?;
        }
        Ok(())
    }
}

/// Reject names that git would refuse or that could be read as an option.
fn validate_name(name: &str) -> Result<()> {
    let reason = if name.is_empty() {
        Some("name cannot be empty".to_string())
    } else if name.starts_with('-') {
        Some("name cannot start with '-'".to_string())
    } else if name.contains("..") {
        Some("name cannot contain '..'".to_string())
    } else if name.starts_with('/') || name.ends_with('/') {
        Some("name cannot start or end with '/'".to_string())
    } else {
        name.chars()
            .find(|c| c.is_whitespace() || c.is_control() || matches!(c, '~' | '^' | ':' | '?' | '*' | '['))
            .map(|c| format!("name cannot contain {c:?}"))
    };

    match reason {
        Some(reason) => Err(Error::InvalidBranchName {
            name: name.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}
