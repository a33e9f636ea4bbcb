//! Error types for tether-core.

use std::path::PathBuf;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in tether-core operations.
///
/// Ordinary git failures during a sync never show up here; they become a
/// [`SyncOutcome`](crate::SyncOutcome). What remains are infrastructure
/// failures and precondition violations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid branch name.
    #[error("invalid branch name '{name}': {reason}")]
    InvalidBranchName {
        /// The invalid name.
        name: String,
        /// Why the name is invalid.
        reason: String,
    },

    /// Config file parsing error.
    #[error("failed to parse {}: {message}", file.display())]
    ConfigParse { file: PathBuf, message: String },

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Git operation error.
    #[error("git error: {0}")]
    Git(#[from] tether_git::Error),
}
