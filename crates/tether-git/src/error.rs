//! Error types for tether-git.

use std::path::PathBuf;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while driving the git executable.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The git executable could not be located.
    #[error("executable not found: {name}")]
    ExecutableNotFound {
        /// Name or path that was searched for.
        name: String,
        /// Why the search failed.
        #[source]
        source: which::Error,
    },

    /// A strict command exited with a nonzero status.
    #[error("`{command}` failed with exit code {code}\n{output}")]
    CommandFailed {
        /// The command line, for display.
        command: String,
        /// Exit code of the process.
        code: i32,
        /// Combined stdout/stderr.
        output: String,
    },

    /// `git submodule status` failed: `.gitmodules` and the git metadata disagree.
    #[error("broken submodules configuration detected for {}\n{output}", path.display())]
    BrokenSubmoduleConfiguration {
        /// Working tree of the parent repository.
        path: PathBuf,
        /// Output of the status command.
        output: String,
    },

    /// At least one command issued inside a transaction failed.
    #[error("transaction failed:\n{0}")]
    TransactionFailed(String),

    /// The repository has no commits yet.
    #[error("repo in {} has no commit yet", .0.display())]
    NoCommits(PathBuf),

    /// A passthrough verb outside the porcelain allow-list.
    #[error("unsupported git subcommand: {0}")]
    UnsupportedSubcommand(String),

    /// A string that is not a valid object hash.
    #[error("invalid sha: {0:?}")]
    InvalidSha(String),

    /// The process could not be started.
    #[error("failed to spawn {}: {source}", program.display())]
    Spawn {
        /// Path of the executable.
        program: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
