//! # tether-git
//!
//! Transactional control over a git working tree through the `git`
//! executable. Provides the command runner, fail-fast transactions, ref and
//! ancestry queries, and submodule repair used by the Tether sync engine.

mod error;
mod executable;
mod porcelain;
mod refs;
mod repository;
mod runner;
mod submodule;
mod transaction;
mod url;

pub use error::{Error, Result};
pub use executable::GitExecutable;
pub use porcelain::Porcelain;
pub use refs::{FastForward, RefSha};
pub use repository::{RepositoryHandle, WorktreeCheck};
pub use runner::{CommandResult, CommandRunner, ProcessRunner};
pub use submodule::{BrokenSubmodules, is_git, is_submodule, repo_root};
pub use transaction::{ActiveTransaction, Transaction};
pub use url::name_from_url;
