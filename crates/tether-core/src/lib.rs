//! # tether-core
//!
//! Branch synchronization for Tether: branch descriptors, the sync engine
//! (reset-or-rebase for working branches, fast-forward-only promotion for
//! protected ones), the per-repository workflow, and `tether.toml`
//! configuration.

pub mod branch;
pub mod config;
mod error;
pub mod sync;
pub mod workflow;

#[cfg(test)]
mod test_mocks;

pub use branch::BranchDescriptor;
pub use config::{Config, GeneralConfig, RepoConfig};
pub use error::{Error, Result};
pub use sync::{BranchSyncEngine, SyncOutcome, SyncStatus};
pub use workflow::{RepoReport, sync_repository};
