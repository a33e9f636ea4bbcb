//! Per-repository sync workflow.

use std::path::PathBuf;

use serde::Serialize;
use tether_git::{BrokenSubmodules, CommandRunner, RepositoryHandle};

use crate::config::RepoConfig;
use crate::error::Result;
use crate::sync::{BranchSyncEngine, SyncOutcome, SyncStatus};

/// What happened to one repository during a sync run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoReport {
    pub path: PathBuf,
    pub branch: SyncOutcome,
    /// Submodule diagnostic, if the update reported one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submodules: Option<String>,
    /// Fast-forward promotion of the configured master.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promotion: Option<SyncOutcome>,
}

impl RepoReport {
    /// Whether any step of the run failed.
    #[must_use]
    pub fn failed(&self) -> bool {
        self.branch.is_failed()
            || self.submodules.is_some()
            || self.promotion.as_ref().is_some_and(SyncOutcome::is_failed)
    }

    /// Whether the working branch was left alone.
    #[must_use]
    pub fn skipped(&self) -> bool {
        self.branch.status == SyncStatus::Skipped
    }
}

/// Sync the working branch, refresh submodules, then promote the master.
///
/// Submodules are only touched after the working branch was updated.
///
/// # Errors
/// Returns error if git could not be run, or if the submodule configuration
/// is broken under [`BrokenSubmodules::Raise`].
pub fn sync_repository<R: CommandRunner>(
    repo: &mut RepositoryHandle<R>,
    config: &RepoConfig,
    policy: BrokenSubmodules,
) -> Result<RepoReport> {
    let _span = tracing::info_span!("repo", path = %repo.workdir().display()).entered();

    let mut engine = BranchSyncEngine::new(repo);
    let branch = engine.sync_branch(&config.branch)?;

    let submodules = if branch.status == SyncStatus::Succeeded {
        engine.repo().update_submodules(policy)?
    } else {
        None
    };

    let promotion = match &config.master {
        Some(master) => Some(engine.sync_branch_devel(&config.branch, master)?),
        None => None,
    };

    Ok(RepoReport {
        path: config.path.clone(),
        branch,
        submodules,
        promotion,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::branch::BranchDescriptor;
    use crate::test_mocks::MockRunner;

    fn repo_config(master: bool) -> RepoConfig {
        RepoConfig {
            path: PathBuf::from("lib/foo"),
            branch: BranchDescriptor::new("devel").unwrap().tracking("origin"),
            master: master.then(|| BranchDescriptor::new("master").unwrap().tracking("origin")),
        }
    }

    #[test]
    fn test_clean_run_without_master() {
        let runner = MockRunner::new();
        let mut repo = runner.handle();

        let report = sync_repository(&mut repo, &repo_config(false), BrokenSubmodules::Raise).unwrap();

        assert_eq!(report.branch, SyncOutcome::succeeded(""));
        assert!(report.submodules.is_none());
        assert!(report.promotion.is_none());
        assert!(!report.failed());
        assert_eq!(runner.count("submodule status"), 1);
    }

    #[test]
    fn test_skipped_branch_leaves_submodules_alone() {
        let runner = MockRunner::new().with("diff-files", 1, "");
        let mut repo = runner.handle();

        let report = sync_repository(&mut repo, &repo_config(true), BrokenSubmodules::Raise).unwrap();

        assert!(report.skipped());
        assert_eq!(runner.count("submodule"), 0);
        assert!(report.promotion.is_some());
    }

    #[test]
    fn test_submodule_failure_marks_report_failed() {
        let runner = MockRunner::new()
            .with("submodule status", 0, "-abc123 vendor/lib")
            .with("submodule update", 1, "clone failed");
        let mut repo = runner.handle();

        let report = sync_repository(&mut repo, &repo_config(false), BrokenSubmodules::Raise).unwrap();

        assert_eq!(
            report.submodules.as_deref(),
            Some("Failed to update submodules\nclone failed")
        );
        assert!(report.failed());
    }

    #[test]
    fn test_broken_submodules_raise() {
        let runner = MockRunner::new().with("submodule status", 128, "no submodule mapping");
        let mut repo = runner.handle();

        let result = sync_repository(&mut repo, &repo_config(false), BrokenSubmodules::Raise);

        assert!(matches!(
            result,
            Err(crate::Error::Git(tether_git::Error::BrokenSubmoduleConfiguration { .. }))
        ));
    }

    #[test]
    fn test_broken_submodules_report() {
        let runner = MockRunner::new().with("submodule status", 128, "no submodule mapping");
        let mut repo = runner.handle();

        let report = sync_repository(&mut repo, &repo_config(false), BrokenSubmodules::Report).unwrap();

        assert!(report.submodules.unwrap().starts_with("Broken submodules configuration detected"));
    }
}
