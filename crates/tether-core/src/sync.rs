//! Branch synchronization.
//!
//! [`BranchSyncEngine::sync_branch`] brings a working branch up to date with
//! its remote counterpart, either by a hard reset (when the content already
//! matches, e.g. after a force-push) or by a rebase that is aborted again on
//! conflict. [`BranchSyncEngine::sync_branch_devel`] promotes a protected
//! branch by fast-forward only.
//!
//! Ordinary git failures are reported through [`SyncOutcome`]; only an
//! inability to run git at all surfaces as an `Err`.

use std::fmt;

use serde::Serialize;
use tether_git::{CommandRunner, FastForward, Porcelain, RepositoryHandle, WorktreeCheck};

use crate::branch::BranchDescriptor;
use crate::error::Result;

/// Tri-state result of a sync operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    /// Nothing was attempted (dirty tree, unresolved refs).
    Skipped,
    /// Something was attempted and did not work.
    Failed,
    /// The branch is up to date.
    Succeeded,
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Skipped => "skipped",
            Self::Failed => "failed",
            Self::Succeeded => "succeeded",
        })
    }
}

/// Status plus a human-readable message (possibly empty).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncOutcome {
    pub status: SyncStatus,
    pub message: String,
}

impl SyncOutcome {
    pub fn skipped(message: impl Into<String>) -> Self {
        Self::new(SyncStatus::Skipped, message)
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self::new(SyncStatus::Failed, message)
    }

    pub fn succeeded(message: impl Into<String>) -> Self {
        Self::new(SyncStatus::Succeeded, message)
    }

    fn new(status: SyncStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.status == SyncStatus::Failed
    }
}

/// How the local branch gets updated.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Update {
    Reset(String),
    Rebase { onto: Option<String> },
}

/// Synchronizes branches of a single repository.
pub struct BranchSyncEngine<'a, R: CommandRunner> {
    repo: &'a mut RepositoryHandle<R>,
}

impl<'a, R: CommandRunner> BranchSyncEngine<'a, R> {
    pub const fn new(repo: &'a mut RepositoryHandle<R>) -> Self {
        Self { repo }
    }

    /// The repository being synchronized.
    #[must_use]
    pub const fn repo(&self) -> &RepositoryHandle<R> {
        &*self.repo
    }

    /// Fetch and update `branch` from its remote.
    ///
    /// A dirty tree is skipped untouched. A conflicting rebase is aborted and
    /// reported as failed.
    ///
    /// # Errors
    /// Returns error only if git could not be run.
    pub fn sync_branch(&mut self, branch: &BranchDescriptor) -> Result<SyncOutcome> {
        if let WorktreeCheck::Dirty { reason } = self.repo.require_clean_worktree()? {
            tracing::info!(branch = %branch.name, "skipping sync: {reason}");
            return Ok(SyncOutcome::skipped(reason));
        }

        let update = self.choose_update(branch)?;
        let fetch: Vec<&str> = branch.tracks().into_iter().collect();

        let (tx, result) = self.repo.transaction(|tx| -> Result<(bool, String)> {
            tx.run(Porcelain::Fetch, &fetch)?;

            match &update {
                Update::Reset(remote_ref) => {
                    let result = tx.run(Porcelain::Reset, &["--hard", remote_ref.as_str()])?;
                    Ok((result.is_some_and(|r| r.success()), String::new()))
                }
                Update::Rebase { onto } => {
                    let args: Vec<&str> = match onto {
                        Some(remote_ref) => vec![remote_ref.as_str(), branch.name.as_str()],
                        None => vec![branch.name.as_str()],
                    };
                    match tx.run(Porcelain::Rebase, &args)? {
                        Some(result) if result.success() => Ok((true, String::new())),
                        Some(_) => {
                            tracing::warn!(branch = %branch.name, "rebase failed, aborting");
                            tx.restore();
                            tx.run(Porcelain::Rebase, &["--abort"])?;
                            Ok((false, "Rebase failed because of conflicts".to_string()))
                        }
                        None => Ok((false, String::new())),
                    }
                }
            }
        });
        let (updated, message) = result?;

        Ok(if !tx.is_ok() {
            SyncOutcome::failed(tx.output())
        } else if updated {
            tracing::info!(branch = %branch.name, "branch synchronized");
            SyncOutcome::succeeded(message)
        } else {
            SyncOutcome::failed(message)
        })
    }

    fn choose_update(&self, branch: &BranchDescriptor) -> Result<Update> {
        let Some(remote_ref) = branch.remote_ref() else {
            tracing::debug!(branch = %branch.name, "untracked branch, rebasing on upstream");
            return Ok(Update::Rebase { onto: None });
        };

        let diff = self
            .repo
            .run(Porcelain::Diff, &[branch.name.as_str(), remote_ref.as_str(), "--"])?;
        if diff.success() && diff.output.is_empty() {
            tracing::debug!(branch = %branch.name, %remote_ref, "content identical, resetting");
            Ok(Update::Reset(remote_ref))
        } else {
            tracing::debug!(branch = %branch.name, %remote_ref, "content differs, rebasing");
            Ok(Update::Rebase {
                onto: Some(remote_ref),
            })
        }
    }

    /// Fast-forward `master` to its remote counterpart if possible.
    ///
    /// Never rebases or merges. `local` only labels the diagnostics.
    ///
    /// # Errors
    /// Returns error only if git could not be run.
    pub fn sync_branch_devel(
        &self,
        local: &BranchDescriptor,
        master: &BranchDescriptor,
    ) -> Result<SyncOutcome> {
        let fetch: Vec<&str> = master.tracks().into_iter().collect();
        let fetched = self.repo.run(Porcelain::Fetch, &fetch)?;
        if !fetched.success() {
            let mut command = String::from("git fetch");
            for arg in &fetch {
                command.push(' ');
                command.push_str(arg);
            }
            return Ok(SyncOutcome::failed(format!(
                "{command} failed\n{}",
                fetched.output
            )));
        }

        let local_sha = self.repo.resolve_sha(&master.local_ref())?;
        let remote_sha = match master.remote_tracking_ref() {
            Some(remote_ref) => self.repo.resolve_sha(&remote_ref)?,
            None => None,
        };
        let (Some(local_sha), Some(remote_sha)) = (local_sha, remote_sha) else {
            tracing::debug!(branch = %master.name, "cannot resolve local and remote refs");
            return Ok(SyncOutcome::skipped(""));
        };

        if local_sha == remote_sha {
            return Ok(SyncOutcome::succeeded(""));
        }

        match self.repo.is_fast_forward(&local_sha, &remote_sha)? {
            FastForward::Indeterminate { diagnostic } => Ok(SyncOutcome::failed(diagnostic)),
            FastForward::No => {
                tracing::info!(
                    branch = %master.name,
                    working = %local.name,
                    "not a fast-forward, leaving untouched"
                );
                Ok(SyncOutcome::succeeded(format!(
                    "{} isn't fast-forward",
                    master.name
                )))
            }
            FastForward::Yes => {
                let reason = format!("tether: fast-forward to {}", remote_sha.as_str());
                let local_ref = master.local_ref();
                let result = self.repo.call(&[
                    "update-ref",
                    "-m",
                    reason.as_str(),
                    local_ref.as_str(),
                    remote_sha.as_str(),
                    local_sha.as_str(),
                ])?;
                if !result.success() {
                    return Ok(SyncOutcome::failed(result.output));
                }

                tracing::info!(
                    branch = %master.name,
                    from = local_sha.short(),
                    to = remote_sha.short(),
                    "fast-forwarded"
                );
                Ok(SyncOutcome::succeeded(format!(
                    "Fast-forwarded {name}. Feel free to rebase on {name}",
                    name = master.name
                )))
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_mocks::MockRunner;

    const OLD: &str = "1111111111111111111111111111111111111111";
    const NEW: &str = "2222222222222222222222222222222222222222";

    fn devel() -> BranchDescriptor {
        BranchDescriptor::new("devel").unwrap().tracking("origin")
    }

    fn master() -> BranchDescriptor {
        BranchDescriptor::new("master").unwrap().tracking("origin")
    }

    fn mutations(runner: &MockRunner) -> Vec<String> {
        runner
            .calls()
            .into_iter()
            .filter(|c| ["fetch", "reset", "rebase", "update-ref"].iter().any(|v| c.starts_with(v)))
            .collect()
    }

    #[test]
    fn test_dirty_tree_is_skipped() {
        let runner = MockRunner::new().with("diff-files", 1, "");
        let mut repo = runner.handle();

        let outcome = BranchSyncEngine::new(&mut repo).sync_branch(&devel()).unwrap();

        assert_eq!(outcome.status, SyncStatus::Skipped);
        assert_eq!(outcome.message, "You have unstaged changes");
        assert!(mutations(&runner).is_empty());
    }

    #[test]
    fn test_dirty_index_is_skipped() {
        let runner = MockRunner::new().with("diff-index", 1, "");
        let mut repo = runner.handle();

        let outcome = BranchSyncEngine::new(&mut repo).sync_branch(&devel()).unwrap();

        assert_eq!(outcome.status, SyncStatus::Skipped);
        assert!(!outcome.message.is_empty());
        assert!(mutations(&runner).is_empty());
    }

    #[test]
    fn test_empty_diff_resets() {
        let runner = MockRunner::new();
        let mut repo = runner.handle();

        let outcome = BranchSyncEngine::new(&mut repo).sync_branch(&devel()).unwrap();

        assert_eq!(outcome, SyncOutcome::succeeded(""));
        assert!(runner.calls().contains(&"diff devel origin/devel --".to_string()));
        assert_eq!(
            mutations(&runner),
            vec!["fetch origin", "reset --hard origin/devel"]
        );
    }

    #[test]
    fn test_diff_output_rebases() {
        let runner = MockRunner::new().with("diff devel", 0, "diff --git a/x b/x");
        let mut repo = runner.handle();

        let outcome = BranchSyncEngine::new(&mut repo).sync_branch(&devel()).unwrap();

        assert_eq!(outcome.status, SyncStatus::Succeeded);
        assert_eq!(
            mutations(&runner),
            vec!["fetch origin", "rebase origin/devel devel"]
        );
    }

    #[test]
    fn test_failed_diff_rebases() {
        let runner = MockRunner::new().with("diff devel", 128, "unknown revision");
        let mut repo = runner.handle();

        BranchSyncEngine::new(&mut repo).sync_branch(&devel()).unwrap();

        assert_eq!(runner.count("rebase origin/devel devel"), 1);
        assert_eq!(runner.count("reset"), 0);
    }

    #[test]
    fn test_remote_branch_override_is_used() {
        let runner = MockRunner::new();
        let mut repo = runner.handle();
        let branch = devel().with_remote_branch("main");

        BranchSyncEngine::new(&mut repo).sync_branch(&branch).unwrap();

        assert_eq!(runner.count("diff devel origin/main --"), 1);
        assert_eq!(runner.count("reset --hard origin/main"), 1);
    }

    #[test]
    fn test_untracked_branch_rebases_without_diff() {
        let runner = MockRunner::new();
        let mut repo = runner.handle();
        let branch = BranchDescriptor::new("devel").unwrap();

        let outcome = BranchSyncEngine::new(&mut repo).sync_branch(&branch).unwrap();

        assert_eq!(outcome.status, SyncStatus::Succeeded);
        assert_eq!(runner.count("diff "), 0);
        assert_eq!(mutations(&runner), vec!["fetch", "rebase devel"]);
    }

    #[test]
    fn test_rebase_conflict_is_aborted_once() {
        let runner = MockRunner::new()
            .with("diff devel", 0, "changes")
            .with("rebase origin/devel", 1, "CONFLICT (content)");
        let mut repo = runner.handle();

        let outcome = BranchSyncEngine::new(&mut repo).sync_branch(&devel()).unwrap();

        assert_eq!(outcome, SyncOutcome::failed("Rebase failed because of conflicts"));
        assert_eq!(runner.count("rebase --abort"), 1);
    }

    #[test]
    fn test_failed_abort_reports_log() {
        let runner = MockRunner::new()
            .with("diff devel", 0, "changes")
            .with("rebase origin/devel", 1, "CONFLICT")
            .with("rebase --abort", 1, "no rebase in progress");
        let mut repo = runner.handle();

        let outcome = BranchSyncEngine::new(&mut repo).sync_branch(&devel()).unwrap();

        assert_eq!(
            outcome,
            SyncOutcome::failed(
                "git rebase origin/devel devel failed\nCONFLICT\n\
                 git rebase --abort failed\nno rebase in progress"
            )
        );
    }

    #[test]
    fn test_failed_fetch_skips_update() {
        let runner = MockRunner::new().with("fetch", 128, "could not read from remote");
        let mut repo = runner.handle();

        let outcome = BranchSyncEngine::new(&mut repo).sync_branch(&devel()).unwrap();

        assert_eq!(
            outcome,
            SyncOutcome::failed("git fetch origin failed\ncould not read from remote")
        );
        assert_eq!(runner.count("reset"), 0);
        assert_eq!(runner.count("rebase"), 0);
    }

    #[test]
    fn test_failed_reset_reports_log() {
        let runner = MockRunner::new().with("reset", 1, "fatal: bad ref");
        let mut repo = runner.handle();

        let outcome = BranchSyncEngine::new(&mut repo).sync_branch(&devel()).unwrap();

        assert_eq!(
            outcome,
            SyncOutcome::failed("git reset --hard origin/devel failed\nfatal: bad ref")
        );
    }

    #[test]
    fn test_devel_equal_hashes() {
        let runner = MockRunner::new()
            .with("show-ref --verify --hash refs/heads/master", 0, OLD)
            .with("show-ref --verify --hash refs/remotes/origin/master", 0, OLD);
        let mut repo = runner.handle();

        let outcome = BranchSyncEngine::new(&mut repo)
            .sync_branch_devel(&devel(), &master())
            .unwrap();

        assert_eq!(outcome, SyncOutcome::succeeded(""));
        assert_eq!(runner.count("update-ref"), 0);
        assert_eq!(runner.count("merge-base"), 0);
    }

    #[test]
    fn test_devel_fast_forward() {
        let runner = MockRunner::new()
            .with("show-ref --verify --hash refs/heads/master", 0, OLD)
            .with("show-ref --verify --hash refs/remotes/origin/master", 0, NEW)
            .with("merge-base", 0, OLD);
        let mut repo = runner.handle();

        let outcome = BranchSyncEngine::new(&mut repo)
            .sync_branch_devel(&devel(), &master())
            .unwrap();

        assert_eq!(outcome.status, SyncStatus::Succeeded);
        assert!(outcome.message.contains("Fast-forwarded master"));
        assert!(runner.calls().contains(&format!(
            "update-ref -m tether: fast-forward to {NEW} refs/heads/master {NEW} {OLD}"
        )));
    }

    #[test]
    fn test_devel_not_fast_forward_is_advisory() {
        let runner = MockRunner::new()
            .with("show-ref --verify --hash refs/heads/master", 0, OLD)
            .with("show-ref --verify --hash refs/remotes/origin/master", 0, NEW)
            .with("merge-base", 0, "3333333333333333333333333333333333333333");
        let mut repo = runner.handle();

        let outcome = BranchSyncEngine::new(&mut repo)
            .sync_branch_devel(&devel(), &master())
            .unwrap();

        assert_eq!(outcome, SyncOutcome::succeeded("master isn't fast-forward"));
        assert_eq!(runner.count("update-ref"), 0);
    }

    #[test]
    fn test_devel_merge_base_failure_is_indeterminate() {
        let runner = MockRunner::new()
            .with("show-ref --verify --hash refs/heads/master", 0, OLD)
            .with("show-ref --verify --hash refs/remotes/origin/master", 0, NEW)
            .with("merge-base", 1, "fatal: no merge base");
        let mut repo = runner.handle();

        let outcome = BranchSyncEngine::new(&mut repo)
            .sync_branch_devel(&devel(), &master())
            .unwrap();

        assert_eq!(
            outcome,
            SyncOutcome::failed("Calling merge-base failed\nfatal: no merge base")
        );
        assert_eq!(runner.count("update-ref"), 0);
    }

    #[test]
    fn test_devel_unresolved_remote_is_skipped() {
        let runner = MockRunner::new()
            .with("show-ref --verify --hash refs/heads/master", 0, OLD)
            .with("show-ref --verify --hash refs/remotes/origin/master", 1, "");
        let mut repo = runner.handle();

        let outcome = BranchSyncEngine::new(&mut repo)
            .sync_branch_devel(&devel(), &master())
            .unwrap();

        assert_eq!(outcome, SyncOutcome::skipped(""));
    }

    #[test]
    fn test_devel_untracked_master_is_skipped() {
        let runner = MockRunner::new().with("show-ref", 0, OLD);
        let mut repo = runner.handle();
        let master = BranchDescriptor::new("master").unwrap();

        let outcome = BranchSyncEngine::new(&mut repo)
            .sync_branch_devel(&devel(), &master)
            .unwrap();

        assert_eq!(outcome.status, SyncStatus::Skipped);
        assert_eq!(mutations(&runner), vec!["fetch"]);
    }

    #[test]
    fn test_devel_failed_fetch() {
        let runner = MockRunner::new().with("fetch", 1, "network down");
        let mut repo = runner.handle();

        let outcome = BranchSyncEngine::new(&mut repo)
            .sync_branch_devel(&devel(), &master())
            .unwrap();

        assert_eq!(outcome, SyncOutcome::failed("git fetch origin failed\nnetwork down"));
    }

    #[test]
    fn test_devel_failed_update_ref() {
        let runner = MockRunner::new()
            .with("show-ref --verify --hash refs/heads/master", 0, OLD)
            .with("show-ref --verify --hash refs/remotes/origin/master", 0, NEW)
            .with("merge-base", 0, OLD)
            .with("update-ref", 1, "cannot lock ref");
        let mut repo = runner.handle();

        let outcome = BranchSyncEngine::new(&mut repo)
            .sync_branch_devel(&devel(), &master())
            .unwrap();

        assert_eq!(outcome, SyncOutcome::failed("cannot lock ref"));
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&SyncOutcome::skipped("dirty")).unwrap();
        assert_eq!(json, r#"{"status":"skipped","message":"dirty"}"#);
    }
}
