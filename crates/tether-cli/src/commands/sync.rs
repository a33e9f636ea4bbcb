//! `tether sync` command - Sync every configured repository.

use std::path::Path;

use anyhow::{Result, bail};
use serde_json::json;
use tether_core::{RepoReport, sync_repository};
use tether_git::RepositoryHandle;

use super::utils;
use crate::output;

/// Run the sync command.
pub fn run(config_path: Option<&Path>, json: bool, verbose: u8) -> Result<()> {
    let (config, base) = utils::load_config(config_path)?;
    if config.repos.is_empty() {
        if json {
            return utils::print_json(&Vec::<RepoReport>::new());
        }
        output::info("No repositories configured - nothing to sync");
        return Ok(());
    }

    let git = utils::resolve_git(&config)?;
    let policy = config.general.submodule_policy();

    let mut results = Vec::with_capacity(config.repos.len());
    let mut failed = 0usize;

    for repo_config in &config.repos {
        let label = repo_config.path.display().to_string();
        let mut repo = RepositoryHandle::open(repo_config.repo_path(&base), git.clone());

        match sync_repository(&mut repo, repo_config, policy) {
            Ok(report) => {
                if report.failed() {
                    failed += 1;
                }
                if !json {
                    print_report(&label, &report, verbose);
                }
                results.push(serde_json::to_value(&report)?);
            }
            Err(e) => {
                tracing::error!(repo = %label, "sync aborted: {e}");
                failed += 1;
                if !json {
                    output::error(&format!("{label}: {e}"));
                }
                results.push(json!({ "path": label, "error": e.to_string() }));
            }
        }
    }

    if json {
        utils::print_json(&results)?;
    }

    if failed > 0 {
        bail!("{failed} of {} repositories failed to sync", config.repos.len());
    }
    if !json {
        output::success(&format!("Synced {} repositories", config.repos.len()));
    }
    Ok(())
}

fn print_report(label: &str, report: &RepoReport, verbose: u8) {
    utils::report_outcome(label, &report.branch, verbose);

    if let Some(diagnostic) = &report.submodules {
        output::error(&format!("{label}: submodules"));
        output::error_detail(diagnostic);
    }

    if let Some(promotion) = &report.promotion {
        utils::report_outcome(&format!("{label} (promote)"), promotion, verbose);
    }
}
