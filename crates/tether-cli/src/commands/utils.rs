use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tether_core::config::CONFIG_FILE;
use tether_core::{BranchDescriptor, Config, SyncOutcome, SyncStatus};
use tether_git::{GitExecutable, RepositoryHandle};

use super::BranchArgs;
use crate::output;

/// Load the configuration and return it with the directory repo paths are
/// relative to.
pub fn load_config(path: Option<&Path>) -> Result<(Config, PathBuf)> {
    let file = path.map_or_else(|| PathBuf::from(CONFIG_FILE), Path::to_path_buf);
    let config = Config::load(&file)
        .with_context(|| format!("Failed to load configuration from {}", file.display()))?;

    let base = file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
    Ok((config, base))
}

/// Resolve the git executable once for the whole run.
pub fn resolve_git(config: &Config) -> Result<GitExecutable> {
    config
        .general
        .resolve_git()
        .context("Cannot find a git executable")
}

/// Load config, resolve git, and bind a handle to `path`.
pub fn open_repo(config_path: Option<&Path>, path: &Path) -> Result<(Config, RepositoryHandle)> {
    let (config, _) = load_config(config_path)?;
    let git = resolve_git(&config)?;
    Ok((config, RepositoryHandle::open(path, git)))
}

/// Build a validated descriptor from command-line flags.
pub fn descriptor(args: &BranchArgs) -> Result<BranchDescriptor> {
    let mut branch = BranchDescriptor::new(&args.name)?;
    if let Some(tracks) = &args.tracks {
        branch = branch.tracking(tracks);
    }
    if let Some(remote_branch) = &args.remote_branch {
        branch = branch.with_remote_branch(remote_branch);
    }
    branch.validate()?;
    Ok(branch)
}

/// Print any serializable value as pretty JSON.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    output::essential(&serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print an outcome the way every command does.
///
/// Skipped outcomes only show at `-v`; failures always go to stderr.
pub fn report_outcome(label: &str, outcome: &SyncOutcome, verbose: u8) {
    match outcome.status {
        SyncStatus::Succeeded if outcome.message.is_empty() => {
            output::success(&format!("{label}: up to date"));
        }
        SyncStatus::Succeeded => output::success(&format!("{label}: {}", outcome.message)),
        SyncStatus::Skipped if verbose > 0 => {
            let reason = if outcome.message.is_empty() {
                "nothing to do"
            } else {
                outcome.message.as_str()
            };
            output::info(&format!("{label}: skipped ({reason})"));
        }
        SyncStatus::Skipped => {}
        SyncStatus::Failed => {
            output::error(&format!("{label}: {}", output::status_label(outcome.status)));
            output::error_detail(&outcome.message);
        }
    }
}
