//! `tether branch` command - Fetch and update one working branch.

use std::path::Path;

use anyhow::{Result, bail};
use tether_core::{BranchSyncEngine, SyncStatus};

use super::{BranchArgs, utils};

/// Run the branch command.
pub fn run(config_path: Option<&Path>, args: &BranchArgs, json: bool, verbose: u8) -> Result<()> {
    let branch = utils::descriptor(args)?;
    let (_, mut repo) = utils::open_repo(config_path, &args.path)?;

    let outcome = BranchSyncEngine::new(&mut repo).sync_branch(&branch)?;

    if json {
        utils::print_json(&outcome)?;
    } else {
        utils::report_outcome(&branch.name, &outcome, verbose);
    }

    if outcome.status == SyncStatus::Failed {
        bail!("Failed to sync {}", branch.name);
    }
    Ok(())
}
