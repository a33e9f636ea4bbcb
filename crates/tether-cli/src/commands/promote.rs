//! `tether promote` command - Fast-forward a protected branch.

use std::path::Path;

use anyhow::{Result, bail};
use tether_core::{BranchDescriptor, BranchSyncEngine};

use super::{BranchArgs, utils};

/// Run the promote command.
pub fn run(
    config_path: Option<&Path>,
    target: &BranchArgs,
    local: Option<&str>,
    json: bool,
    verbose: u8,
) -> Result<()> {
    let master = utils::descriptor(target)?;
    let local = match local {
        Some(name) => BranchDescriptor::new(name)?,
        None => master.clone(),
    };
    let (_, mut repo) = utils::open_repo(config_path, &target.path)?;

    let outcome = BranchSyncEngine::new(&mut repo).sync_branch_devel(&local, &master)?;

    if json {
        utils::print_json(&outcome)?;
    } else {
        utils::report_outcome(&master.name, &outcome, verbose);
    }

    if outcome.is_failed() {
        bail!("Failed to promote {}", master.name);
    }
    Ok(())
}
