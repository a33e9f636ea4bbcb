//! `tether submodules` command - Initialise and update submodules.

use std::path::Path;

use anyhow::{Context, Result, bail};
use serde_json::json;
use tether_git::BrokenSubmodules;

use super::utils;
use crate::output;

/// Run the submodules command.
pub fn run(config_path: Option<&Path>, path: &Path, report_broken: bool, json: bool) -> Result<()> {
    let policy = if report_broken {
        BrokenSubmodules::Report
    } else {
        BrokenSubmodules::Raise
    };
    let (_, repo) = utils::open_repo(config_path, path)?;

    let diagnostic = repo
        .update_submodules(policy)
        .with_context(|| format!("Cannot update submodules of {}", path.display()))?;

    if json {
        utils::print_json(&json!({
            "path": path,
            "ok": diagnostic.is_none(),
            "diagnostic": diagnostic,
        }))?;
    }

    match diagnostic {
        None => {
            if !json {
                output::success("Submodules up to date");
            }
            Ok(())
        }
        Some(text) => {
            if !json {
                output::error_detail(&text);
            }
            bail!("Submodule update reported a problem");
        }
    }
}
