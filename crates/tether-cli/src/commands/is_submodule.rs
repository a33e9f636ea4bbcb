//! `tether is-submodule` command.

use std::path::Path;

use anyhow::Result;
use serde_json::json;
use tether_git::{ProcessRunner, is_submodule};

use super::utils;
use crate::output;

/// Print `true` or `false`. The exit status does not depend on the answer.
pub fn run(config_path: Option<&Path>, path: &Path, json: bool) -> Result<()> {
    let (config, _) = utils::load_config(config_path)?;
    let runner = ProcessRunner::new(utils::resolve_git(&config)?);

    let answer = is_submodule(&runner, path)?;

    if json {
        utils::print_json(&json!({ "path": path, "submodule": answer }))
    } else {
        output::essential(&answer.to_string());
        Ok(())
    }
}
