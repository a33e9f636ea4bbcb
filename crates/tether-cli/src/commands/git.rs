//! `tether git` command - Allow-listed passthrough.

use std::path::Path;

use anyhow::{Result, bail};
use serde_json::json;
use tether_git::Porcelain;

use super::utils;
use crate::output;

/// Run `git <verb> <args>` in `path` if `verb` is allowed.
pub fn run(config_path: Option<&Path>, path: &Path, verb: &str, args: &[String], json: bool) -> Result<()> {
    // Unknown verbs fail before any process is spawned.
    let verb: Porcelain = verb.parse()?;
    let (_, repo) = utils::open_repo(config_path, path)?;

    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    let result = repo.run(verb, &args)?;

    if json {
        utils::print_json(&json!({ "code": result.code, "output": result.output }))?;
    } else if !result.output.is_empty() {
        output::essential(&result.output);
    }

    if !result.success() {
        bail!("git {verb} exited with status {}", result.code);
    }
    Ok(())
}
