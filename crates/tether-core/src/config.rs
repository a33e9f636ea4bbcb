//! Configuration management for Tether.

use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tether_git::{BrokenSubmodules, GitExecutable};

use crate::branch::BranchDescriptor;
use crate::error::{Error, Result};

/// Default configuration file name.
pub const CONFIG_FILE: &str = "tether.toml";

/// Environment variable overriding the git executable.
pub const GIT_ENV: &str = "TETHER_GIT";

/// Tether configuration loaded from `tether.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Repositories to keep in sync, in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub repos: Vec<RepoConfig>,
}

impl Config {
    /// Load config from a TOML file. A missing file yields the defaults.
    ///
    /// # Errors
    /// Returns error if the file can't be read or parsed, or names an invalid
    /// branch.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content).map_err(|e| Error::ConfigParse {
            file: path.to_path_buf(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to a TOML file.
    ///
    /// # Errors
    /// Returns error if serialization or write fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| std::io::Error::other(e.to_string()))?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Check every branch descriptor.
    ///
    /// # Errors
    /// Returns [`Error::InvalidBranchName`] for the first invalid name.
    pub fn validate(&self) -> Result<()> {
        for repo in &self.repos {
            repo.branch.validate()?;
            if let Some(master) = &repo.master {
                master.validate()?;
            }
        }
        Ok(())
    }
}

/// General Tether settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Explicit git executable; looked up on `PATH` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git: Option<PathBuf>,

    /// Whether a broken submodule configuration aborts the repository.
    #[serde(default = "default_strict_submodules")]
    pub strict_submodules: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            git: None,
            strict_submodules: default_strict_submodules(),
        }
    }
}

const fn default_strict_submodules() -> bool {
    true
}

impl GeneralConfig {
    /// Resolve the git executable: `TETHER_GIT`, then `git`, then `PATH`.
    ///
    /// # Errors
    /// Returns error if the chosen executable can't be found.
    pub fn resolve_git(&self) -> Result<GitExecutable> {
        self.resolve_git_from(env::var_os(GIT_ENV))
    }

    fn resolve_git_from(&self, overridden: Option<OsString>) -> Result<GitExecutable> {
        if let Some(explicit) = overridden.filter(|v| !v.is_empty()) {
            tracing::debug!(git = ?explicit, "using git from {GIT_ENV}");
            return Ok(GitExecutable::find(explicit)?);
        }
        if let Some(configured) = &self.git {
            return Ok(GitExecutable::find(configured)?);
        }
        Ok(GitExecutable::discover()?)
    }

    /// Broken-submodule policy selected by `strict_submodules`.
    #[must_use]
    pub const fn submodule_policy(&self) -> BrokenSubmodules {
        if self.strict_submodules {
            BrokenSubmodules::Raise
        } else {
            BrokenSubmodules::Report
        }
    }
}

/// One repository to synchronize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoConfig {
    /// Working tree, relative to the config file's directory.
    pub path: PathBuf,

    /// Working branch, synced by fetch and reset/rebase.
    pub branch: BranchDescriptor,

    /// Protected branch, promoted by fast-forward only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub master: Option<BranchDescriptor>,
}

impl RepoConfig {
    /// Working tree path resolved against `base`.
    #[must_use]
    pub fn repo_path(&self, base: &Path) -> PathBuf {
        if self.path.is_absolute() {
            self.path.clone()
        } else {
            base.join(&self.path)
        }
    }
}
