//! The allow-list of passthrough porcelain commands.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// A human-facing git subcommand that may be invoked directly.
///
/// Anything not listed here has to go through a dedicated method on
/// [`RepositoryHandle`](crate::RepositoryHandle).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Porcelain {
    Add,
    Branch,
    Checkout,
    Clean,
    Commit,
    Config,
    Diff,
    Fetch,
    Init,
    Log,
    Merge,
    Pull,
    Push,
    Rebase,
    Remote,
    Reset,
    Stash,
    Status,
    Submodule,
}

impl Porcelain {
    /// Every allowed subcommand.
    pub const ALL: [Self; 19] = [
        Self::Add,
        Self::Branch,
        Self::Checkout,
        Self::Clean,
        Self::Commit,
        Self::Config,
        Self::Diff,
        Self::Fetch,
        Self::Init,
        Self::Log,
        Self::Merge,
        Self::Pull,
        Self::Push,
        Self::Rebase,
        Self::Remote,
        Self::Reset,
        Self::Stash,
        Self::Status,
        Self::Submodule,
    ];

    /// The subcommand as passed to git.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Branch => "branch",
            Self::Checkout => "checkout",
            Self::Clean => "clean",
            Self::Commit => "commit",
            Self::Config => "config",
            Self::Diff => "diff",
            Self::Fetch => "fetch",
            Self::Init => "init",
            Self::Log => "log",
            Self::Merge => "merge",
            Self::Pull => "pull",
            Self::Push => "push",
            Self::Rebase => "rebase",
            Self::Remote => "remote",
            Self::Reset => "reset",
            Self::Stash => "stash",
            Self::Status => "status",
            Self::Submodule => "submodule",
        }
    }
}

impl fmt::Display for Porcelain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Porcelain {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|verb| verb.as_str() == s)
            .ok_or_else(|| Error::UnsupportedSubcommand(s.to_string()))
    }
}
