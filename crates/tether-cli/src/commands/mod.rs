//! Command-line definition and logging setup.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

pub mod branch;
pub mod completions;
pub mod git;
pub mod is_submodule;
pub mod promote;
pub mod submodules;
pub mod sync;
pub mod utils;

/// Environment variable holding an explicit tracing filter.
pub const LOG_ENV: &str = "TETHER_LOG";

#[derive(Parser)]
#[command(
    name = "tether",
    version,
    about = "Keep the working branches of many repositories in sync",
    long_about = "Tether fetches and updates working branches (hard reset when the \
                  content already matches, rebase otherwise), refreshes submodules, \
                  and fast-forwards protected branches without rewriting history."
)]
pub struct Cli {
    /// Configuration file (default: ./tether.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase verbosity (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sync every repository listed in the configuration
    Sync,

    /// Fetch and update one working branch
    Branch(BranchArgs),

    /// Fast-forward a protected branch to its remote
    Promote {
        #[command(flatten)]
        target: BranchArgs,

        /// Working branch the promotion is done for (diagnostics only)
        #[arg(long)]
        local: Option<String>,
    },

    /// Initialise and update submodules recursively
    Submodules {
        /// Repository working tree
        path: PathBuf,

        /// Report a broken submodule configuration instead of failing hard
        #[arg(long)]
        report_broken: bool,
    },

    /// Tell whether a directory is a submodule of its parent repository
    IsSubmodule {
        /// Directory to check
        path: PathBuf,
    },

    /// Run an allow-listed git command in a repository
    Git {
        /// Repository working tree
        path: PathBuf,

        /// Git subcommand (add, commit, fetch, ...)
        verb: String,

        /// Arguments passed through to git
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// A repository and one of its branches.
#[derive(Args)]
pub struct BranchArgs {
    /// Repository working tree
    pub path: PathBuf,

    /// Local branch name
    #[arg(long)]
    pub name: String,

    /// Remote the branch tracks
    #[arg(long)]
    pub tracks: Option<String>,

    /// Branch name on the remote, if different
    #[arg(long)]
    pub remote_branch: Option<String>,
}

/// Install the tracing subscriber.
///
/// `TETHER_LOG` wins over `-v`. Events go to stderr so JSON output on stdout
/// stays parseable.
pub fn setup_logging(verbose: u8, quiet: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        let level = match (quiet, verbose) {
            (true, _) => "error",
            (false, 0) => "warn",
            (false, 1) => "info",
            (false, 2) => "debug",
            (false, _) => "trace",
        };
        tracing_subscriber::EnvFilter::new(level)
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
