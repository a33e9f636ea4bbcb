//! Tether CLI - keep the working branches of many repositories in sync.

use clap::Parser;

mod commands;
mod output;

use commands::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    output::set_quiet(cli.quiet);
    commands::setup_logging(cli.verbose, cli.quiet);

    let config = cli.config.as_deref();
    let result = match &cli.command {
        Commands::Sync => commands::sync::run(config, cli.json, cli.verbose),
        Commands::Branch(args) => commands::branch::run(config, args, cli.json, cli.verbose),
        Commands::Promote { target, local } => {
            commands::promote::run(config, target, local.as_deref(), cli.json, cli.verbose)
        }
        Commands::Submodules {
            path,
            report_broken,
        } => commands::submodules::run(config, path, *report_broken, cli.json),
        Commands::IsSubmodule { path } => commands::is_submodule::run(config, path, cli.json),
        Commands::Git { path, verb, args } => {
            commands::git::run(config, path, verb, args, cli.json)
        }
        Commands::Completions { shell } => commands::completions::run(*shell),
    };

    if let Err(e) = result {
        output::error(&format!("{e:#}"));
        std::process::exit(1);
    }
}
