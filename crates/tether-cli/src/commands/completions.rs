//! `tether completions` command.

use std::io::{self, Write};

use clap::CommandFactory;
use clap_complete::{Shell, generate};

use super::Cli;

/// Print the completion script for `shell` to stdout.
#[allow(clippy::unnecessary_wraps)]
pub fn run(shell: Shell) -> anyhow::Result<()> {
    write_script(shell, &mut io::stdout());
    Ok(())
}

fn write_script(shell: Shell, out: &mut dyn Write) {
    let mut cmd = Cli::command();
    let bin = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin, out);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_script_lists_subcommands() {
        let mut buf = Vec::new();
        write_script(Shell::Zsh, &mut buf);
        let script = String::from_utf8(buf).unwrap();
        assert!(script.contains("tether"));
        assert!(script.contains("is-submodule"));
        assert!(script.contains("promote"));
    }
}
