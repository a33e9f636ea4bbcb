//! Execution of a single git command.
//!
//! [`CommandRunner`] is the seam between the transaction layer and the
//! operating system: everything above it works in terms of argument lists and
//! [`CommandResult`] values, which lets the sync engine be tested against a
//! scripted runner.

use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, Stdio};

use crate::error::{Error, Result};
use crate::executable::GitExecutable;

/// Exit status and combined output of one command.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandResult {
    /// Process exit code. `-1` when the process was killed by a signal.
    pub code: i32,
    /// Interleaved stdout and stderr, trailing newlines stripped.
    pub output: String,
}

impl CommandResult {
    /// Build a result from a code and raw output, stripping trailing newlines.
    #[must_use]
    pub fn new(code: i32, output: impl Into<String>) -> Self {
        let mut output = output.into();
        let trimmed = output.trim_end_matches(['\n', '\r']).len();
        output.truncate(trimmed);
        Self { code, output }
    }

    /// Whether the command exited with status zero.
    #[must_use]
    pub const fn success(&self) -> bool {
        self.code == 0
    }
}

/// Runs one git command to completion.
///
/// Implementations never treat a nonzero exit as an error; only a failure to
/// run the process at all is reported through `Err`.
#[allow(clippy::missing_errors_doc)]
pub trait CommandRunner {
    /// Run `git <args>` in `cwd` and wait for it to exit.
    fn run(&self, cwd: &Path, args: &[&str]) -> Result<CommandResult>;
}

impl<T: CommandRunner + ?Sized> CommandRunner for &T {
    fn run(&self, cwd: &Path, args: &[&str]) -> Result<CommandResult> {
        (**self).run(cwd, args)
    }
}

/// [`CommandRunner`] that spawns the real git executable.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    git: GitExecutable,
}

impl ProcessRunner {
    /// Create a runner for an already-resolved executable.
    #[must_use]
    pub const fn new(git: GitExecutable) -> Self {
        Self { git }
    }

    /// The executable this runner spawns.
    #[must_use]
    pub const fn executable(&self) -> &GitExecutable {
        &self.git
    }
}

impl CommandRunner for ProcessRunner {
    fn run(&self, cwd: &Path, args: &[&str]) -> Result<CommandResult> {
        tracing::debug!(cwd = %cwd.display(), "git {}", args.join(" "));

        // stdout and stderr share one pipe so the output keeps emission order.
        let (mut reader, writer) = std::io::pipe()?;
        let mut child = {
            let mut command = Command::new(&self.git);
            command
                .args(args)
                .current_dir(cwd)
                .stdin(Stdio::null())
                .stdout(writer.try_clone()?)
                .stderr(writer);
            command.spawn().map_err(|source| Error::Spawn {
                program: self.git.path().to_path_buf(),
                source,
            })?
        };

        let result = collect(&mut child, &mut reader)?;
        if !result.output.is_empty() {
            tracing::debug!("out: {}", result.output);
        }
        Ok(result)
    }
}

/// Drain `reader` and wait for `child`.
///
/// If the read fails the child is killed and reaped before the error is
/// returned.
fn collect(child: &mut Child, reader: &mut impl Read) -> Result<CommandResult> {
    let mut raw = Vec::new();
    if let Err(e) = reader.read_to_end(&mut raw) {
        tracing::warn!("reading git output failed: {e}");
        let _ = child.kill();
        let _ = child.wait();
        return Err(e.into());
    }
    let status = child.wait()?;

    Ok(CommandResult::new(
        status.code().unwrap_or(-1),
        String::from_utf8_lossy(&raw).into_owned(),
    ))
}

/// Render an argument list the way it appears in diagnostics.
pub(crate) fn display_command(args: &[&str]) -> String {
    format!("git {}", args.join(" "))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn runner() -> ProcessRunner {
        ProcessRunner::new(GitExecutable::discover().unwrap())
    }

    #[test]
    fn test_trailing_newlines_are_stripped() {
        let result = CommandResult::new(0, "line one\nline two\n\n");
        assert_eq!(result.output, "line one\nline two");
        assert!(result.success());
    }

    #[test]
    fn test_nonzero_exit_is_not_an_error() {
        let temp = TempDir::new().unwrap();
        let result = runner()
            .run(temp.path(), &["rev-parse", "--verify", "HEAD"])
            .unwrap();
        assert_ne!(result.code, 0);
        assert!(!result.output.is_empty());
    }

    #[test]
    fn test_runs_in_given_directory() {
        let temp = TempDir::new().unwrap();
        let init = runner().run(temp.path(), &["init", "--quiet"]).unwrap();
        assert!(init.success());
        assert!(temp.path().join(".git").is_dir());
    }

    struct BrokenReader;

    impl Read for BrokenReader {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("pipe closed"))
        }
    }

    #[test]
    fn test_failed_read_reaps_child() {
        // hash-object --stdin blocks until stdin closes, so only a kill ends it.
        let mut child = Command::new(runner().executable())
            .args(["hash-object", "--stdin"])
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .spawn()
            .unwrap();

        let err = collect(&mut child, &mut BrokenReader).unwrap_err();
        assert!(matches!(err, Error::Io(_)));

        let status = child.try_wait().unwrap().unwrap();
        assert!(!status.success());
    }

    #[test]
    fn test_display_command() {
        assert_eq!(display_command(&["fetch", "origin"]), "git fetch origin");
    }
}
