//! Scripted command runner for engine tests.
//!
//! The engine only talks to git through [`CommandRunner`], so its decisions
//! can be checked without a repository: every issued command is recorded and
//! answered from prefix rules.

use std::cell::RefCell;
use std::path::Path;

use tether_git::{CommandResult, CommandRunner, RepositoryHandle, Result as GitResult};

struct Rule {
    prefix: Vec<String>,
    code: i32,
    output: String,
}

/// Runner answering commands from `(prefix, code, output)` rules.
///
/// The most recently added matching rule wins. Commands with no matching
/// rule exit 0 with empty output.
#[derive(Default)]
pub struct MockRunner {
    rules: RefCell<Vec<Rule>>,
    calls: RefCell<Vec<String>>,
}

impl MockRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every command starting with the tokens of `prefix`.
    pub fn with(self, prefix: &str, code: i32, output: &str) -> Self {
        self.rules.borrow_mut().push(Rule {
            prefix: prefix.split_whitespace().map(String::from).collect(),
            code,
            output: output.to_string(),
        });
        self
    }

    /// Every command issued so far, space-joined, without the `git` prefix.
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    /// Number of issued commands starting with `prefix`.
    pub fn count(&self, prefix: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|call| call.starts_with(prefix))
            .count()
    }

    pub fn handle(&self) -> RepositoryHandle<&Self> {
        RepositoryHandle::with_runner("/work/repo", self)
    }
}

impl CommandRunner for MockRunner {
    fn run(&self, _cwd: &Path, args: &[&str]) -> GitResult<CommandResult> {
        self.calls.borrow_mut().push(args.join(" "));

        let rules = self.rules.borrow();
        let matched = rules.iter().rev().find(|rule| {
            rule.prefix.len() <= args.len()
                && rule.prefix.iter().zip(args).all(|(want, got)| want == got)
        });

        Ok(match matched {
            Some(rule) => CommandResult::new(rule.code, rule.output.clone()),
            None => CommandResult::new(0, ""),
        })
    }
}
