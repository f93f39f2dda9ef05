//! Test utilities and mocks for gobuild unit tests.
//!
//! This module provides a scripted [`CommandRunner`] so the orchestrator and
//! the build-mode policies can be exercised without a Go toolchain, plus
//! on-disk source-tree fixtures.
//!
//! # Example
//!
//! ```rust,ignore
//! use gobuild::test_support::{MockRunner, SourceTree, test_context};
//!
//! #[test]
//! fn test_example() {
//!     let tree = SourceTree::hello_with_util();
//!     let runner = MockRunner::new().fail_when("util/util.go", 1);
//!     let ctx = test_context(tree.root());
//!
//!     // Build with the mock runner...
//!     assert_eq!(runner.calls_matching("6g"), 1);
//! }
//! ```

pub mod fixtures;

use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::{bail, Result};

use crate::builder::context::BuildContext;
use crate::builder::runner::{CommandRunner, ToolOutcome};
use crate::builder::toolchain::{Arch, CommandSpec, GcToolchain};
use crate::util::shell::{ColorChoice, Shell};

// Re-export fixtures for convenience
pub use fixtures::*;

/// Pattern for matching commands in MockRunner.
#[derive(Debug, Clone)]
pub enum CommandPattern {
    /// Exact match on full command string.
    Exact(String),
    /// Match if command starts with prefix.
    StartsWith(String),
    /// Match if command contains substring.
    Contains(String),
}

impl CommandPattern {
    /// Check if this pattern matches the given command.
    pub fn matches(&self, cmd: &str) -> bool {
        match self {
            CommandPattern::Exact(s) => cmd == s,
            CommandPattern::StartsWith(s) => cmd.starts_with(s),
            CommandPattern::Contains(s) => cmd.contains(s),
        }
    }
}

/// What a scripted command does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockBehavior {
    /// The command runs and ends this way.
    Finish(ToolOutcome),
    /// The command cannot be launched.
    LaunchError,
}

/// Mock command runner.
///
/// Every command is recorded as its display string. Commands matching no
/// expectation succeed.
#[derive(Debug, Default)]
pub struct MockRunner {
    expectations: Vec<(CommandPattern, MockBehavior)>,
    calls: Mutex<Vec<String>>,
}

impl MockRunner {
    /// Create a runner where every command succeeds.
    pub fn new() -> Self {
        MockRunner::default()
    }

    /// Commands containing `substring` exit with `code`.
    pub fn fail_when(mut self, substring: &str, code: i32) -> Self {
        self.expectations.push((
            CommandPattern::Contains(substring.to_string()),
            MockBehavior::Finish(ToolOutcome::Failed { code: Some(code) }),
        ));
        self
    }

    /// Commands containing `substring` cannot be launched.
    pub fn launch_error_when(mut self, substring: &str) -> Self {
        self.expectations.push((
            CommandPattern::Contains(substring.to_string()),
            MockBehavior::LaunchError,
        ));
        self
    }

    /// Add a custom expectation.
    pub fn expect(mut self, pattern: CommandPattern, behavior: MockBehavior) -> Self {
        self.expectations.push((pattern, behavior));
        self
    }

    /// Get all commands that were run, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Number of recorded commands containing `substring`.
    pub fn calls_matching(&self, substring: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.contains(substring))
            .count()
    }
}

impl CommandRunner for MockRunner {
    fn run(&self, command: &CommandSpec) -> Result<ToolOutcome> {
        let full_cmd = command.display();
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(full_cmd.clone());
        }

        let behavior = self
            .expectations
            .iter()
            .find(|(pattern, _)| pattern.matches(&full_cmd))
            .map(|(_, behavior)| *behavior);

        match behavior {
            Some(MockBehavior::LaunchError) => bail!("failed to execute `{}`", full_cmd),
            Some(MockBehavior::Finish(outcome)) => Ok(outcome),
            None => Ok(ToolOutcome::Success),
        }
    }
}

/// A build context with the default amd64 tool names and a silent shell.
pub fn test_context(root: &Path) -> BuildContext {
    test_context_with_shell(root, Shell::from_flags(true, false, false, ColorChoice::Never, false))
}

/// A build context with the default amd64 tool names and the given shell.
pub fn test_context_with_shell(root: &Path, shell: Shell) -> BuildContext {
    BuildContext::new(
        root,
        Arc::new(GcToolchain::with_default_names(Arch::Amd64)),
        Arc::new(shell),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_runner_scripts_outcomes() {
        let runner = MockRunner::new()
            .fail_when("bad.go", 2)
            .launch_error_when("missing-tool");

        let ok = runner.run(&CommandSpec::new("6g").arg("good.go")).unwrap();
        assert!(ok.success());

        let failed = runner.run(&CommandSpec::new("6g").arg("bad.go")).unwrap();
        assert_eq!(failed.code(), Some(2));

        assert!(runner.run(&CommandSpec::new("missing-tool")).is_err());
        assert_eq!(runner.calls(), ["6g good.go", "6g bad.go", "missing-tool"]);
        assert_eq!(runner.calls_matching("6g"), 2);
    }

    #[test]
    fn test_first_matching_expectation_wins() {
        let runner = MockRunner::new()
            .expect(
                CommandPattern::Exact("6l -o main main.6".into()),
                MockBehavior::Finish(ToolOutcome::Failed { code: None }),
            )
            .fail_when("6l", 1);

        let outcome = runner
            .run(&CommandSpec::new("6l").args(["-o", "main", "main.6"]))
            .unwrap();
        assert_eq!(outcome.code(), None);

        assert!(CommandPattern::StartsWith("6l".into()).matches("6l -o x"));
    }
}
