//! Build error types.
//!
//! Two kinds of failure exist. A [`BuildError`] ends the whole run: a cyclic
//! import graph, a toolchain that cannot be started, an ambiguous request.
//! A [`StepFailure`] belongs to one node; it is recorded, reported, and the
//! run goes on with whatever does not depend on that node.

use std::fmt;

use miette::Diagnostic as MietteDiagnostic;
use serde::Serialize;
use thiserror::Error;

use crate::util::diagnostic::Diagnostic;

/// Fatal build errors.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum BuildError {
    #[error("cyclic dependency on package `{package}`")]
    #[diagnostic(
        code(gobuild::build::cyclic_dependency),
        help("packages must not import each other, directly or indirectly")
    )]
    CyclicDependency {
        package: String,
        /// Packages from the build target down to the re-entered one
        chain: Vec<String>,
    },

    #[error("failed to launch `{program}`: {message}")]
    #[diagnostic(
        code(gobuild::build::toolchain_launch),
        help("check the `[toolchain]` section of the configuration or your PATH")
    )]
    ToolchainLaunch { program: String, message: String },

    #[error("more than one file declares `func main`")]
    #[diagnostic(
        code(gobuild::build::multiple_entry_points),
        help("name the file to build, or pass `--all` to build every one of them")
    )]
    MultipleEntryPoints { candidates: Vec<String> },

    #[error("no file declares `func main` in package main")]
    #[diagnostic(code(gobuild::build::no_entry_point))]
    NoEntryPoint,

    #[error("`{file}` does not declare `func main` in package main")]
    #[diagnostic(code(gobuild::build::unknown_entry_file))]
    UnknownEntryFile { file: String, candidates: Vec<String> },

    #[error("`--output` can only be used with a single target ({count} selected)")]
    #[diagnostic(code(gobuild::build::output_with_multiple_targets))]
    OutputWithMultipleTargets { count: usize },

    #[error("no package with test or benchmark functions found")]
    #[diagnostic(
        code(gobuild::build::no_test_packages),
        help("test functions live in files ending in `_test.go`")
    )]
    NoTestPackages,

    #[error("unsupported architecture `{arch}`")]
    #[diagnostic(
        code(gobuild::build::unsupported_arch),
        help("supported architectures: amd64, 386, arm")
    )]
    UnsupportedArch { arch: String },

    #[error("toolchain program `{tool}` not found")]
    #[diagnostic(
        code(gobuild::build::tool_not_found),
        help("set GOBIN, add the toolchain to PATH, or configure it under `[toolchain]`")
    )]
    ToolNotFound { tool: String },
}

impl BuildError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let mut diag = Diagnostic::error(self.to_string());

        match self {
            BuildError::CyclicDependency { chain, .. } if !chain.is_empty() => {
                diag = diag.with_context(format!("import chain: {}", chain.join(" -> ")));
            }
            BuildError::MultipleEntryPoints { candidates } => {
                for candidate in candidates {
                    diag = diag.with_context(format!("candidate: {}", candidate));
                }
            }
            BuildError::UnknownEntryFile { file, candidates } => {
                diag = diag.with_location(file);
                for candidate in candidates {
                    diag = diag.with_context(format!("candidate: {}", candidate));
                }
            }
            _ => {}
        }

        if let Some(help) = MietteDiagnostic::help(self) {
            diag = diag.with_suggestion(help.to_string());
        }

        diag
    }
}

/// Build step kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    Compile,
    Link,
    Archive,
    Run,
}

impl Step {
    pub fn as_str(&self) -> &'static str {
        match self {
            Step::Compile => "compile",
            Step::Link => "link",
            Step::Archive => "archive",
            Step::Run => "run",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A non-fatal failure of one node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum StepFailure {
    /// A package that must be built from source has no files
    MissingFiles { package: String },

    /// A foreign-binding package without a prebuilt archive
    UnsupportedForeignBinding { package: String, archive: String },

    /// The toolchain ran and reported failure
    ToolchainExit {
        package: String,
        step: Step,
        code: Option<i32>,
    },

    /// A dependency failed, so this node was not attempted
    DependencyFailed { package: String, dependency: String },
}

impl StepFailure {
    /// Package the failure belongs to.
    pub fn package(&self) -> &str {
        match self {
            StepFailure::MissingFiles { package }
            | StepFailure::UnsupportedForeignBinding { package, .. }
            | StepFailure::ToolchainExit { package, .. }
            | StepFailure::DependencyFailed { package, .. } => package,
        }
    }
}

impl fmt::Display for StepFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepFailure::MissingFiles { package } => {
                write!(f, "no files found for package `{}`", package)
            }
            StepFailure::UnsupportedForeignBinding { package, archive } => write!(
                f,
                "package `{}` uses foreign bindings, unsupported, compile by hand into `{}`",
                package, archive
            ),
            StepFailure::ToolchainExit {
                package,
                step,
                code,
            } => match code {
                Some(code) => write!(f, "{} of `{}` failed with exit code {}", step, package, code),
                None => write!(f, "{} of `{}` was terminated by a signal", step, package),
            },
            StepFailure::DependencyFailed {
                package,
                dependency,
            } => write!(
                f,
                "`{}` not built because dependency `{}` failed",
                package, dependency
            ),
        }
    }
}
