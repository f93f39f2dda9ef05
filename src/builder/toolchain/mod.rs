//! Toolchain abstraction for the Go `gc` compiler family.
//!
//! This module provides a unified interface for generating compiler, linker
//! and archiver commands. The orchestrator never spells out a command line
//! itself; it asks a [`Toolchain`] for a [`CommandSpec`] and hands that to a
//! [`CommandRunner`](crate::builder::runner::CommandRunner).
//!
//! Toolchain detection priority:
//! 1. Config file (`[toolchain]` in `.gobuild/config.toml` or `~/.gobuild/config.toml`)
//! 2. The `GOBIN` directory
//! 3. Searching PATH

use std::fmt;
use std::path::{Path, PathBuf};

use crate::builder::errors::BuildError;

mod detect;
mod gc;

pub use detect::detect_toolchain;
pub use gc::GcToolchain;

/// A command to execute: program and arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// The program to run (e.g., "6g", "/usr/local/go/bin/6l")
    pub program: PathBuf,
    /// Command arguments
    pub args: Vec<String>,
}

impl CommandSpec {
    /// Create a new command spec.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        CommandSpec {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Add an argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add multiple arguments.
    pub fn args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args.extend(args.into_iter().map(|a| a.into()));
        self
    }

    /// The command as a single line, for logs and verbose output.
    pub fn display(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

/// Target architecture of the `gc` toolchain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arch {
    Amd64,
    I386,
    Arm,
}

impl Arch {
    /// Parse a `GOARCH` value.
    pub fn from_goarch(s: &str) -> Result<Self, BuildError> {
        match s {
            "amd64" => Ok(Arch::Amd64),
            "386" => Ok(Arch::I386),
            "arm" => Ok(Arch::Arm),
            other => Err(BuildError::UnsupportedArch {
                arch: other.to_string(),
            }),
        }
    }

    /// Architecture of the machine gobuild runs on.
    pub fn host() -> Result<Self, BuildError> {
        match std::env::consts::ARCH {
            "x86_64" => Ok(Arch::Amd64),
            "x86" => Ok(Arch::I386),
            "arm" => Ok(Arch::Arm),
            other => Err(BuildError::UnsupportedArch {
                arch: other.to_string(),
            }),
        }
    }

    /// The `GOARCH` spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Arch::Amd64 => "amd64",
            Arch::I386 => "386",
            Arch::Arm => "arm",
        }
    }

    /// Tool and object-file character (`6g`, `8l`, `x.5`).
    pub fn letter(&self) -> &'static str {
        match self {
            Arch::Amd64 => "6",
            Arch::I386 => "8",
            Arch::Arm => "5",
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trait for toolchain implementations.
///
/// Each toolchain knows how to generate commands for its specific tools.
/// All paths are relative to the build root, which is the working
/// directory of every command.
pub trait Toolchain: Send + Sync {
    /// Get the target architecture.
    fn arch(&self) -> Arch;

    /// Compile all `files` of one package into the object file `output`.
    fn compile_command(&self, output: &Path, files: &[&Path], search_paths: &[&Path])
        -> CommandSpec;

    /// Link the object file of an entry package into the executable `output`.
    fn link_command(&self, output: &Path, object: &Path, search_paths: &[&Path]) -> CommandSpec;

    /// Pack an object file into the archive `archive`.
    fn archive_command(&self, archive: &Path, object: &Path) -> CommandSpec;

    /// Get the object file extension (without the dot).
    fn object_extension(&self) -> &str;

    /// Get the archive extension (without the dot).
    fn archive_extension(&self) -> &str {
        "a"
    }
}
