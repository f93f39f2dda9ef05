//! Package nodes of the dependency graph.
//!
//! Nodes never own each other. Dependencies are stored as identities and
//! resolved through the [`PackageRegistry`](crate::core::PackageRegistry),
//! which keeps ownership acyclic even when the import graph is not.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::core::source_file::{SourceFile, ENTRY_PACKAGE};

/// Where a package lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PackageKind {
    /// Not yet known to be in the tree (toolchain package or ambiguous import)
    Unresolved,
    /// A remote import path; recognized but never fetched
    External,
    /// Proven to live in the source tree
    Local,
}

impl PackageKind {
    /// Combine two classifications. `Local` always wins.
    pub fn promote(self, other: PackageKind) -> PackageKind {
        if self == PackageKind::Local || other == PackageKind::Local {
            PackageKind::Local
        } else {
            other
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PackageKind::Unresolved => "unresolved",
            PackageKind::External => "external",
            PackageKind::Local => "local",
        }
    }
}

impl fmt::Display for PackageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Address of a node: shared packages by identity, entry candidates by file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeKey {
    Package(String),
    EntryFile(PathBuf),
}

impl NodeKey {
    pub fn package(identity: impl Into<String>) -> Self {
        NodeKey::Package(identity.into())
    }

    pub fn entry_file(path: impl Into<PathBuf>) -> Self {
        NodeKey::EntryFile(path.into())
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKey::Package(identity) => write!(f, "{}", identity),
            NodeKey::EntryFile(path) => write!(f, "{}", path.display()),
        }
    }
}

/// A package in the build graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageNode {
    identity: String,
    kind: PackageKind,
    files: Vec<Arc<SourceFile>>,
    dependencies: Vec<String>,
    output_name: String,
}

impl PackageNode {
    /// Create an empty, unresolved package.
    pub fn new(identity: impl Into<String>) -> Self {
        let identity = identity.into();
        PackageNode {
            output_name: identity.clone(),
            identity,
            kind: PackageKind::Unresolved,
            files: Vec::new(),
            dependencies: Vec::new(),
        }
    }

    /// Set the kind, builder style.
    pub fn with_kind(mut self, kind: PackageKind) -> Self {
        self.kind = kind;
        self
    }

    /// Set the artifact name, builder style.
    pub fn with_output_name(mut self, name: impl Into<String>) -> Self {
        self.output_name = name.into();
        self
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn kind(&self) -> PackageKind {
        self.kind
    }

    pub fn is_local(&self) -> bool {
        self.kind == PackageKind::Local
    }

    /// The reserved executable-root package.
    pub fn is_entry_package(&self) -> bool {
        self.identity == ENTRY_PACKAGE
    }

    pub fn files(&self) -> &[Arc<SourceFile>] {
        &self.files
    }

    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    /// Artifact name without extension, relative to the build root.
    pub fn output_name(&self) -> &str {
        &self.output_name
    }

    /// Path of an artifact with the given extension.
    pub fn artifact_path(&self, extension: &str) -> PathBuf {
        if extension.is_empty() {
            PathBuf::from(&self.output_name)
        } else {
            PathBuf::from(format!("{}.{}", self.output_name, extension))
        }
    }

    pub fn has_files(&self) -> bool {
        !self.files.is_empty()
    }

    /// Any file imports the foreign-function pseudo package.
    pub fn has_foreign_binding(&self) -> bool {
        self.files.iter().any(|f| f.is_foreign_binding())
    }

    /// Any file declares test or benchmark functions.
    pub fn has_test_content(&self) -> bool {
        self.files.iter().any(|f| f.has_test_content())
    }

    /// Test functions across all files, in file order.
    pub fn test_functions(&self) -> Vec<&str> {
        collect_names(&self.files, |f| f.test_functions())
    }

    /// Benchmark functions across all files, in file order.
    pub fn benchmark_functions(&self) -> Vec<&str> {
        collect_names(&self.files, |f| f.benchmark_functions())
    }

    /// File paths in registration order.
    pub fn file_paths(&self) -> Vec<&Path> {
        self.files.iter().map(|f| f.path()).collect()
    }

    pub(crate) fn set_kind(&mut self, kind: PackageKind) {
        self.kind = self.kind.promote(kind);
    }

    /// Add a file unless a file with the same path is already present.
    pub fn add_file(&mut self, file: Arc<SourceFile>) -> bool {
        if self.files.iter().any(|f| f.path() == file.path()) {
            return false;
        }
        self.files.push(file);
        true
    }

    /// Add a dependency edge unless it already exists.
    pub fn add_dependency(&mut self, identity: impl Into<String>) -> bool {
        let identity = identity.into();
        if self.dependencies.contains(&identity) {
            return false;
        }
        self.dependencies.push(identity);
        true
    }

    /// Append another node's files and dependencies.
    ///
    /// Everything is de-duplicated by identity (file path, dependency name),
    /// so merging the same source twice changes nothing the second time.
    /// Returns the number of files and dependencies actually added.
    pub fn merge(&mut self, other: &PackageNode) -> (usize, usize) {
        let files = other
            .files
            .iter()
            .filter(|f| self.add_file(Arc::clone(f)))
            .count();
        let deps = other
            .dependencies
            .iter()
            .filter(|d| self.add_dependency(d.as_str()))
            .count();

        if other.is_local() {
            self.set_kind(PackageKind::Local);
        }

        (files, deps)
    }
}

impl fmt::Display for PackageNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.identity)
    }
}

fn collect_names<'a>(
    files: &'a [Arc<SourceFile>],
    names: impl Fn(&'a SourceFile) -> &'a [String],
) -> Vec<&'a str> {
    let mut out: Vec<&str> = Vec::new();
    for file in files {
        for name in names(file.as_ref()) {
            if !out.contains(&name.as_str()) {
                out.push(name);
            }
        }
    }
    out
}
