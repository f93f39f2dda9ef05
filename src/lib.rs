//! gobuild - a build orchestrator for Go source trees
//!
//! This crate provides the library behind the `gobuild` binary: discovering
//! packages in a directory tree, ordering them by their imports and driving
//! the `gc` compiler, linker and archiver over them.

pub mod builder;
pub mod core;
pub mod ops;
pub mod sources;
pub mod util;

/// Test utilities and mocks for gobuild unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides a scripted command runner and on-disk
/// source-tree fixtures.
#[cfg(test)]
pub mod test_support;

pub use core::{NodeKey, PackageKind, PackageNode, PackageRegistry, SourceFile};

pub use builder::{BuildContext, BuildError, Orchestrator};
pub use ops::BuildReport;
pub use util::context::GlobalContext;
