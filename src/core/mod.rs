//! Core data structures for gobuild.
//!
//! This module contains the foundational types used throughout gobuild:
//! - Source files and the facts parsed out of them
//! - Package identity derivation and import classification
//! - Package nodes and the registry that interns them

pub mod classify;
pub mod package;
pub mod registry;
pub mod source_file;

pub use classify::{classify_file, classify_import, Classification, ImportClass, PathWarning};
pub use package::{NodeKey, PackageKind, PackageNode};
pub use registry::{MergeOutcome, PackageRegistry};
pub use source_file::{SourceFacts, SourceFile, ENTRY_PACKAGE};
