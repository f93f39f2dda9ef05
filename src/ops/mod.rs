//! High-level operations.
//!
//! This module contains the implementation of gobuild commands. Each build
//! mode is a thin policy over discovery and the orchestrator.

pub mod discover;
pub mod gobuild_build;
pub mod gobuild_lib;
pub mod report;

pub use discover::discover_packages;
pub use gobuild_build::{build, BuildOptions};
pub use gobuild_lib::{build_libraries, LibOptions};
pub use gobuild_test::{test, TestOptions};
pub use report::BuildReport;
