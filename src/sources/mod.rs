//! Reading a source tree.
//!
//! Sources are responsible for turning a directory of Go files into a
//! populated [`PackageRegistry`](crate::core::PackageRegistry).

pub mod discovery;
pub mod parser;
pub mod walker;

pub use discovery::{discover, Discovered, DiscoveryOptions, DiscoveryWarning};
pub use parser::{GoScanner, ParseWarning, SourceParser};
pub use walker::{walk, WalkEntry};
