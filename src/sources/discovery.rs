//! Discovery: the read pass over a source tree.
//!
//! Every Go file below the build root is parsed, classified and registered.
//! Nothing here is fatal for a single file; problems come back as
//! [`DiscoveryWarning`]s and the offending file is skipped or kept as is.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Result};

use crate::builder::testmain::DRIVER_FILE;
use crate::core::classify::{classify_file, classify_import, normalize_separators, PathWarning};
use crate::core::registry::PackageRegistry;
use crate::core::source_file::{is_source_file, is_test_file, SourceFile};
use crate::sources::parser::{ParseWarning, SourceParser};
use crate::sources::walker::walk;

/// Options for a discovery pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscoveryOptions {
    /// Descend into dot-prefixed directories and read dot-prefixed files
    pub include_hidden: bool,
    /// Register `_test.go` files
    pub include_tests: bool,
}

/// Non-fatal problem found while reading the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryWarning {
    /// The file could not be scanned and was skipped
    Parse(ParseWarning),
    /// The file sits in an unexpected directory; it was still registered
    Path(PathWarning),
    /// The file could not be read and was skipped
    Read { path: PathBuf, message: String },
}

impl fmt::Display for DiscoveryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscoveryWarning::Parse(w) => write!(f, "{}", w),
            DiscoveryWarning::Path(w) => write!(f, "{}", w),
            DiscoveryWarning::Read { path, message } => {
                write!(f, "failed to read {}: {}", path.display(), message)
            }
        }
    }
}

/// Result of a discovery pass.
#[derive(Debug, Default)]
pub struct Discovered {
    pub registry: PackageRegistry,
    pub warnings: Vec<DiscoveryWarning>,
}

/// Walk `root` and register every Go source file found.
pub fn discover(
    root: &Path,
    parser: &dyn SourceParser,
    options: DiscoveryOptions,
) -> Result<Discovered> {
    if !root.is_dir() {
        bail!("build root {} is not a directory", root.display());
    }

    let mut discovered = Discovered::default();

    for entry in walk(root, options.include_hidden) {
        if entry.is_dir || !wanted(&entry.path, options.include_tests) {
            continue;
        }

        match register_file(root, &entry.path, parser, &mut discovered.registry) {
            Ok(Some(warning)) => discovered.warnings.push(DiscoveryWarning::Path(warning)),
            Ok(None) => {}
            Err(warning) => {
                tracing::debug!("{}", warning);
                discovered.warnings.push(warning);
            }
        }
    }

    tracing::debug!(
        "discovered {} files in {} packages, {} entry files",
        discovered.registry.file_count(),
        discovered.registry.package_count(),
        discovered.registry.entry_count()
    );

    Ok(discovered)
}

fn wanted(path: &Path, include_tests: bool) -> bool {
    if !is_source_file(path) || path == Path::new(DRIVER_FILE) {
        return false;
    }
    include_tests || !is_test_file(path)
}

fn register_file(
    root: &Path,
    path: &Path,
    parser: &dyn SourceParser,
    registry: &mut PackageRegistry,
) -> Result<Option<PathWarning>, DiscoveryWarning> {
    let content = fs::read_to_string(root.join(path)).map_err(|e| DiscoveryWarning::Read {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let facts = parser
        .parse(path, &content)
        .map_err(DiscoveryWarning::Parse)?;

    let rel = normalize_separators(path);
    let classification = classify_file(&facts.declared_package, &rel);

    let mut dependencies = Vec::with_capacity(facts.imports.len());
    for import in &facts.imports {
        let class = classify_import(import);
        registry.ensure_dependency(&class);
        dependencies.push(class.identity);
    }

    let file = SourceFile::new(path, &facts);
    let key = registry.add_or_merge_file(file, &classification.identity, &dependencies);
    tracing::trace!("registered {} as {}", rel, key);

    Ok(classification.warning)
}
