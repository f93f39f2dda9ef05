//! Source files and the facts extracted from them.

use std::path::{Path, PathBuf};

/// Reserved package name of an executable root.
pub const ENTRY_PACKAGE: &str = "main";

/// Name of the entry function inside [`ENTRY_PACKAGE`].
pub const ENTRY_FUNCTION: &str = "main";

/// Import string of the foreign-function interface pseudo package.
pub const FOREIGN_IMPORT: &str = "C";

/// Extension of Go source files (without the dot).
pub const SOURCE_EXTENSION: &str = "go";

/// Suffix marking a test file.
pub const TEST_FILE_SUFFIX: &str = "_test.go";

/// Facts reported by the parser for a single file.
///
/// This is the closed structure the core works with; the parser reduces
/// the syntax tree to it once and nothing downstream looks at syntax again.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceFacts {
    /// Package name from the package clause
    pub declared_package: String,
    /// Raw import paths, unquoted, in source order
    pub imports: Vec<String>,
    /// A receiver-less `func main` inside package `main`
    pub has_entry_point: bool,
    /// `Test*` functions (test files only)
    pub test_functions: Vec<String>,
    /// `Benchmark*` functions (test files only)
    pub benchmark_functions: Vec<String>,
}

impl SourceFacts {
    /// Create facts for a file declaring `package`.
    pub fn new(package: impl Into<String>) -> Self {
        SourceFacts {
            declared_package: package.into(),
            ..Default::default()
        }
    }

    /// Add an import path.
    pub fn with_import(mut self, import: impl Into<String>) -> Self {
        self.imports.push(import.into());
        self
    }

    /// Mark the file as declaring the entry function.
    pub fn with_entry_point(mut self) -> Self {
        self.has_entry_point = true;
        self
    }

    /// Add a test function name.
    pub fn with_test(mut self, name: impl Into<String>) -> Self {
        self.test_functions.push(name.into());
        self
    }

    /// Add a benchmark function name.
    pub fn with_benchmark(mut self, name: impl Into<String>) -> Self {
        self.benchmark_functions.push(name.into());
        self
    }
}

/// A discovered source file.
///
/// Files are immutable once registered; the owning package identity is
/// filled in by the registry right before the file is shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    path: PathBuf,
    declared_package: String,
    package: String,
    has_entry_point: bool,
    is_foreign_binding: bool,
    is_test_file: bool,
    test_functions: Vec<String>,
    benchmark_functions: Vec<String>,
}

impl SourceFile {
    /// Build a file from its path (relative to the build root) and parsed facts.
    pub fn new(path: impl Into<PathBuf>, facts: &SourceFacts) -> Self {
        let path = path.into();
        let is_test_file = is_test_file(&path);
        let is_foreign_binding = facts.imports.iter().any(|i| i == FOREIGN_IMPORT);

        SourceFile {
            declared_package: facts.declared_package.clone(),
            package: facts.declared_package.clone(),
            has_entry_point: facts.has_entry_point
                && facts.declared_package == ENTRY_PACKAGE,
            is_foreign_binding,
            is_test_file,
            test_functions: ordered_set(&facts.test_functions),
            benchmark_functions: ordered_set(&facts.benchmark_functions),
            path,
        }
    }

    /// Path relative to the build root.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Package name as written in the file.
    pub fn declared_package(&self) -> &str {
        &self.declared_package
    }

    /// Identity of the package this file was registered into.
    pub fn package(&self) -> &str {
        &self.package
    }

    pub(crate) fn set_package(&mut self, identity: impl Into<String>) {
        self.package = identity.into();
    }

    pub fn has_entry_point(&self) -> bool {
        self.has_entry_point
    }

    pub fn is_foreign_binding(&self) -> bool {
        self.is_foreign_binding
    }

    pub fn is_test_file(&self) -> bool {
        self.is_test_file
    }

    pub fn test_functions(&self) -> &[String] {
        &self.test_functions
    }

    pub fn benchmark_functions(&self) -> &[String] {
        &self.benchmark_functions
    }

    /// Whether the file contributes anything to a test driver.
    pub fn has_test_content(&self) -> bool {
        !self.test_functions.is_empty() || !self.benchmark_functions.is_empty()
    }
}

/// Check whether a path names a Go test file.
pub fn is_test_file(path: &Path) -> bool {
    path.file_name()
        .map(|n| n.to_string_lossy().ends_with(TEST_FILE_SUFFIX))
        .unwrap_or(false)
}

/// Check whether a path names a Go source file.
pub fn is_source_file(path: &Path) -> bool {
    path.extension()
        .map(|e| e == SOURCE_EXTENSION)
        .unwrap_or(false)
}

/// Keep the first occurrence of every name.
fn ordered_set(names: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(names.len());
    for name in names {
        if !out.contains(name) {
            out.push(name.clone());
        }
    }
    out
}
