//! Package identity derivation and import classification.
//!
//! A package's identity is derived from the package name a file declares and
//! the directory the file sits in. Files whose location does not match the
//! declared name still get an identity, together with a [`PathWarning`];
//! such layouts usually fail later at link time but are never rejected here.

use std::fmt;
use std::path::Path;

use crate::core::package::PackageKind;
use crate::core::source_file::ENTRY_PACKAGE;

/// Prefix of an import that refers to a package in the same tree.
pub const LOCAL_IMPORT_PREFIX: &str = "./";

/// A file whose location disagrees with the package it declares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathWarning {
    /// File path relative to the build root
    pub file: String,
    /// Declared package name
    pub package: String,
    /// Where the file should live, when a single correction exists
    pub expected: Option<String>,
}

impl fmt::Display for PathWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.expected {
            Some(expected) => write!(
                f,
                "file {} from package {} is not in the correct path, expected `{}`",
                self.file, self.package, expected
            ),
            None => write!(
                f,
                "file {} from package {} is not in the expected directory",
                self.file, self.package
            ),
        }
    }
}

/// Identity assigned to a file plus an optional layout warning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub identity: String,
    pub warning: Option<PathWarning>,
}

/// A classified import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportClass {
    pub identity: String,
    pub kind: PackageKind,
}

/// Derive the package identity for a file.
///
/// `path` is relative to the build root and uses `/` separators.
pub fn classify_file(declared: &str, path: &str) -> Classification {
    if declared == ENTRY_PACKAGE {
        return Classification {
            identity: declared.to_string(),
            warning: None,
        };
    }

    let warn = |expected: Option<String>| PathWarning {
        file: path.to_string(),
        package: declared.to_string(),
        expected,
    };

    let segments: Vec<&str> = path.split('/').collect();
    match segments.len() {
        // File at the tree root. Root-level packages are discouraged.
        1 => Classification {
            identity: declared.to_string(),
            warning: Some(warn(Some(format!("{}/{}", declared, path)))),
        },
        2 => {
            let warning = (segments[0] != declared)
                .then(|| warn(Some(format!("{}/{}", declared, segments[1]))));
            Classification {
                identity: declared.to_string(),
                warning,
            }
        }
        n => {
            let parent = segments[n - 2];
            let warning = (!parent.ends_with(declared)).then(|| warn(None));
            let prefix = segments[..n - 2].join("/");
            Classification {
                identity: format!("{}/{}", prefix, declared),
                warning,
            }
        }
    }
}

/// Classify a raw (unquoted) import path.
///
/// `./x` is a local import keyed by `x`. A path whose first segment looks like
/// a host name is external. Anything else is unresolved: either a toolchain
/// package or an in-tree package imported without the local prefix.
pub fn classify_import(raw: &str) -> ImportClass {
    if let Some(stripped) = raw.strip_prefix(LOCAL_IMPORT_PREFIX) {
        let stripped = stripped.trim_end_matches('/');
        if !stripped.is_empty() {
            return ImportClass {
                identity: stripped.to_string(),
                kind: PackageKind::Local,
            };
        }
    }

    let first = raw.split('/').next().unwrap_or_default();
    let kind = if raw.contains('/') && first.contains('.') {
        PackageKind::External
    } else {
        PackageKind::Unresolved
    };

    ImportClass {
        identity: raw.to_string(),
        kind,
    }
}

/// Render a relative path with `/` separators regardless of platform.
pub fn normalize_separators(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_package_is_never_checked() {
        let c = classify_file("main", "deep/nested/dir/main.go");
        assert_eq!(c.identity, "main");
        assert!(c.warning.is_none());
    }

    #[test]
    fn test_root_level_package_warns() {
        let c = classify_file("util", "util.go");
        assert_eq!(c.identity, "util");
        let warning = c.warning.unwrap();
        assert_eq!(warning.expected.as_deref(), Some("util/util.go"));
    }

    #[test]
    fn test_single_directory_match() {
        let c = classify_file("util", "util/strings.go");
        assert_eq!(c.identity, "util");
        assert!(c.warning.is_none());
    }

    #[test]
    fn test_single_directory_mismatch_names_corrected_path() {
        let c = classify_file("other", "sub/util.go");
        assert_eq!(c.identity, "other");
        let warning = c.warning.unwrap();
        assert_eq!(warning.expected.as_deref(), Some("other/util.go"));
        assert!(warning.to_string().contains("`other/util.go`"));
    }

    #[test]
    fn test_nested_directory_keeps_prefix() {
        let c = classify_file("http", "net/http/server.go");
        assert_eq!(c.identity, "net/http");
        assert!(c.warning.is_none());

        let c = classify_file("c", "a/b/c/x.go");
        assert_eq!(c.identity, "a/b/c");
    }

    #[test]
    fn test_nested_directory_suffix_match() {
        // the parent segment only needs to end with the package name
        let c = classify_file("http", "net/gohttp/server.go");
        assert_eq!(c.identity, "net/http");
        assert!(c.warning.is_none());
    }

    #[test]
    fn test_nested_directory_mismatch() {
        let c = classify_file("json", "enc/xml/decode.go");
        assert_eq!(c.identity, "enc/json");
        let warning = c.warning.unwrap();
        assert!(warning.expected.is_none());
        assert!(warning.to_string().contains("not in the expected directory"));
    }

    #[test]
    fn test_classify_local_import() {
        let i = classify_import("./util");
        assert_eq!(i.identity, "util");
        assert_eq!(i.kind, PackageKind::Local);

        let i = classify_import("./net/http/");
        assert_eq!(i.identity, "net/http");
    }

    #[test]
    fn test_classify_other_imports() {
        assert_eq!(classify_import("fmt").kind, PackageKind::Unresolved);
        assert_eq!(classify_import("container/vector").kind, PackageKind::Unresolved);
        assert_eq!(classify_import("C").kind, PackageKind::Unresolved);
        assert_eq!(
            classify_import("github.com/user/pkg").kind,
            PackageKind::External
        );
        assert_eq!(classify_import("./").kind, PackageKind::Unresolved);
    }

    #[test]
    fn test_normalize_separators() {
        let path: std::path::PathBuf = ["a", "b", "c.go"].iter().collect();
        assert_eq!(normalize_separators(&path), "a/b/c.go");
    }
}
