//! Test fixtures for common test scenarios.
//!
//! This module provides pre-built Go source trees written to temporary
//! directories.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A source tree on disk, removed when dropped.
#[derive(Debug)]
pub struct SourceTree {
    dir: TempDir,
}

impl SourceTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        SourceTree {
            dir: TempDir::new().expect("failed to create temp dir"),
        }
    }

    /// A program `main.go` importing `fmt` and the local package `./util`.
    pub fn hello_with_util() -> Self {
        let tree = SourceTree::new();
        tree.write("main.go", hello_main());
        tree.write("util/util.go", util_package());
        tree
    }

    /// `hello_with_util` plus a test file for `util`.
    pub fn with_tests() -> Self {
        let tree = SourceTree::hello_with_util();
        tree.write("util/util_test.go", util_test());
        tree
    }

    /// Two programs sharing one local package.
    pub fn two_programs() -> Self {
        let tree = SourceTree::new();
        tree.write("cmd/server.go", &main_importing("./util"));
        tree.write("cmd/client.go", &main_importing("./util"));
        tree.write("util/util.go", util_package());
        tree
    }

    /// Write a file relative to the root, creating parent directories.
    pub fn write(&self, rel: impl AsRef<Path>, content: &str) -> PathBuf {
        let path = self.dir.path().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("failed to create fixture dir");
        }
        std::fs::write(&path, content).expect("failed to write fixture");
        path
    }

    /// Root directory of the tree.
    pub fn root(&self) -> &Path {
        self.dir.path()
    }
}

impl Default for SourceTree {
    fn default() -> Self {
        SourceTree::new()
    }
}

/// Entry file of the hello program.
pub fn hello_main() -> &'static str {
    r#"package main

import (
	"fmt"
	"./util"
)

func main() {
	fmt.Println(util.Reverse("hello"))
}
"#
}

/// The `util` package.
pub fn util_package() -> &'static str {
    r#"package util

// Reverse returns s reversed.
func Reverse(s string) string {
	r := []byte(s)
	for i, j := 0, len(r)-1; i < j; i, j = i+1, j-1 {
		r[i], r[j] = r[j], r[i]
	}
	return string(r)
}
"#
}

/// Tests and a benchmark for `util`.
pub fn util_test() -> &'static str {
    r#"package util

import "testing"

func TestReverse(t *testing.T) {
	if Reverse("ab") != "ba" {
		t.Fail()
	}
}

func TestReverseEmpty(t *testing.T) {
	if Reverse("") != "" {
		t.Fail()
	}
}

func BenchmarkReverse(b *testing.B) {
	for i := 0; i < b.N; i++ {
		Reverse("hello")
	}
}
"#
}

/// An entry file importing one package.
pub fn main_importing(import: &str) -> String {
    format!("package main\n\nimport \"{}\"\n\nfunc main() {{\n}}\n", import)
}
