//! Go source scanner.
//!
//! Extracts the handful of facts the build needs from a Go file: the package
//! clause, imports, top-level functions. It does not build a syntax tree;
//! comments are blanked out first so that commented-out code is ignored.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::core::source_file::{is_test_file, SourceFacts, ENTRY_FUNCTION, ENTRY_PACKAGE};

static PACKAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*package\s+([A-Za-z_][A-Za-z0-9_]*)").expect("valid package regex")
});

static IMPORT_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?ms)^\s*import\s*\((.*?)\)").expect("valid import block regex")
});

static IMPORT_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^\s*import\s+(?:[A-Za-z_.][A-Za-z0-9_]*\s+)?["`]([^"`]*)["`]"#)
        .expect("valid import regex")
});

static IMPORT_SPEC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:[A-Za-z_.][A-Za-z0-9_]*\s+)?["`]([^"`]*)["`]"#)
        .expect("valid import spec regex")
});

static FUNC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*func\s+([A-Za-z_][A-Za-z0-9_]*)\s*(?:\[[^\]]*\])?\s*\(")
        .expect("valid func regex")
});

/// A file that could not be scanned. The file is skipped, the build goes on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseWarning {
    pub path: PathBuf,
    pub message: String,
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "parsing {} failed: {}", self.path.display(), self.message)
    }
}

/// Turns source text into [`SourceFacts`].
pub trait SourceParser {
    fn parse(&self, path: &Path, content: &str) -> Result<SourceFacts, ParseWarning>;
}

/// Regex based scanner for Go sources.
#[derive(Debug, Clone, Copy, Default)]
pub struct GoScanner;

impl GoScanner {
    pub fn new() -> Self {
        GoScanner
    }
}

impl SourceParser for GoScanner {
    fn parse(&self, path: &Path, content: &str) -> Result<SourceFacts, ParseWarning> {
        let code = strip_comments(content);

        let package = PACKAGE_RE
            .captures(&code)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| ParseWarning {
                path: path.to_path_buf(),
                message: "missing package clause".to_string(),
            })?;

        let mut facts = SourceFacts::new(package);
        facts.imports = scan_imports(&code);

        let test_file = is_test_file(path);
        for (name, has_body) in scan_functions(&code) {
            if name == ENTRY_FUNCTION && facts.declared_package == ENTRY_PACKAGE {
                facts.has_entry_point = true;
            } else if test_file && has_body && is_test_name(&name, "Test") {
                facts.test_functions.push(name);
            } else if test_file && has_body && is_test_name(&name, "Benchmark") {
                facts.benchmark_functions.push(name);
            }
        }

        Ok(facts)
    }
}

/// `TestXxx` style names: the prefix followed by nothing or a non-lowercase char.
fn is_test_name(name: &str, prefix: &str) -> bool {
    match name.strip_prefix(prefix) {
        Some(rest) => rest.chars().next().map_or(true, |c| !c.is_lowercase()),
        None => false,
    }
}

/// Import paths in source order.
fn scan_imports(code: &str) -> Vec<String> {
    let mut found: Vec<(usize, String)> = Vec::new();

    for block in IMPORT_BLOCK_RE.captures_iter(code) {
        let Some(body) = block.get(1) else { continue };
        for spec in IMPORT_SPEC_RE.captures_iter(body.as_str()) {
            if let Some(m) = spec.get(1) {
                found.push((body.start() + m.start(), m.as_str().to_string()));
            }
        }
    }

    for line in IMPORT_LINE_RE.captures_iter(code) {
        if let Some(m) = line.get(1) {
            found.push((m.start(), m.as_str().to_string()));
        }
    }

    found.sort_by_key(|(pos, _)| *pos);
    found.into_iter().map(|(_, import)| import).collect()
}

/// Top-level, receiver-less functions and whether each has a body.
fn scan_functions(code: &str) -> Vec<(String, bool)> {
    FUNC_RE
        .captures_iter(code)
        .filter_map(|c| {
            let name = c.get(1)?.as_str().to_string();
            let rest = &code[c.get(0)?.end()..];
            Some((name, has_body(rest)))
        })
        .collect()
}

/// Scan a declaration starting just after the opening parenthesis of its
/// parameter list. A `{` at nesting depth zero before the end of the line
/// that closes the signature means the function has a body.
fn has_body(rest: &str) -> bool {
    let mut depth = 1usize;
    for ch in rest.chars() {
        match ch {
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            '{' if depth == 0 => return true,
            '\n' if depth == 0 => return false,
            _ => {}
        }
    }
    false
}

/// Replace comments with whitespace, leaving string and rune literals alone.
/// Newlines inside block comments are kept so line structure survives.
fn strip_comments(src: &str) -> String {
    #[derive(Clone, Copy, PartialEq)]
    enum State {
        Code,
        Line,
        Block,
        Str,
        Raw,
        Rune,
    }

    let mut out = String::with_capacity(src.len());
    let mut state = State::Code;
    let mut chars = src.chars().peekable();

    while let Some(ch) = chars.next() {
        match state {
            State::Code => match ch {
                '/' if chars.peek() == Some(&'/') => {
                    chars.next();
                    out.push_str("  ");
                    state = State::Line;
                }
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    out.push_str("  ");
                    state = State::Block;
                }
                '"' => {
                    out.push(ch);
                    state = State::Str;
                }
                '`' => {
                    out.push(ch);
                    state = State::Raw;
                }
                '\'' => {
                    out.push(ch);
                    state = State::Rune;
                }
                _ => out.push(ch),
            },
            State::Line => {
                if ch == '\n' {
                    out.push('\n');
                    state = State::Code;
                } else {
                    out.push(' ');
                }
            }
            State::Block => {
                if ch == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    out.push_str("  ");
                    state = State::Code;
                } else if ch == '\n' {
                    out.push('\n');
                } else {
                    out.push(' ');
                }
            }
            State::Str | State::Rune => {
                out.push(ch);
                let close = if state == State::Str { '"' } else { '\'' };
                if ch == '\\' {
                    if let Some(escaped) = chars.next() {
                        out.push(escaped);
                    }
                } else if ch == close || ch == '\n' {
                    state = State::Code;
                }
            }
            State::Raw => {
                out.push(ch);
                if ch == '`' {
                    state = State::Code;
                }
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(path: &str, src: &str) -> SourceFacts {
        GoScanner::new().parse(Path::new(path), src).unwrap()
    }

    #[test]
    fn test_simple_main() {
        let facts = parse(
            "main.go",
            "package main\n\nimport \"fmt\"\n\nfunc main() {\n\tfmt.Println(\"hi\")\n}\n",
        );
        assert_eq!(facts.declared_package, "main");
        assert_eq!(facts.imports, ["fmt"]);
        assert!(facts.has_entry_point);
    }

    #[test]
    fn test_grouped_and_named_imports() {
        let src = r#"package main

import (
	"fmt"
	u "./util"
	. "./dot"
)
import os "os"

func helper() {}
"#;
        let facts = parse("main.go", src);
        assert_eq!(facts.imports, ["fmt", "./util", "./dot", "os"]);
        assert!(!facts.has_entry_point);
    }

    #[test]
    fn test_main_outside_main_package_is_not_entry() {
        let facts = parse("util/util.go", "package util\n\nfunc main() {}\n");
        assert!(!facts.has_entry_point);
    }

    #[test]
    fn test_methods_are_ignored() {
        let src = "package main\n\ntype T struct{}\n\nfunc (t T) main() {}\n";
        let facts = parse("main.go", src);
        assert!(!facts.has_entry_point);
    }

    #[test]
    fn test_commented_code_is_ignored() {
        let src = "package main\n\n// func main() {}\n/*\nimport \"os\"\nfunc main() {}\n*/\nvar s = \"// not a comment\"\n";
        let facts = parse("main.go", src);
        assert!(!facts.has_entry_point);
        assert!(facts.imports.is_empty());
    }

    #[test]
    fn test_tests_and_benchmarks_in_test_files() {
        let src = r#"package util

import "testing"

func TestReverse(t *testing.T) {
}

func Testify() {}

func BenchmarkReverse(b *testing.B) {
}

func TestNoBody(t *testing.T)

func helper() {}
"#;
        let facts = parse("util/util_test.go", src);
        assert_eq!(facts.test_functions, ["TestReverse"]);
        assert_eq!(facts.benchmark_functions, ["BenchmarkReverse"]);

        // the same code in a non-test file contributes nothing
        let facts = parse("util/util.go", src);
        assert!(facts.test_functions.is_empty());
        assert!(facts.benchmark_functions.is_empty());
    }

    #[test]
    fn test_multiline_signature_has_body() {
        let src = "package util\n\nfunc TestLong(\n\tt *testing.T,\n) {\n}\n";
        let facts = parse("util/long_test.go", src);
        assert_eq!(facts.test_functions, ["TestLong"]);
    }

    #[test]
    fn test_foreign_import() {
        let facts = parse("sys/sys.go", "package sys\n\nimport \"C\"\n");
        assert_eq!(facts.imports, ["C"]);
    }

    #[test]
    fn test_missing_package_clause() {
        let err = GoScanner::new()
            .parse(Path::new("broken.go"), "func main() {}\n")
            .unwrap_err();
        assert_eq!(err.path, PathBuf::from("broken.go"));
        assert!(err.to_string().contains("missing package clause"));
    }

    #[test]
    fn test_is_test_name() {
        assert!(is_test_name("Test", "Test"));
        assert!(is_test_name("TestFoo", "Test"));
        assert!(is_test_name("Test_foo", "Test"));
        assert!(!is_test_name("Testify", "Test"));
        assert!(!is_test_name("Foo", "Test"));
    }
}
