//! Test driver synthesis.
//!
//! `gobuild test` collects every package declaring `TestXxx` (and optionally
//! `BenchmarkXxx`) functions and generates a single `main` package that
//! imports them all and hands their tables to the `testing` package. The
//! driver is then built like any other entry file.
//!
//! Generation is deterministic: packages are visited in lexical identity
//! order and functions in declaration order, so the same tree always yields
//! a byte-identical driver.

use std::collections::HashSet;
use std::fmt::Write;
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::core::package::{NodeKey, PackageKind, PackageNode};
use crate::core::registry::PackageRegistry;
use crate::core::source_file::{SourceFacts, SourceFile, ENTRY_PACKAGE};
use crate::util::fs::write_string;

/// Name of the generated driver source, at the build root.
pub const DRIVER_FILE: &str = "_testmain.go";

/// Executable produced from the driver.
pub const DRIVER_OUTPUT: &str = "_testmain";

const HEADER: &str = "// generated by gobuild, do not edit";

/// One imported package and its tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestPackage {
    pub identity: String,
    /// Sanitized identity used for the import alias and table names
    pub symbol: String,
    pub tests: Vec<String>,
    pub benchmarks: Vec<String>,
}

/// The set of packages a test driver runs.
#[derive(Debug, Clone, Default)]
pub struct TestHarness {
    packages: Vec<TestPackage>,
    benchmarks: bool,
}

impl TestHarness {
    /// Collect test packages from the registry.
    ///
    /// A package takes part when it has files and declares tests, or
    /// declares benchmarks while benchmarks are enabled. The entry package
    /// cannot be imported and is never included.
    pub fn collect(registry: &PackageRegistry, benchmarks: bool) -> Self {
        let mut taken = HashSet::new();
        let mut packages = Vec::new();

        for node in registry.packages() {
            if node.is_entry_package() || !node.has_files() {
                continue;
            }

            let tests: Vec<String> = node.test_functions().into_iter().map(String::from).collect();
            let benches: Vec<String> = if benchmarks {
                node.benchmark_functions()
                    .into_iter()
                    .map(String::from)
                    .collect()
            } else {
                Vec::new()
            };
            if tests.is_empty() && benches.is_empty() {
                continue;
            }

            let symbol = unique_symbol(node.identity(), &mut taken);
            tracing::debug!(
                "test package {}: {} tests, {} benchmarks",
                node.identity(),
                tests.len(),
                benches.len()
            );
            packages.push(TestPackage {
                identity: node.identity().to_string(),
                symbol,
                tests,
                benchmarks: benches,
            });
        }

        TestHarness {
            packages,
            benchmarks,
        }
    }

    pub fn packages(&self) -> &[TestPackage] {
        &self.packages
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    pub fn test_count(&self) -> usize {
        self.packages.iter().map(|p| p.tests.len()).sum()
    }

    pub fn benchmark_count(&self) -> usize {
        self.packages.iter().map(|p| p.benchmarks.len()).sum()
    }

    /// Render the driver source.
    pub fn render(&self) -> String {
        let mut out = String::new();

        writeln!(out, "{}", HEADER).unwrap();
        writeln!(out).unwrap();
        writeln!(out, "package {}", ENTRY_PACKAGE).unwrap();
        writeln!(out).unwrap();
        writeln!(out, "import \"fmt\"").unwrap();
        writeln!(out, "import \"testing\"").unwrap();
        for pkg in &self.packages {
            writeln!(out, "import pkg_{} \"./{}\"", pkg.symbol, pkg.identity).unwrap();
        }

        for pkg in &self.packages {
            if !pkg.tests.is_empty() {
                writeln!(out).unwrap();
                writeln!(out, "var tests_{} = []testing.Test{{", pkg.symbol).unwrap();
                for name in &pkg.tests {
                    writeln!(
                        out,
                        "\ttesting.Test{{\"{}.{}\", pkg_{}.{}}},",
                        pkg.identity, name, pkg.symbol, name
                    )
                    .unwrap();
                }
                writeln!(out, "}}").unwrap();
            }
            if !pkg.benchmarks.is_empty() {
                writeln!(out).unwrap();
                writeln!(out, "var benchmarks_{} = []testing.Benchmark{{", pkg.symbol).unwrap();
                for name in &pkg.benchmarks {
                    writeln!(
                        out,
                        "\ttesting.Benchmark{{\"{}.{}\", pkg_{}.{}}},",
                        pkg.identity, name, pkg.symbol, name
                    )
                    .unwrap();
                }
                writeln!(out, "}}").unwrap();
            }
        }

        writeln!(out).unwrap();
        writeln!(out, "func main() {{").unwrap();
        for pkg in self.packages.iter().filter(|p| !p.tests.is_empty()) {
            writeln!(out, "\tfmt.Println(\"Testing {}:\")", pkg.identity).unwrap();
            writeln!(out, "\ttesting.Main(tests_{})", pkg.symbol).unwrap();
        }
        if self.benchmarks {
            for pkg in self.packages.iter().filter(|p| !p.benchmarks.is_empty()) {
                writeln!(out, "\tfmt.Println(\"Benchmarking {}:\")", pkg.identity).unwrap();
                writeln!(out, "\ttesting.RunBenchmarks(benchmarks_{})", pkg.symbol).unwrap();
            }
        }
        writeln!(out, "}}").unwrap();

        out
    }

    /// Write the driver source to the build root.
    pub fn write(&self, root: &Path) -> Result<PathBuf> {
        let path = root.join(DRIVER_FILE);
        write_string(&path, &self.render())?;
        tracing::debug!("wrote test driver {}", path.display());
        Ok(path)
    }

    /// Key under which the driver is built.
    pub fn driver_key() -> NodeKey {
        NodeKey::entry_file(DRIVER_FILE)
    }

    /// The entry node for the generated driver.
    pub fn driver_node(&self) -> PackageNode {
        let mut facts = SourceFacts::new(ENTRY_PACKAGE)
            .with_import("fmt")
            .with_import("testing")
            .with_entry_point();
        for pkg in &self.packages {
            facts = facts.with_import(format!("./{}", pkg.identity));
        }

        let mut node = PackageNode::new(ENTRY_PACKAGE)
            .with_kind(PackageKind::Local)
            .with_output_name(DRIVER_OUTPUT);
        node.add_file(std::sync::Arc::new(SourceFile::new(DRIVER_FILE, &facts)));
        for pkg in &self.packages {
            node.add_dependency(pkg.identity.as_str());
        }
        node
    }
}

/// Turn a package identity into a Go identifier fragment.
pub fn sanitize_identifier(identity: &str) -> String {
    identity
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

fn unique_symbol(identity: &str, taken: &mut HashSet<String>) -> String {
    let base = sanitize_identifier(identity);
    let mut symbol = base.clone();
    let mut n = 2;
    while !taken.insert(symbol.clone()) {
        symbol = format!("{}_{}", base, n);
        n += 1;
    }
    symbol
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::classify::classify_import;

    fn add(reg: &mut PackageRegistry, path: &str, package: &str, tests: &[&str], benches: &[&str]) {
        let mut facts = SourceFacts::new(package);
        for t in tests {
            facts = facts.with_test(*t);
        }
        for b in benches {
            facts = facts.with_benchmark(*b);
        }
        reg.ensure_dependency(&classify_import(&format!("./{}", package)));
        reg.add_or_merge_file(SourceFile::new(path, &facts), package, &[]);
    }

    fn registry() -> PackageRegistry {
        let mut reg = PackageRegistry::new();
        add(&mut reg, "strs/strs_test.go", "strs", &["TestUpper", "TestLower"], &["BenchmarkUpper"]);
        add(&mut reg, "math/math_test.go", "math", &["TestAdd"], &[]);
        add(&mut reg, "util/util.go", "util", &[], &[]);
        add(&mut reg, "perf/perf_test.go", "perf", &[], &["BenchmarkLoop"]);
        reg
    }

    #[test]
    fn test_collect_is_lexical_and_skips_untested() {
        let harness = TestHarness::collect(&registry(), false);
        let ids: Vec<_> = harness.packages().iter().map(|p| p.identity.as_str()).collect();
        assert_eq!(ids, ["math", "strs"]);
        assert_eq!(harness.test_count(), 3);
        assert_eq!(harness.benchmark_count(), 0);
    }

    #[test]
    fn test_benchmark_only_package_needs_benchmarks() {
        let harness = TestHarness::collect(&registry(), true);
        let ids: Vec<_> = harness.packages().iter().map(|p| p.identity.as_str()).collect();
        assert_eq!(ids, ["math", "perf", "strs"]);
        assert_eq!(harness.benchmark_count(), 2);
    }

    #[test]
    fn test_render() {
        let mut reg = PackageRegistry::new();
        add(&mut reg, "a/a_test.go", "a", &["TestOne"], &[]);
        let out = TestHarness::collect(&reg, false).render();

        let expected = "\
// generated by gobuild, do not edit

package main

import \"fmt\"
import \"testing\"
import pkg_a \"./a\"

var tests_a = []testing.Test{
\ttesting.Test{\"a.TestOne\", pkg_a.TestOne},
}

func main() {
\tfmt.Println(\"Testing a:\")
\ttesting.Main(tests_a)
}
";
        assert_eq!(out, expected);
    }

    #[test]
    fn test_render_benchmarks_after_tests() {
        let out = TestHarness::collect(&registry(), true).render();
        assert!(out.contains("var benchmarks_strs = []testing.Benchmark{"));
        assert!(out.contains("\ttesting.Benchmark{\"perf.BenchmarkLoop\", pkg_perf.BenchmarkLoop},"));

        let last_test = out.rfind("testing.Main(").unwrap();
        let first_bench = out.find("testing.RunBenchmarks(").unwrap();
        assert!(last_test < first_bench);

        let without = TestHarness::collect(&registry(), false).render();
        assert!(!without.contains("Benchmark"));
    }

    #[test]
    fn test_one_table_per_kind() {
        let mut reg = PackageRegistry::new();
        add(&mut reg, "a/a_test.go", "a", &["TestFirst", "TestSecond"], &[]);
        add(&mut reg, "b/b_test.go", "b", &[], &["BenchmarkSpeed"]);
        let out = TestHarness::collect(&reg, true).render();

        assert_eq!(out.matches("[]testing.Test{").count(), 1);
        assert_eq!(out.matches("[]testing.Benchmark{").count(), 1);
        assert!(out.contains(
            "var tests_a = []testing.Test{\n\
             \ttesting.Test{\"a.TestFirst\", pkg_a.TestFirst},\n\
             \ttesting.Test{\"a.TestSecond\", pkg_a.TestSecond},\n\
             }\n"
        ));
        assert!(out.contains(
            "var benchmarks_b = []testing.Benchmark{\n\
             \ttesting.Benchmark{\"b.BenchmarkSpeed\", pkg_b.BenchmarkSpeed},\n\
             }\n"
        ));
        assert_eq!(out.matches("\ttesting.Test{").count(), 2);
        assert_eq!(out.matches("\ttesting.Benchmark{").count(), 1);
    }

    #[test]
    fn test_render_is_deterministic() {
        let reg = registry();
        assert_eq!(
            TestHarness::collect(&reg, true).render(),
            TestHarness::collect(&reg, true).render()
        );
    }

    #[test]
    fn test_nested_identity_symbols() {
        assert_eq!(sanitize_identifier("net/http"), "net_http");
        assert_eq!(sanitize_identifier("a-b.c"), "a_b_c");

        let mut taken = HashSet::new();
        assert_eq!(unique_symbol("a/b", &mut taken), "a_b");
        assert_eq!(unique_symbol("a_b", &mut taken), "a_b_2");
    }

    #[test]
    fn test_driver_node() {
        let harness = TestHarness::collect(&registry(), false);
        let node = harness.driver_node();

        assert!(node.is_entry_package());
        assert!(node.is_local());
        assert_eq!(node.output_name(), DRIVER_OUTPUT);
        assert_eq!(node.file_paths(), [Path::new(DRIVER_FILE)]);
        assert_eq!(node.dependencies(), ["math", "strs"]);
        assert!(node.files()[0].has_entry_point());
        assert_eq!(TestHarness::driver_key(), NodeKey::entry_file("_testmain.go"));
    }

    #[test]
    fn test_write() {
        let tmp = tempfile::TempDir::new().unwrap();
        let harness = TestHarness::collect(&registry(), false);
        let path = harness.write(tmp.path()).unwrap();
        assert_eq!(path, tmp.path().join(DRIVER_FILE));
        assert_eq!(std::fs::read_to_string(path).unwrap(), harness.render());
    }
}
