//! Implementation of `gobuild lib`.

use std::time::Instant;

use anyhow::Result;

use crate::builder::context::BuildContext;
use crate::builder::orchestrator::Orchestrator;
use crate::builder::runner::CommandRunner;
use crate::core::package::{NodeKey, PackageKind, PackageNode};
use crate::ops::discover::discover_packages;
use crate::ops::report::BuildReport;
use crate::sources::DiscoveryOptions;
use crate::util::shell::Status;

/// Options for the lib command.
#[derive(Debug, Clone, Default)]
pub struct LibOptions {
    /// Read dot-prefixed directories
    pub include_hidden: bool,
}

/// Compile and archive every library package in the tree.
pub fn build_libraries(
    ctx: &BuildContext,
    runner: &dyn CommandRunner,
    opts: &LibOptions,
) -> Result<BuildReport> {
    let start = Instant::now();

    let registry = discover_packages(
        ctx,
        DiscoveryOptions {
            include_hidden: opts.include_hidden,
            include_tests: false,
        },
        "lib",
    )?;

    let libraries: Vec<&PackageNode> = registry.packages().filter(|n| is_library(n)).collect();
    if libraries.is_empty() {
        ctx.shell().warn("no library packages found");
    }

    let mut orch = Orchestrator::new(ctx, &registry, runner);

    for node in libraries {
        if node.has_foreign_binding() {
            let archive = ctx.archive_path(node);
            if !ctx.absolute(&archive).is_file() {
                ctx.shell().status(
                    Status::Skipped,
                    format!(
                        "{} (imports \"C\"; compile it by hand into `{}`)",
                        node.identity(),
                        archive.display()
                    ),
                );
                continue;
            }
        }

        let key = NodeKey::package(node.identity());
        if !orch.compile(&key, node)? {
            continue;
        }
        // A foreign-binding package is satisfied by its prebuilt archive
        if !node.has_foreign_binding() {
            orch.archive(node)?;
        }
    }

    Ok(BuildReport::new(orch.into_records(), start.elapsed()))
}

/// Packages built into archives: in-tree, with files, not the entry package.
fn is_library(node: &PackageNode) -> bool {
    node.has_files() && !node.is_entry_package() && node.kind() != PackageKind::External
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::events::StepOutcome;
    use crate::test_support::{test_context, MockRunner, SourceTree};

    fn lib_tree() -> SourceTree {
        let tree = SourceTree::hello_with_util();
        tree.write("strs/strs.go", "package strs\n\nimport \"./util\"\n");
        tree.write("helpers.go", "package main\n\nfunc helper() {}\n");
        tree
    }

    #[test]
    fn test_archives_every_package() {
        let tree = lib_tree();
        let runner = MockRunner::new();
        let ctx = test_context(tree.root());

        let report = build_libraries(&ctx, &runner, &LibOptions::default()).unwrap();
        assert!(report.success());
        assert_eq!(
            runner.calls(),
            [
                "6g -o util.6 util/util.go",
                "6g -o strs.6 strs/strs.go",
                "gopack grc strs.a strs.6",
                "gopack grc util.a util.6",
            ]
        );
    }

    #[test]
    fn test_foreign_binding_is_skipped_without_archive() {
        let tree = SourceTree::new();
        tree.write("sys/sys.go", "package sys\n\nimport \"C\"\n");
        tree.write("util/util.go", "package util\n");
        let runner = MockRunner::new();
        let ctx = test_context(tree.root());

        let report = build_libraries(&ctx, &runner, &LibOptions::default()).unwrap();
        assert!(report.success());
        assert_eq!(runner.calls_matching("sys"), 0);
        assert_eq!(runner.calls_matching("util"), 2);
    }

    #[test]
    fn test_prebuilt_foreign_archive_is_used() {
        let tree = SourceTree::new();
        tree.write("sys/sys.go", "package sys\n\nimport \"C\"\n");
        tree.write("sys.a", "");
        let runner = MockRunner::new();
        let ctx = test_context(tree.root());

        let report = build_libraries(&ctx, &runner, &LibOptions::default()).unwrap();
        assert!(runner.calls().is_empty());
        assert!(matches!(
            report.records()[0].outcome,
            StepOutcome::Prebuilt { .. }
        ));
    }

    #[test]
    fn test_failed_package_is_not_archived() {
        let tree = lib_tree();
        let runner = MockRunner::new().fail_when("util/util.go", 1);
        let ctx = test_context(tree.root());

        let report = build_libraries(&ctx, &runner, &LibOptions::default()).unwrap();
        assert!(!report.success());
        assert_eq!(runner.calls_matching("gopack"), 0);
        assert_eq!(runner.calls(), ["6g -o util.6 util/util.go"]);
    }
}
