//! Implementation of `gobuild build`.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Result;

use crate::builder::context::BuildContext;
use crate::builder::errors::BuildError;
use crate::builder::orchestrator::Orchestrator;
use crate::builder::runner::CommandRunner;
use crate::core::classify::normalize_separators;
use crate::core::package::NodeKey;
use crate::core::registry::PackageRegistry;
use crate::ops::discover::discover_packages;
use crate::ops::report::BuildReport;
use crate::sources::DiscoveryOptions;
use crate::util::fs::{ensure_dir, root_relative};

/// Options for the build command.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Entry files to build (empty = the only one, or all with `all`)
    pub files: Vec<PathBuf>,

    /// Build every entry file
    pub all: bool,

    /// Do not merge shared files of package main into each target
    pub single_main: bool,

    /// Executable name, relative to the build root
    pub output: Option<PathBuf>,

    /// Run each executable after linking it
    pub run: bool,

    /// Arguments passed to the executable
    pub run_args: Vec<String>,

    /// Read dot-prefixed directories
    pub include_hidden: bool,
}

/// Build executables.
pub fn build(
    ctx: &BuildContext,
    runner: &dyn CommandRunner,
    opts: &BuildOptions,
) -> Result<BuildReport> {
    let start = Instant::now();

    let registry = discover_packages(
        ctx,
        DiscoveryOptions {
            include_hidden: opts.include_hidden,
            include_tests: false,
        },
        "build",
    )?;

    let targets = select_targets(&registry, &ctx.root, opts)?;
    if opts.output.is_some() && targets.len() > 1 {
        return Err(BuildError::OutputWithMultipleTargets {
            count: targets.len(),
        }
        .into());
    }

    let mut orch = Orchestrator::new(ctx, &registry, runner);

    for path in &targets {
        let Some(mut node) = registry.entry_target(path, !opts.single_main) else {
            continue;
        };
        if let Some(output) = &opts.output {
            if let Some(parent) = output.parent() {
                ensure_dir(&ctx.absolute(parent))?;
            }
            node = node.with_output_name(normalize_separators(output));
        }

        let key = NodeKey::entry_file(path);
        if !orch.compile(&key, &node)? || !orch.link(&node)? {
            continue;
        }

        if opts.run {
            let executable = ctx.executable_path(&node);
            orch.run(&executable, &opts.run_args)?;
        }
    }

    Ok(BuildReport::new(orch.into_records(), start.elapsed()))
}

/// Pick the entry files to build.
fn select_targets(
    registry: &PackageRegistry,
    root: &Path,
    opts: &BuildOptions,
) -> Result<Vec<PathBuf>, BuildError> {
    let candidates = registry.entry_files();
    let candidate_names = || -> Vec<String> {
        candidates.iter().map(|p| normalize_separators(p)).collect()
    };

    if !opts.files.is_empty() {
        let mut selected = Vec::new();
        for file in &opts.files {
            let rel = root_relative(root, file);
            if !registry.is_entry_file(&rel) {
                return Err(BuildError::UnknownEntryFile {
                    file: file.display().to_string(),
                    candidates: candidate_names(),
                });
            }
            if !selected.contains(&rel) {
                selected.push(rel);
            }
        }
        return Ok(selected);
    }

    match candidates.len() {
        0 => Err(BuildError::NoEntryPoint),
        1 => Ok(vec![candidates[0].to_path_buf()]),
        _ if opts.all => Ok(candidates.iter().map(|p| p.to_path_buf()).collect()),
        _ => Err(BuildError::MultipleEntryPoints {
            candidates: candidate_names(),
        }),
    }
}
