//! Build orchestrator.
//!
//! Compiles a node after its dependency closure, in depth-first order,
//! tracking the state of every node for the duration of one run:
//!
//! ```text
//! Unvisited -> InProgress -> Compiled
//!                         -> Failed
//! ```
//!
//! Re-entering an `InProgress` node means the import graph has a cycle. The
//! toolchain cannot build such a graph, so the cycle is returned as an error
//! and ends the run. Per-node failures (a compiler error, a package without
//! files) are recorded and propagate to every dependent without invoking the
//! toolchain for them.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::builder::context::{BuildContext, BuildState};
use crate::builder::errors::{BuildError, Step, StepFailure};
use crate::builder::events::{BuildEvent, StepOutcome, StepRecord};
use crate::builder::runner::{CommandRunner, ToolOutcome};
use crate::builder::toolchain::CommandSpec;
use crate::core::package::{NodeKey, PackageKind, PackageNode};
use crate::core::registry::PackageRegistry;
use crate::util::shell::Status;

/// Search path handed to the toolchain for in-tree packages imported
/// without the `./` prefix.
const ROOT_SEARCH_PATH: &str = ".";

/// Drives the toolchain over the package graph.
pub struct Orchestrator<'a> {
    ctx: &'a BuildContext,
    registry: &'a PackageRegistry,
    runner: &'a dyn CommandRunner,
    states: HashMap<NodeKey, BuildState>,
    records: Vec<StepRecord>,
    /// Nodes currently being compiled, outermost first
    stack: Vec<String>,
}

impl<'a> Orchestrator<'a> {
    /// Create an orchestrator over a frozen registry.
    pub fn new(
        ctx: &'a BuildContext,
        registry: &'a PackageRegistry,
        runner: &'a dyn CommandRunner,
    ) -> Self {
        Orchestrator {
            ctx,
            registry,
            runner,
            states: HashMap::new(),
            records: Vec::new(),
            stack: Vec::new(),
        }
    }

    /// State of a node in this run.
    pub fn state(&self, key: &NodeKey) -> BuildState {
        self.states.get(key).copied().unwrap_or_default()
    }

    /// Steps recorded so far, in execution order.
    pub fn records(&self) -> &[StepRecord] {
        &self.records
    }

    /// Consume the orchestrator, returning the recorded steps.
    pub fn into_records(self) -> Vec<StepRecord> {
        self.records
    }

    /// Compile `node` after its dependencies.
    ///
    /// `Ok(false)` means the node or one of its dependencies failed; the
    /// failure is recorded. `Err` is returned for cycles and for a toolchain
    /// that cannot be launched; both end the run.
    pub fn compile(&mut self, key: &NodeKey, node: &PackageNode) -> Result<bool> {
        match self.state(key) {
            BuildState::Compiled => return Ok(true),
            BuildState::Failed => return Ok(false),
            BuildState::InProgress => {
                self.states.insert(key.clone(), BuildState::Failed);
                let mut chain = self.stack.clone();
                chain.push(key.to_string());
                return Err(BuildError::CyclicDependency {
                    package: key.to_string(),
                    chain,
                }
                .into());
            }
            BuildState::Unvisited => {}
        }

        self.states.insert(key.clone(), BuildState::InProgress);
        self.stack.push(key.to_string());

        let result = self.compile_node(key, node);

        self.stack.pop();
        let state = match result {
            Ok(true) => BuildState::Compiled,
            _ => BuildState::Failed,
        };
        self.states.insert(key.clone(), state);

        result
    }

    fn compile_node(&mut self, key: &NodeKey, node: &PackageNode) -> Result<bool> {
        let label = key.to_string();
        let registry = self.registry;
        let mut needs_search_path = false;

        for identity in node.dependencies() {
            let Some(dep) = registry.get(identity) else {
                tracing::debug!("dependency {} of {} is not registered", identity, label);
                continue;
            };

            // Toolchain packages, remote imports and "C" are satisfied as is
            if !dep.has_files() && !dep.is_local() {
                continue;
            }
            if dep.kind() == PackageKind::Unresolved && dep.has_files() {
                needs_search_path = true;
            }

            let dep_key = NodeKey::package(identity.as_str());
            if !self.compile(&dep_key, dep)? {
                self.record_failure(
                    &label,
                    Step::Compile,
                    StepFailure::DependencyFailed {
                        package: label.clone(),
                        dependency: identity.clone(),
                    },
                );
                return Ok(false);
            }
        }

        if node.has_foreign_binding() {
            let archive = self.ctx.archive_path(node);
            if self.ctx.absolute(&archive).is_file() {
                tracing::debug!("using prebuilt {}", archive.display());
                self.record(&label, Step::Compile, StepOutcome::Prebuilt { artifact: archive });
                return Ok(true);
            }
            self.record_failure(
                &label,
                Step::Compile,
                StepFailure::UnsupportedForeignBinding {
                    package: label.clone(),
                    archive: archive.display().to_string(),
                },
            );
            return Ok(false);
        }

        if !node.has_files() {
            self.record_failure(
                &label,
                Step::Compile,
                StepFailure::MissingFiles {
                    package: label.clone(),
                },
            );
            return Ok(false);
        }

        let object = self.ctx.object_path(node);
        let files = node.file_paths();
        let search_paths: Vec<&Path> = if needs_search_path {
            vec![Path::new(ROOT_SEARCH_PATH)]
        } else {
            Vec::new()
        };
        let command = self
            .ctx
            .toolchain()
            .compile_command(&object, &files, &search_paths);

        self.ctx.shell().status(Status::Compiling, &label);
        self.execute(&label, Step::Compile, &command, Some(object))
    }

    /// Link a compiled entry node into its executable.
    pub fn link(&mut self, node: &PackageNode) -> Result<bool> {
        let label = self.label_of(node);
        let object = self.ctx.object_path(node);
        let executable = self.ctx.executable_path(node);

        let search_paths: Vec<&Path> = if self.needs_search_path(node) {
            vec![Path::new(ROOT_SEARCH_PATH)]
        } else {
            Vec::new()
        };
        let command = self
            .ctx
            .toolchain()
            .link_command(&executable, &object, &search_paths);

        self.ctx
            .shell()
            .status(Status::Linking, format!("{} ({})", label, executable.display()));
        self.execute(&label, Step::Link, &command, Some(executable))
    }

    /// Pack a compiled node's object file into an archive.
    pub fn archive(&mut self, node: &PackageNode) -> Result<bool> {
        let label = self.label_of(node);
        let object = self.ctx.object_path(node);
        let archive = self.ctx.archive_path(node);
        let command = self.ctx.toolchain().archive_command(&archive, &object);

        self.ctx
            .shell()
            .status(Status::Archiving, format!("{} ({})", label, archive.display()));
        self.execute(&label, Step::Archive, &command, Some(archive))
    }

    /// Run a built executable with extra arguments.
    ///
    /// Returns the exit code, `None` when the program was killed by a signal.
    pub fn run(&mut self, executable: &Path, args: &[String]) -> Result<Option<i32>> {
        let label = executable.display().to_string();
        let command = CommandSpec::new(self.ctx.absolute(executable)).args(args.iter().cloned());

        self.ctx.shell().status(Status::Running, &command);
        let outcome = self.launch(&command)?;
        let code = outcome.code();

        match outcome {
            ToolOutcome::Success => {
                self.record(&label, Step::Run, StepOutcome::Done { artifact: None });
            }
            ToolOutcome::Failed { code } => {
                self.record_failure(
                    &label,
                    Step::Run,
                    StepFailure::ToolchainExit {
                        package: label.clone(),
                        step: Step::Run,
                        code,
                    },
                );
            }
        }

        Ok(code)
    }

    fn execute(
        &mut self,
        label: &str,
        step: Step,
        command: &CommandSpec,
        artifact: Option<PathBuf>,
    ) -> Result<bool> {
        match self.launch(command)? {
            ToolOutcome::Success => {
                self.record(label, step, StepOutcome::Done { artifact });
                Ok(true)
            }
            ToolOutcome::Failed { code } => {
                self.record_failure(
                    label,
                    step,
                    StepFailure::ToolchainExit {
                        package: label.to_string(),
                        step,
                        code,
                    },
                );
                Ok(false)
            }
        }
    }

    fn launch(&self, command: &CommandSpec) -> Result<ToolOutcome> {
        if self.ctx.shell().is_verbose() {
            self.ctx.shell().note(format!("`{}`", command));
        }

        self.runner.run(command).map_err(|e| {
            BuildError::ToolchainLaunch {
                program: command.program.display().to_string(),
                message: format!("{:#}", e),
            }
            .into()
        })
    }

    fn record(&mut self, label: &str, step: Step, outcome: StepOutcome) {
        let record = StepRecord {
            package: label.to_string(),
            step,
            outcome,
        };

        let shell = self.ctx.shell();
        if shell.is_json() {
            if let Some(event) = BuildEvent::from_record(&record) {
                shell.json_event(&event.to_value());
            }
        } else if let Some(failure) = record.failure() {
            shell.error(failure);
        }

        self.records.push(record);
    }

    fn record_failure(&mut self, label: &str, step: Step, failure: StepFailure) {
        tracing::debug!("{}", failure);
        self.record(label, step, StepOutcome::Failed { failure });
    }

    /// Whether anything `node` links in was imported without `./` but lives
    /// in the tree.
    fn needs_search_path(&self, node: &PackageNode) -> bool {
        let mut seen = HashSet::new();
        let mut pending: Vec<&str> = node.dependencies().iter().map(String::as_str).collect();

        while let Some(identity) = pending.pop() {
            if !seen.insert(identity) {
                continue;
            }
            let Some(dep) = self.registry.get(identity) else {
                continue;
            };
            if !dep.has_files() {
                continue;
            }
            if dep.kind() == PackageKind::Unresolved {
                return true;
            }
            pending.extend(dep.dependencies().iter().map(String::as_str));
        }
        false
    }

    /// Entry nodes are shown by file, shared packages by identity.
    fn label_of(&self, node: &PackageNode) -> String {
        match node.files().first() {
            Some(file) if node.is_entry_package() && self.registry.is_entry_file(file.path()) => {
                file.path().display().to_string()
            }
            _ => node.identity().to_string(),
        }
    }
}
