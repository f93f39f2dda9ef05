//! Build report and the final summary.

use std::path::Path;
use std::time::Duration;

use crate::builder::errors::StepFailure;
use crate::builder::events::{BuildEvent, StepOutcome, StepRecord};
use crate::util::diagnostic::suggestions;
use crate::util::shell::{format_duration, Shell, Status};

/// Ordered outcome of every step of one invocation.
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    records: Vec<StepRecord>,
    duration: Duration,
}

impl BuildReport {
    pub fn new(records: Vec<StepRecord>, duration: Duration) -> Self {
        BuildReport { records, duration }
    }

    pub fn records(&self) -> &[StepRecord] {
        &self.records
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// True when no step failed.
    pub fn success(&self) -> bool {
        !self.records.iter().any(|r| r.is_failure())
    }

    pub fn failures(&self) -> impl Iterator<Item = &StepFailure> {
        self.records.iter().filter_map(|r| r.failure())
    }

    pub fn failed_count(&self) -> usize {
        self.failures().count()
    }

    pub fn succeeded_count(&self) -> usize {
        self.records.len() - self.failed_count()
    }

    /// Packages and entry files with at least one failed step, in step order.
    pub fn failed_targets(&self) -> Vec<&str> {
        let mut targets: Vec<&str> = Vec::new();
        for record in self.records.iter().filter(|r| r.is_failure()) {
            if !targets.contains(&record.package.as_str()) {
                targets.push(&record.package);
            }
        }
        targets
    }

    /// Files produced or reused, in step order.
    pub fn artifacts(&self) -> Vec<&Path> {
        self.records
            .iter()
            .filter_map(|r| match &r.outcome {
                StepOutcome::Done {
                    artifact: Some(artifact),
                } => Some(artifact.as_path()),
                StepOutcome::Prebuilt { artifact } => Some(artifact.as_path()),
                _ => None,
            })
            .collect()
    }

    /// `build failed: F of N steps failed (a, main.go)`
    fn failure_summary(&self) -> String {
        format!(
            "build failed: {} of {} step{} failed ({})",
            self.failed_count(),
            self.records.len(),
            plural(self.records.len()),
            self.failed_targets().join(", ")
        )
    }

    /// Print the closing line, or the `build-finished` event in JSON mode.
    pub fn print_summary(&self, shell: &Shell) {
        if shell.is_json() {
            let event = BuildEvent::finished(
                self.success(),
                self.duration.as_millis() as u64,
                self.succeeded_count(),
                self.failed_count(),
                self.failed_targets().into_iter().map(String::from).collect(),
            );
            shell.json_event(&event.to_value());
            return;
        }

        if self.success() {
            shell.status(
                Status::Finished,
                format!(
                    "{} step{} in {}",
                    self.records.len(),
                    plural(self.records.len()),
                    format_duration(self.duration)
                ),
            );
        } else {
            shell.error(self.failure_summary());
            if !shell.is_verbose() {
                shell.note(suggestions::BUILD_FAILED);
            }
        }
    }
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}
