//! Build event types for JSON output and the per-step record.
//!
//! This module defines the stable JSON schema for machine-readable build output.
//! These events are emitted when using `--message-format=json`.
//!
//! # Event Types
//!
//! - `build-started`: Discovery finished, the build is about to start
//! - `compiler-artifact`: An object file, archive or executable was produced
//! - `step-failed`: A compile, link, archive or run step failed
//! - `build-finished`: Build completed (success or failure)
//!
//! # Stability
//!
//! The JSON schema is versioned and should remain backwards compatible.
//! New fields may be added, but existing fields should not be removed or renamed.

use std::path::PathBuf;

use serde::Serialize;

use crate::builder::errors::{Step, StepFailure};

/// What happened to one step of one node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum StepOutcome {
    /// The toolchain ran and succeeded
    Done {
        #[serde(skip_serializing_if = "Option::is_none")]
        artifact: Option<PathBuf>,
    },
    /// A prebuilt artifact satisfied the step; nothing ran
    Prebuilt { artifact: PathBuf },
    /// The step failed or was not attempted
    Failed { failure: StepFailure },
}

/// A single entry of the build report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepRecord {
    /// Package identity, or the entry file for executable targets
    pub package: String,
    pub step: Step,
    pub outcome: StepOutcome,
}

impl StepRecord {
    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, StepOutcome::Failed { .. })
    }

    pub fn failure(&self) -> Option<&StepFailure> {
        match &self.outcome {
            StepOutcome::Failed { failure } => Some(failure),
            _ => None,
        }
    }
}

/// A build event emitted during the build process.
///
/// Each event is serialized as a single JSON object per line.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "reason")]
pub enum BuildEvent {
    /// Discovery finished.
    #[serde(rename = "build-started")]
    BuildStarted {
        /// Build mode ("build", "lib", "test")
        mode: String,
        /// Target architecture (GOARCH spelling)
        arch: String,
        /// Number of packages discovered
        package_count: u64,
        /// Number of files declaring `func main`
        entry_count: u64,
    },

    /// An artifact was produced.
    #[serde(rename = "compiler-artifact")]
    CompilerArtifact {
        package: String,
        step: Step,
        /// Output filenames
        filenames: Vec<PathBuf>,
        /// Whether a prebuilt artifact was used instead of running the toolchain
        #[serde(skip_serializing_if = "std::ops::Not::not")]
        prebuilt: bool,
    },

    /// A step failed.
    #[serde(rename = "step-failed")]
    StepFailed {
        package: String,
        step: Step,
        message: String,
        failure: StepFailure,
    },

    /// Build completed (success or failure).
    #[serde(rename = "build-finished")]
    BuildFinished {
        /// Whether the build succeeded
        success: bool,
        /// Total build duration in milliseconds
        duration_ms: u64,
        /// Number of successful steps
        steps_succeeded: u64,
        /// Number of failed steps
        steps_failed: u64,
        /// Packages and entry files with a failed step, in build order
        #[serde(skip_serializing_if = "Vec::is_empty")]
        failed_targets: Vec<String>,
    },
}

impl BuildEvent {
    /// Create a build started event.
    pub fn started(
        mode: impl Into<String>,
        arch: impl Into<String>,
        package_count: usize,
        entry_count: usize,
    ) -> Self {
        BuildEvent::BuildStarted {
            mode: mode.into(),
            arch: arch.into(),
            package_count: package_count as u64,
            entry_count: entry_count as u64,
        }
    }

    /// Create the event for a finished step, if it produced or failed anything.
    pub fn from_record(record: &StepRecord) -> Option<Self> {
        match &record.outcome {
            StepOutcome::Done {
                artifact: Some(artifact),
            } => Some(BuildEvent::CompilerArtifact {
                package: record.package.clone(),
                step: record.step,
                filenames: vec![artifact.clone()],
                prebuilt: false,
            }),
            StepOutcome::Done { artifact: None } => None,
            StepOutcome::Prebuilt { artifact } => Some(BuildEvent::CompilerArtifact {
                package: record.package.clone(),
                step: record.step,
                filenames: vec![artifact.clone()],
                prebuilt: true,
            }),
            StepOutcome::Failed { failure } => Some(BuildEvent::StepFailed {
                package: record.package.clone(),
                step: record.step,
                message: failure.to_string(),
                failure: failure.clone(),
            }),
        }
    }

    /// Create a build finished event.
    pub fn finished(
        success: bool,
        duration_ms: u64,
        succeeded: usize,
        failed: usize,
        failed_targets: Vec<String>,
    ) -> Self {
        BuildEvent::BuildFinished {
            success,
            duration_ms,
            steps_succeeded: succeeded as u64,
            steps_failed: failed as u64,
            failed_targets,
        }
    }

    /// Serialize this event to a JSON value.
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }

    /// Serialize this event to a JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}
