//! Go build system.
//!
//! This module drives the `gc` toolchain over the package graph and
//! synthesizes test drivers.

pub mod context;
pub mod errors;
pub mod events;
pub mod orchestrator;
pub mod runner;
pub mod testmain;
pub mod toolchain;

pub use context::{BuildContext, BuildState};
pub use errors::{BuildError, Step, StepFailure};
pub use events::{BuildEvent, StepOutcome, StepRecord};
pub use orchestrator::Orchestrator;
pub use runner::{CommandRunner, ProcessRunner, ToolOutcome};
pub use testmain::TestHarness;
pub use toolchain::{detect_toolchain, Arch, CommandSpec, GcToolchain, Toolchain};
