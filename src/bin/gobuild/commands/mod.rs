//! Command implementations

pub mod build;
pub mod completions;
pub mod lib;

use std::sync::Arc;

use anyhow::Result;

use crate::cli::{GlobalArgs, MessageFormat};
use gobuild::builder::{BuildContext, ProcessRunner};
use gobuild::ops::BuildReport;
use gobuild::util::{Config, GlobalContext, Shell};

/// Everything a build command needs.
pub struct Session {
    pub config: Config,
    pub build: BuildContext,
    pub runner: ProcessRunner,
}

impl Session {
    /// Resolve the build root, load configuration and detect the toolchain.
    pub fn new(global: &GlobalArgs) -> Result<Self> {
        let ctx = match &global.directory {
            Some(dir) => GlobalContext::with_root(dir)?,
            None => GlobalContext::new()?,
        };
        let config = ctx.load_config();

        let shell = Arc::new(Shell::from_flags(
            global.silent,
            global.quiet,
            global.verbose,
            global.color,
            global.message_format == MessageFormat::Json,
        ));

        let build = BuildContext::detect(ctx.root(), &config, shell)?;
        let runner = ProcessRunner::new(ctx.root());

        Ok(Session {
            config,
            build,
            runner,
        })
    }

    /// Hidden entries are read when asked on the command line or in config.
    pub fn include_hidden(&self, global: &GlobalArgs) -> bool {
        global.include_hidden || self.config.include_hidden()
    }

    /// Print the summary and turn the report into an exit code.
    pub fn finish(&self, report: &BuildReport) -> i32 {
        report.print_summary(self.build.shell());
        if report.success() {
            0
        } else {
            1
        }
    }
}
