//! `gobuild build` command

use anyhow::Result;

use super::Session;
use crate::cli::{BuildArgs, GlobalArgs};
use gobuild::ops::gobuild_build::{build, BuildOptions};

pub fn execute(global: &GlobalArgs, args: BuildArgs) -> Result<i32> {
    let session = Session::new(global)?;

    let opts = BuildOptions {
        files: args.files,
        all: args.all,
        single_main: args.single_main || session.config.single_main(),
        output: args.output,
        run: args.run,
        run_args: args.args,
        include_hidden: session.include_hidden(global),
    };

    let report = build(&session.build, &session.runner, &opts)?;
    Ok(session.finish(&report))
}
