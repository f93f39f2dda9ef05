//! `gobuild lib` command

use anyhow::Result;

use super::Session;
use crate::cli::{GlobalArgs, LibArgs};
use gobuild::ops::gobuild_lib::{build_libraries, LibOptions};

pub fn execute(global: &GlobalArgs, _args: LibArgs) -> Result<i32> {
    let session = Session::new(global)?;

    let opts = LibOptions {
        include_hidden: session.include_hidden(global),
    };

    let report = build_libraries(&session.build, &session.runner, &opts)?;
    Ok(session.finish(&report))
}
