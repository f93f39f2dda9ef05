//! gobuild CLI - builds Go source trees with the gc toolchain

use std::io::IsTerminal;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};
use gobuild::builder::BuildError;
use gobuild::util::diagnostic::emit;

fn main() {
    match run() {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            if let Some(build_err) = e.downcast_ref::<BuildError>() {
                emit(&build_err.to_diagnostic(), std::io::stderr().is_terminal());
            } else {
                eprintln!("error: {:#}", e);
            }
            std::process::exit(1);
        }
    }
}

fn run() -> Result<i32> {
    // Parse CLI
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.global.verbose {
        EnvFilter::new("gobuild=debug")
    } else {
        EnvFilter::new("gobuild=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    // Execute command
    match cli.command {
        Commands::Build(args) => commands::build::execute(&cli.global, args),
        Commands::Lib(args) => commands::lib::execute(&cli.global, args),
        Commands::Test(args) => commands::test::execute(&cli.global, args),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
