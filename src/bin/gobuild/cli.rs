//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell as CompletionShell;

use gobuild::util::shell::ColorChoice;

/// gobuild - build Go source trees with the gc toolchain
#[derive(Parser)]
#[command(name = "gobuild")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Flags accepted by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Print full command lines and debug logs
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Only print errors
    #[arg(long, global = true)]
    pub silent: bool,

    /// Coloring: auto, always, never
    #[arg(long, global = true, default_value = "auto", value_name = "WHEN")]
    pub color: ColorChoice,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = MessageFormat::Human)]
    pub message_format: MessageFormat,

    /// Build root (defaults to the current directory)
    #[arg(short = 'C', long, global = true, value_name = "DIR")]
    pub directory: Option<PathBuf>,

    /// Also read directories and files starting with a dot
    #[arg(long, global = true)]
    pub include_hidden: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageFormat {
    /// Status lines for people
    Human,
    /// One JSON event per line
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compile and link programs
    Build(BuildArgs),

    /// Compile every package into an archive
    Lib(LibArgs),

    /// Build and run a test driver for every package with tests
    Test(TestArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct BuildArgs {
    /// Entry files to build
    pub files: Vec<PathBuf>,

    /// Build every file that declares `func main`
    #[arg(short, long)]
    pub all: bool,

    /// Build each entry file on its own, without the other files of package main
    #[arg(long)]
    pub single_main: bool,

    /// Name of the executable (single target only)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Run the program after building it
    #[arg(short, long)]
    pub run: bool,

    /// Arguments for the program
    #[arg(last = true)]
    pub args: Vec<String>,
}

#[derive(Args)]
pub struct LibArgs {}

#[derive(Args)]
pub struct TestArgs {
    /// Also run benchmarks
    #[arg(short, long)]
    pub benchmarks: bool,

    /// Keep the generated test driver source
    #[arg(long)]
    pub keep: bool,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: CompletionShell,
}
