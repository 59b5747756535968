//! Command-line surface of the plan runner and summary reader.

use clap::Parser;
use clap::Subcommand;
use std::path::PathBuf;
use terrascope_core::cache;

#[derive(Debug, Parser)]
#[command(name = "terrascope", about = "Collect and summarize infrastructure plans")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the plan command sequence across directories and post the
    /// results to a collector.
    Run(RunArgs),
    /// Read a tree of stored plan documents and print the change
    /// summary rollup.
    Summary(SummaryArgs),
}

#[derive(Debug, Parser)]
pub struct RunArgs {
    /// Collector address records are posted to.
    #[arg(long, default_value = "http://localhost:8080/plan")]
    pub collector: String,

    /// `;`-separated command sequence. The final command must print a
    /// JSON plan document on stdout. Arguments are split on
    /// whitespace; shell quoting is not supported.
    #[arg(long, default_value = "terraform plan; terraform show -json plan")]
    pub command: String,

    /// Maximum seconds a command may run before it is interrupted.
    #[arg(long, default_value_t = 300)]
    pub run_timeout: u64,

    /// Number of directories to plan in parallel.
    #[arg(long, default_value_t = 1)]
    pub parallel: usize,

    /// Trailing path segments to keep when deriving the collector key
    /// from a directory path; 0 keeps the whole path.
    #[arg(long, default_value_t = 2)]
    pub clip_last: usize,

    /// Directories in which to run the plan commands.
    #[arg(required = true)]
    pub directories: Vec<PathBuf>,
}

#[derive(Debug, Parser)]
pub struct SummaryArgs {
    /// Leaf-summary cache capacity.
    #[arg(long, default_value_t = cache::DEFAULT_CAPACITY)]
    pub cache_capacity: usize,

    /// Root of the stored plan tree.
    pub dir: PathBuf,
}
