//! CLI argument parsing

use clap::Parser;
use std::path::PathBuf;

/// querybench is a SQL query benchmarking tool
#[derive(Parser, Debug)]
#[command(name = "querybench")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the query file (CSV: hostname,start_time,end_time)
    #[arg(short, long)]
    pub file: PathBuf,

    /// Number of workers
    #[arg(short, long, default_value_t = querybench_core::config::DEFAULT_LANES)]
    pub workers: usize,

    /// Connection string for the benchmarked database
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: String,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}
