//! qbench Command-Line Interface
//!
//! Sweeps seeded random circuits across qubit counts and times them on the
//! CPU state-vector simulator and the GPU engine.

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use console::style;
use qbench_hal::Precision;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::run::{Outcome, RunArgs};
use commands::{backends, run, summarize, version};

/// Exit status of a sweep stopped by Ctrl-C.
const EXIT_INTERRUPTED: i32 = 130;

/// qbench - CPU vs GPU state-vector simulation benchmark
#[derive(Parser)]
#[command(name = "qbench")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a benchmark sweep
    Run(RunArgs),

    /// Probe which backend configurations are available
    Backends {
        /// State-vector precision (single, double)
        #[arg(long, default_value = "double")]
        precision: Precision,

        /// GPU engine library
        #[arg(long, env = "QBENCH_GPU_ENGINE")]
        gpu_engine: Option<PathBuf>,
    },

    /// Print the timing and speedup tables of a recorded run
    Summarize {
        /// Result file (.jsonl)
        input: PathBuf,

        /// Label to compute speedups against (defaults to the first label)
        #[arg(short, long)]
        baseline: Option<String>,
    },

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Execute command
    let result = match cli.command {
        Commands::Run(args) => run::execute(args).await,

        Commands::Backends {
            precision,
            gpu_engine,
        } => backends::execute(precision, gpu_engine).map(|()| Outcome::Completed),

        Commands::Summarize { input, baseline } => {
            summarize::execute(&input, baseline.as_deref())
                .await
                .map(|()| Outcome::Completed)
        }

        Commands::Version => {
            version::execute();
            Ok(Outcome::Completed)
        }
    };

    // Handle errors
    match result {
        Ok(Outcome::Completed) => Ok(()),
        Ok(Outcome::Interrupted) => std::process::exit(EXIT_INTERRUPTED),
        Err(e) => {
            eprintln!("{} {:#}", style("Error:").red().bold(), e);
            std::process::exit(1);
        }
    }
}
