//! Run command implementation.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use qbench_bench::export::{csv_path, summary_path, write_csv, write_summary};
use qbench_bench::{
    GateVocabulary, JsonlStore, Orchestrator, ResultStore, RunResult, SweepConfig, SweepFailure,
    SweepObserver, SweepRange, SweepSummary,
};
use qbench_compile::CanonicalCircuit;
use qbench_hal::{BackendConfig, CancelFlag, Precision};

use super::common::{BackendChoice, build_matrix, build_registry, print_counts, print_summary};

/// How a sweep ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    Interrupted,
}

/// Flags of `qbench run`.
#[derive(Debug, Args)]
pub struct RunArgs {
    /// Smallest qubit count
    #[arg(long, default_value = "2")]
    pub min_qubits: u32,

    /// Largest qubit count (inclusive)
    #[arg(long, default_value = "24")]
    pub max_qubits: u32,

    /// Qubit count increment
    #[arg(long, default_value = "2")]
    pub step: u32,

    /// Layers per random circuit
    #[arg(long, default_value = "10")]
    pub depth: u32,

    /// State-vector precision (single, double)
    #[arg(long, default_value = "double")]
    pub precision: Precision,

    /// Directory for result files
    #[arg(short, long, env = "QBENCH_OUTPUT_DIR", default_value = "results")]
    pub output_dir: PathBuf,

    /// Circuit generator seed
    #[arg(long, default_value = "42", allow_negative_numbers = true)]
    pub seed: i64,

    /// Backend configurations to compare
    #[arg(long, value_enum, value_delimiter = ',', default_value = "all")]
    pub backends: Vec<BackendChoice>,

    /// Gate vocabulary, comma separated (defaults to every supported gate)
    #[arg(long)]
    pub gates: Option<GateVocabulary>,

    /// Timed executions per qubit count and backend
    #[arg(long, default_value = "1")]
    pub repeats: u32,

    /// Run each circuit once untimed before the timed repeats
    #[arg(long)]
    pub warmup: bool,

    /// Per-run timeout in seconds (0 disables)
    #[arg(long, default_value = "3600")]
    pub timeout: u64,

    /// Stem of the result files (defaults to qbench_<UTC timestamp>)
    #[arg(long)]
    pub run_name: Option<String>,

    /// GPU engine library
    #[arg(long, env = "QBENCH_GPU_ENGINE")]
    pub gpu_engine: Option<PathBuf>,

    /// Also write a per-label CSV table
    #[arg(long)]
    pub save_csv: bool,
}

/// Execute the run command.
pub async fn execute(args: RunArgs) -> Result<Outcome> {
    // Everything is validated before the output directory is touched.
    let range = SweepRange::new(args.min_qubits, args.max_qubits, args.step)?;
    let mut config = SweepConfig::new(range)
        .with_depth(args.depth)
        .with_seed(args.seed)
        .with_repeats(args.repeats)
        .with_warmup(args.warmup)
        .with_run_timeout(Some(Duration::from_secs(args.timeout)));
    if let Some(gates) = args.gates {
        config = config.with_vocabulary(gates);
    }
    config.validate()?;

    let matrix = build_matrix(&args.backends, args.precision)?;
    let backends = build_registry(args.gpu_engine).create_all(&matrix)?;
    let total_runs = range.len() * backends.len();

    let run_name = args
        .run_name
        .unwrap_or_else(|| format!("qbench_{}", chrono::Utc::now().format("%Y%m%d_%H%M%S")));
    let store = JsonlStore::open(&args.output_dir, &run_name)
        .await
        .with_context(|| format!("cannot open result file in {}", args.output_dir.display()))?;

    println!(
        "{} Sweeping {}..={} qubits (step {}, depth {}, seed {}) on {}",
        style("→").cyan().bold(),
        range.min(),
        range.max(),
        range.step(),
        config.depth(),
        config.seed(),
        style(
            matrix
                .iter()
                .map(BackendConfig::label)
                .collect::<Vec<_>>()
                .join(", ")
        )
        .yellow()
    );
    println!("  Results: {}", style(store.location()).green());

    tracing::debug!(run_name = %run_name, total_runs, "Starting sweep");

    let cancel = CancelFlag::new();
    let signal_flag = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!(
                "\n{} Interrupted, finishing the current run...",
                style("!").yellow().bold()
            );
            signal_flag.cancel();
        }
    });

    let progress = Arc::new(SweepProgress::new(total_runs, backends.len())?);
    let orchestrator = Orchestrator::new(config, backends)?
        .with_cancel_flag(cancel)
        .with_observer(progress.clone());
    let report = orchestrator.run(&store).await;
    progress.finish();
    let report = report?;
    tracing::info!(
        run_name = %run_name,
        succeeded = report.succeeded,
        failed = report.failed,
        skipped = report.sweep_failures,
        interrupted = report.interrupted,
        "Sweep finished"
    );

    let results = store.load().await?;
    let summary = SweepSummary::new(run_name.as_str(), &results)
        .with_sweep(orchestrator.config())
        .with_interrupted(report.interrupted);
    let summary_file = summary_path(&args.output_dir, &run_name);
    write_summary(&summary_file, &summary)
        .await
        .with_context(|| format!("cannot write {}", summary_file.display()))?;
    if args.save_csv {
        let csv_file = csv_path(&args.output_dir, &run_name);
        write_csv(&csv_file, &results)
            .await
            .with_context(|| format!("cannot write {}", csv_file.display()))?;
    }

    println!();
    print_summary(&summary, &results.labels());
    println!();
    print_counts(&summary);
    println!("  Summary: {}", style(summary_file.display()).green());

    if report.interrupted {
        println!("{} Sweep interrupted", style("!").yellow().bold());
        return Ok(Outcome::Interrupted);
    }
    println!("{} Sweep complete", style("✓").green().bold());
    Ok(Outcome::Completed)
}

/// Progress bar over every (qubit count, backend) run.
struct SweepProgress {
    bar: ProgressBar,
    backends: usize,
}

impl SweepProgress {
    fn new(total_runs: usize, backends: usize) -> Result<Self> {
        let bar = ProgressBar::new(total_runs as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.cyan} [{bar:30.cyan/blue}] {pos}/{len} {msg}")?
                .progress_chars("=> "),
        );
        bar.enable_steady_tick(Duration::from_millis(100));
        Ok(Self { bar, backends })
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl SweepObserver for SweepProgress {
    fn qubit_count_started(&self, qubit_count: u32, _index: usize, _total: usize) {
        self.bar.set_message(format!("{qubit_count} qubits: generating"));
    }

    fn circuit_ready(&self, qubit_count: u32, circuit: &CanonicalCircuit) {
        self.bar.set_message(format!(
            "{qubit_count} qubits: {} gates, depth {}",
            circuit.len(),
            circuit.depth()
        ));
    }

    fn run_started(&self, qubit_count: u32, config: &BackendConfig) {
        self.bar
            .set_message(format!("{qubit_count} qubits: {}", config.label()));
    }

    fn run_finished(&self, result: &RunResult) {
        self.bar.inc(1);
        if !result.is_ok() {
            self.bar.println(format!(
                "  {} {} at {} qubits: {}",
                style("✗").red(),
                result.label(),
                result.qubit_count,
                result.error_detail.as_deref().unwrap_or("failed")
            ));
        }
    }

    fn sweep_failed(&self, failure: &SweepFailure) {
        self.bar.inc(self.backends as u64);
        self.bar.println(format!(
            "  {} {} qubits skipped ({}): {}",
            style("✗").red(),
            failure.qubit_count,
            failure.stage,
            failure.error_detail
        ));
    }
}
