//! Helpers shared by the CLI commands.

use std::path::PathBuf;
use std::sync::Arc;

use clap::ValueEnum;
use console::style;

use qbench_adapter_gpu::GpuBackend;
use qbench_adapter_sim::SimulatorBackend;
use qbench_bench::SweepSummary;
use qbench_hal::{
    AccelerationMode, Backend, BackendConfig, BackendMatrix, BackendRegistry, Device, HalResult,
    Precision,
};

/// A `--backends` entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackendChoice {
    /// CPU state-vector simulator
    Cpu,
    /// GPU engine, default execution path
    GpuDefault,
    /// GPU engine, accelerated state-vector path
    GpuCustatevec,
    /// All three configurations
    All,
}

/// Expand `--backends` into a matrix, keeping first-mention order.
pub fn build_matrix(choices: &[BackendChoice], precision: Precision) -> HalResult<BackendMatrix> {
    let mut configs: Vec<BackendConfig> = Vec::new();
    for choice in choices {
        let expanded = match choice {
            BackendChoice::All => BackendMatrix::full(precision).configs().to_vec(),
            BackendChoice::Cpu => vec![BackendConfig::cpu(precision)],
            BackendChoice::GpuDefault => {
                vec![BackendConfig::gpu(AccelerationMode::Default, precision)]
            }
            BackendChoice::GpuCustatevec => vec![BackendConfig::gpu(
                AccelerationMode::AcceleratedStatevector,
                precision,
            )],
        };
        for config in expanded {
            if !configs.contains(&config) {
                configs.push(config);
            }
        }
    }
    BackendMatrix::new(configs)
}

/// Registry with the CPU simulator and the GPU engine adapter.
pub fn build_registry(gpu_engine: Option<PathBuf>) -> BackendRegistry {
    let mut registry = BackendRegistry::new();
    registry.register::<SimulatorBackend>(Device::Cpu);
    registry.register_factory(Device::Gpu, move |config| {
        let mut backend = GpuBackend::new(config)?;
        if let Some(path) = &gpu_engine {
            backend = backend.with_engine_path(path.clone());
        }
        Ok(Arc::new(backend) as Arc<dyn Backend>)
    });
    registry
}

/// Print mean times and speedups, one row per qubit count.
pub fn print_summary(summary: &SweepSummary, labels: &[String]) {
    if summary.times.is_empty() {
        println!("  No successful runs.");
        return;
    }

    print!("  {}", style(format!("{:>6}", "qubits")).bold());
    for label in labels {
        print!("  {}", style(format!("{label:>16}")).bold());
    }
    println!();

    for (qubits, row) in &summary.times {
        print!("  {qubits:>6}");
        for label in labels {
            match row.get(label) {
                Some(seconds) => print!("  {:>15.6}s", seconds),
                None => print!("  {}", style(format!("{:>16}", "-")).dim()),
            }
        }
        println!();
    }

    let Some(baseline) = &summary.baseline else {
        return;
    };
    if summary.speedups.is_empty() {
        return;
    }

    println!();
    println!("  Speedup vs {}:", style(baseline).cyan());
    let others: Vec<&String> = labels.iter().filter(|l| *l != baseline).collect();
    print!("  {}", style(format!("{:>6}", "qubits")).bold());
    for label in &others {
        print!("  {}", style(format!("{label:>16}")).bold());
    }
    println!();
    for (qubits, row) in &summary.speedups {
        print!("  {qubits:>6}");
        for label in &others {
            match row.get(label.as_str()) {
                Some(ratio) => print!("  {:>15.2}x", ratio),
                None => print!("  {}", style(format!("{:>16}", "-")).dim()),
            }
        }
        println!();
    }
}

/// One-line counts of a finished sweep.
pub fn print_counts(summary: &SweepSummary) {
    let counts = &summary.counts;
    println!(
        "  {} succeeded, {} failed, {} qubit count(s) skipped",
        style(counts.succeeded).green(),
        if counts.failed > 0 {
            style(counts.failed).red()
        } else {
            style(counts.failed).dim()
        },
        counts.sweep_failures
    );
}
