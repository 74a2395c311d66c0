//! Backends command implementation.

use std::path::PathBuf;

use anyhow::Result;
use console::style;

use qbench_adapter_gpu::default_engine_path;
use qbench_adapter_sim::SimulatorBackend;
use qbench_hal::{BackendMatrix, Precision};

use super::common::build_registry;

/// Execute the backends command.
pub fn execute(precision: Precision, gpu_engine: Option<PathBuf>) -> Result<()> {
    println!("{} Backend configurations:\n", style("qbench").cyan().bold());

    let engine = gpu_engine.clone().unwrap_or_else(default_engine_path);
    let registry = build_registry(gpu_engine);

    for config in &BackendMatrix::full(precision) {
        let backend = registry.create(config.clone())?;
        let availability = backend.availability();

        println!(
            "  {} {} ({})",
            if availability.is_available {
                style("●").green()
            } else {
                style("○").red()
            },
            style(config.label()).bold(),
            backend.name()
        );
        println!("    Device: {}", config.device());
        if let Some(mode) = config.acceleration_mode() {
            println!("    Mode: {mode}");
        }
        println!("    Precision: {}", config.precision());
        if let Some(count) = availability.device_count {
            println!("    Devices: {count}");
        }
        if let Some(message) = &availability.status_message {
            println!("    Status: {message}");
        }
        println!();
    }

    if let Some(limit) = SimulatorBackend::new(precision).memory_limit() {
        let bytes = u128::from(precision.bytes_per_amplitude());
        let max_qubits = (0u32..128)
            .take_while(|&n| (1u128 << n).checked_mul(bytes).is_some_and(|b| b <= u128::from(limit)))
            .last()
            .unwrap_or(0);
        println!(
            "  CPU memory limit: {:.1} GiB (up to {} qubits at {} precision)",
            limit as f64 / f64::from(1u32 << 30),
            max_qubits,
            precision
        );
    }
    println!("  GPU engine: {}", style(engine.display()).dim());

    Ok(())
}
