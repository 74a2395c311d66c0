//! Summarize command implementation.

use std::path::Path;

use anyhow::{Context, Result};
use console::style;

use qbench_bench::{JsonlStore, SweepSummary};

use super::common::{print_counts, print_summary};

/// Execute the summarize command.
pub async fn execute(input: &Path, baseline: Option<&str>) -> Result<()> {
    let results = JsonlStore::read(input)
        .await
        .with_context(|| format!("cannot read {}", input.display()))?;

    let run_name = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let labels = results.labels();

    let mut summary = SweepSummary::new(run_name.as_str(), &results);
    if let Some(baseline) = baseline {
        if !labels.iter().any(|l| l == baseline) {
            anyhow::bail!(
                "baseline '{}' not found (recorded labels: {})",
                baseline,
                labels.join(", ")
            );
        }
        summary = summary.with_baseline(&results, baseline);
    }

    println!(
        "{} {} ({} entries)\n",
        style("→").cyan().bold(),
        style(input.display()).green(),
        results.len()
    );
    print_summary(&summary, &labels);
    println!();
    print_counts(&summary);

    for failure in results.sweep_failures() {
        println!(
            "  {} {} qubits skipped ({}): {}",
            style("✗").red(),
            failure.qubit_count,
            failure.stage,
            failure.error_detail
        );
    }

    Ok(())
}
