//! Aggregates over recorded results. Failed runs never contribute.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::record::ResultSet;

/// Mean elapsed seconds per qubit count, then per backend label.
pub type TimingTable = BTreeMap<u32, BTreeMap<String, f64>>;

/// Successful runs only, keyed by qubit count and label.
pub fn summarize(results: &ResultSet) -> TimingTable {
    let mut table = TimingTable::new();
    for run in results.runs().filter(|r| r.is_ok()) {
        if let Some(elapsed) = run.elapsed_seconds {
            table
                .entry(run.qubit_count)
                .or_default()
                .insert(run.label().to_string(), elapsed);
        }
    }
    table
}

/// `baseline / other` for every other label at every qubit count where
/// both succeeded with a non-zero time.
pub fn speedups(results: &ResultSet, baseline_label: &str) -> TimingTable {
    let mut table = TimingTable::new();
    for (qubits, row) in summarize(results) {
        let Some(&baseline) = row.get(baseline_label) else {
            continue;
        };
        let ratios: BTreeMap<String, f64> = row
            .iter()
            .filter(|(label, elapsed)| label.as_str() != baseline_label && **elapsed > 0.0)
            .map(|(label, elapsed)| (label.clone(), baseline / elapsed))
            .collect();
        if !ratios.is_empty() {
            table.insert(qubits, ratios);
        }
    }
    table
}

/// Outcome counts of a sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunCounts {
    pub succeeded: usize,
    pub failed: usize,
    pub sweep_failures: usize,
}

impl RunCounts {
    pub fn from_results(results: &ResultSet) -> Self {
        let mut counts = Self::default();
        for run in results.runs() {
            if run.is_ok() {
                counts.succeeded += 1;
            } else {
                counts.failed += 1;
            }
        }
        counts.sweep_failures = results.sweep_failures().count();
        counts
    }

    pub fn total_runs(&self) -> usize {
        self.succeeded + self.failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{FailureStage, RunResult, SweepFailure};
    use qbench_hal::{AccelerationMode, BackendConfig, HalError, Precision};
    use std::time::Duration;

    fn sample() -> ResultSet {
        let cpu = BackendConfig::cpu(Precision::Double);
        let gpu = BackendConfig::gpu(AccelerationMode::Default, Precision::Double);
        let mut set = ResultSet::new();
        set.push(RunResult::ok(2, cpu.clone(), &[Duration::from_millis(400)]));
        set.push(RunResult::ok(2, gpu.clone(), &[Duration::from_millis(100)]));
        set.push(RunResult::ok(4, cpu.clone(), &[Duration::from_millis(800)]));
        set.push(RunResult::failed(
            4,
            gpu,
            &HalError::ResourceExhausted {
                num_qubits: 4,
                required_bytes: 256,
                limit_bytes: Some(1),
            },
        ));
        set.push(SweepFailure {
            qubit_count: 6,
            stage: FailureStage::Normalize,
            error_detail: "unsupported".into(),
        });
        set
    }

    #[test]
    fn test_summarize_skips_failures() {
        let table = summarize(&sample());
        assert_eq!(table.len(), 2);
        assert_eq!(table[&2].len(), 2);
        assert_eq!(table[&4].len(), 1);
        assert!(!table[&4].contains_key("gpu_default"));
    }

    #[test]
    fn test_speedups_against_cpu() {
        let table = speedups(&sample(), "cpu");
        assert_eq!(table.len(), 1);
        assert!((table[&2]["gpu_default"] - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_speedups_unknown_baseline() {
        assert!(speedups(&sample(), "tpu").is_empty());
    }

    #[test]
    fn test_counts() {
        let counts = RunCounts::from_results(&sample());
        assert_eq!(
            counts,
            RunCounts {
                succeeded: 3,
                failed: 1,
                sweep_failures: 1
            }
        );
        assert_eq!(counts.total_runs(), 4);
    }
}
