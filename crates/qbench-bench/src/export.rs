//! Derived artifacts: `summary.json` and the per-label CSV.
//!
//! Both are rewritten from the full result set, never appended, and land
//! through a temp file plus rename so readers never see a partial file.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::record::ResultSet;
use crate::summary::{RunCounts, TimingTable, speedups, summarize};
use crate::sweep::SweepConfig;

/// Sweep settings as written into the summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepMetadata {
    pub min_qubits: u32,
    pub max_qubits: u32,
    pub step: u32,
    pub depth: u32,
    pub seed: i64,
    pub gates: String,
    pub repeats: u32,
    pub warmup: bool,
    pub run_timeout_seconds: Option<u64>,
}

impl From<&SweepConfig> for SweepMetadata {
    fn from(config: &SweepConfig) -> Self {
        let range = config.range();
        Self {
            min_qubits: range.min(),
            max_qubits: range.max(),
            step: range.step(),
            depth: config.depth(),
            seed: config.seed(),
            gates: config.vocabulary().to_string(),
            repeats: config.repeats(),
            warmup: config.warmup(),
            run_timeout_seconds: config.run_timeout().map(|t| t.as_secs()),
        }
    }
}

/// Contents of `<run_name>.summary.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepSummary {
    pub run_name: String,
    pub run_id: Uuid,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sweep: Option<SweepMetadata>,
    pub counts: RunCounts,
    pub interrupted: bool,
    /// Mean elapsed seconds, by qubit count then label.
    pub times: TimingTable,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baseline: Option<String>,
    /// `baseline / label` ratios; empty without a baseline.
    #[serde(default)]
    pub speedups: TimingTable,
}

impl SweepSummary {
    /// Summarize a result set. The first label seen is the speedup baseline.
    pub fn new(run_name: impl Into<String>, results: &ResultSet) -> Self {
        let baseline = results.labels().into_iter().next();
        let speedups = baseline
            .as_deref()
            .map(|b| speedups(results, b))
            .unwrap_or_default();
        Self {
            run_name: run_name.into(),
            run_id: Uuid::new_v4(),
            created_at: Utc::now(),
            sweep: None,
            counts: RunCounts::from_results(results),
            interrupted: false,
            times: summarize(results),
            baseline,
            speedups,
        }
    }

    #[must_use]
    pub fn with_sweep(mut self, config: &SweepConfig) -> Self {
        self.sweep = Some(config.into());
        self
    }

    #[must_use]
    pub fn with_interrupted(mut self, interrupted: bool) -> Self {
        self.interrupted = interrupted;
        self
    }

    /// Recompute speedups against a different label.
    #[must_use]
    pub fn with_baseline(mut self, results: &ResultSet, baseline: &str) -> Self {
        self.speedups = speedups(results, baseline);
        self.baseline = Some(baseline.to_string());
        self
    }
}

/// `<dir>/<run_name>.summary.json`
pub fn summary_path(dir: &Path, run_name: &str) -> PathBuf {
    dir.join(format!("{run_name}.summary.json"))
}

/// `<dir>/<run_name>.csv`
pub fn csv_path(dir: &Path, run_name: &str) -> PathBuf {
    dir.join(format!("{run_name}.csv"))
}

pub async fn write_summary(path: &Path, summary: &SweepSummary) -> StoreResult<()> {
    let json = serde_json::to_vec_pretty(summary)?;
    write_atomic(path, &json).await
}

/// One row per qubit count, with `<label>_time` and `<label>_std` per label.
///
/// Cells of failed runs and of sweep failures are left empty.
pub fn to_csv(results: &ResultSet) -> StoreResult<Vec<u8>> {
    let labels = results.labels();
    let mut rows: BTreeMap<u32, Vec<(Option<f64>, Option<f64>)>> = BTreeMap::new();

    for entry in results {
        let row = rows
            .entry(entry.qubit_count())
            .or_insert_with(|| vec![(None, None); labels.len()]);
        if let Some(run) = entry.as_run().filter(|r| r.is_ok()) {
            if let Some(col) = labels.iter().position(|l| l == run.label()) {
                row[col] = (run.elapsed_seconds, run.stddev_seconds);
            }
        }
    }

    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header = vec!["qubit_count".to_string()];
    for label in &labels {
        header.push(format!("{label}_time"));
        header.push(format!("{label}_std"));
    }
    writer.write_record(&header)?;

    let cell = |value: Option<f64>| value.map(|v| v.to_string()).unwrap_or_default();
    for (qubits, row) in rows {
        let mut record = vec![qubits.to_string()];
        for (time, std) in row {
            record.push(cell(time));
            record.push(cell(std));
        }
        writer.write_record(&record)?;
    }

    writer.into_inner().map_err(|e| StoreError::Io(e.into_error()))
}

pub async fn write_csv(path: &Path, results: &ResultSet) -> StoreResult<()> {
    write_atomic(path, &to_csv(results)?).await
}

async fn write_atomic(path: &Path, contents: &[u8]) -> StoreResult<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    let mut file = fs::File::create(&tmp).await?;
    file.write_all(contents).await?;
    file.sync_all().await?;
    drop(file);

    fs::rename(&tmp, path).await?;
    tracing::debug!("Wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{FailureStage, RunResult, SweepFailure};
    use crate::sweep::SweepRange;
    use qbench_hal::{AccelerationMode, BackendConfig, HalError, Precision};
    use std::time::Duration;

    fn results() -> ResultSet {
        let cpu = BackendConfig::cpu(Precision::Double);
        let gpu = BackendConfig::gpu(AccelerationMode::Default, Precision::Double);
        let mut set = ResultSet::new();
        set.push(RunResult::ok(2, cpu.clone(), &[Duration::from_millis(500)]));
        set.push(RunResult::ok(2, gpu.clone(), &[Duration::from_millis(250)]));
        set.push(RunResult::ok(4, cpu, &[Duration::from_secs(1)]));
        set.push(RunResult::failed(4, gpu, &HalError::Timeout(Duration::from_secs(1))));
        set.push(SweepFailure {
            qubit_count: 6,
            stage: FailureStage::Generate,
            error_detail: "no gate".into(),
        });
        set
    }

    #[test]
    fn test_csv_layout() {
        let csv = String::from_utf8(to_csv(&results()).unwrap()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines[0],
            "qubit_count,cpu_time,cpu_std,gpu_default_time,gpu_default_std"
        );
        assert_eq!(lines[1], "2,0.5,0,0.25,0");
        assert_eq!(lines[2], "4,1,0,,");
        assert_eq!(lines[3], "6,,,,");
    }

    #[test]
    fn test_csv_quotes_labels_with_delimiters() {
        let config = BackendConfig::cpu(Precision::Double).with_label("cpu,f64");
        let mut set = ResultSet::new();
        set.push(RunResult::ok(2, config, &[Duration::from_millis(500)]));

        let bytes = to_csv(&set).unwrap();
        let mut reader = csv::Reader::from_reader(bytes.as_slice());
        let header = reader.headers().unwrap().clone();
        assert_eq!(header.len(), 3);
        assert_eq!(&header[1], "cpu,f64_time");

        let rows: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].len(), 3);
        assert_eq!(&rows[0][1], "0.5");
    }

    #[test]
    fn test_summary_uses_first_label_as_baseline() {
        let summary = SweepSummary::new("demo", &results());
        assert_eq!(summary.baseline.as_deref(), Some("cpu"));
        assert!((summary.speedups[&2]["gpu_default"] - 2.0).abs() < 1e-12);
        assert_eq!(summary.counts.failed, 1);
        assert_eq!(summary.counts.sweep_failures, 1);
    }

    #[tokio::test]
    async fn test_write_summary_and_csv() {
        let dir = tempfile::tempdir().unwrap();
        let config = SweepConfig::new(SweepRange::new(2, 6, 2).unwrap());
        let summary = SweepSummary::new("demo", &results())
            .with_sweep(&config)
            .with_interrupted(true);

        let path = summary_path(dir.path(), "demo");
        write_summary(&path, &summary).await.unwrap();
        let back: SweepSummary =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(back, summary);

        let csv = csv_path(dir.path(), "demo");
        write_csv(&csv, &results()).await.unwrap();
        assert!(std::fs::read_to_string(&csv).unwrap().starts_with("qubit_count,"));

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert!(names.iter().all(|n| !n.ends_with(".tmp")));
    }
}
