//! Result records.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use qbench_hal::{BackendConfig, FailureKind, HalError};

/// Outcome of one (qubit count, backend) run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Ok,
    Failed,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RunStatus::Ok => "ok",
            RunStatus::Failed => "failed",
        })
    }
}

/// Timing of one backend configuration at one qubit count.
///
/// Failed runs carry no timing at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub qubit_count: u32,
    #[serde(flatten)]
    pub backend_config: BackendConfig,
    /// Mean simulation time over the repeats.
    pub elapsed_seconds: Option<f64>,
    /// Population standard deviation over the repeats.
    #[serde(default)]
    pub stddev_seconds: Option<f64>,
    /// Every timed repeat, in execution order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub samples: Vec<f64>,
    pub status: RunStatus,
    #[serde(default)]
    pub error_kind: Option<FailureKind>,
    pub error_detail: Option<String>,
}

impl RunResult {
    /// Successful run from its timed repeats.
    pub fn ok(qubit_count: u32, backend_config: BackendConfig, samples: &[Duration]) -> Self {
        let samples: Vec<f64> = samples.iter().map(Duration::as_secs_f64).collect();
        let (mean, std) = mean_and_std(&samples);
        Self {
            qubit_count,
            backend_config,
            elapsed_seconds: Some(mean),
            stddev_seconds: Some(std),
            samples,
            status: RunStatus::Ok,
            error_kind: None,
            error_detail: None,
        }
    }

    /// Failed run.
    pub fn failed(qubit_count: u32, backend_config: BackendConfig, error: &HalError) -> Self {
        Self {
            qubit_count,
            backend_config,
            elapsed_seconds: None,
            stddev_seconds: None,
            samples: Vec::new(),
            status: RunStatus::Failed,
            error_kind: Some(error.kind()),
            error_detail: Some(error.to_string()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == RunStatus::Ok
    }

    pub fn label(&self) -> &str {
        self.backend_config.label()
    }
}

fn mean_and_std(samples: &[f64]) -> (f64, f64) {
    if samples.is_empty() {
        return (0.0, 0.0);
    }
    let n = samples.len() as f64;
    let mean = samples.iter().sum::<f64>() / n;
    let var = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
    (mean, var.sqrt())
}

/// Pipeline step that failed for a whole qubit count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    Generate,
    Normalize,
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FailureStage::Generate => "generate",
            FailureStage::Normalize => "normalize",
        })
    }
}

/// A qubit count that never reached the backends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepFailure {
    pub qubit_count: u32,
    pub stage: FailureStage,
    pub error_detail: String,
}

/// One line of a result file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResultEntry {
    Run(RunResult),
    SweepFailure(SweepFailure),
}

/// Identity of an entry within one result file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntryKey {
    Run { qubit_count: u32, label: String },
    SweepFailure { qubit_count: u32, stage: FailureStage },
}

impl ResultEntry {
    pub fn key(&self) -> EntryKey {
        match self {
            ResultEntry::Run(run) => EntryKey::Run {
                qubit_count: run.qubit_count,
                label: run.label().to_string(),
            },
            ResultEntry::SweepFailure(failure) => EntryKey::SweepFailure {
                qubit_count: failure.qubit_count,
                stage: failure.stage,
            },
        }
    }

    pub fn qubit_count(&self) -> u32 {
        match self {
            ResultEntry::Run(run) => run.qubit_count,
            ResultEntry::SweepFailure(failure) => failure.qubit_count,
        }
    }

    pub fn as_run(&self) -> Option<&RunResult> {
        match self {
            ResultEntry::Run(run) => Some(run),
            ResultEntry::SweepFailure(_) => None,
        }
    }
}

impl From<RunResult> for ResultEntry {
    fn from(run: RunResult) -> Self {
        ResultEntry::Run(run)
    }
}

impl From<SweepFailure> for ResultEntry {
    fn from(failure: SweepFailure) -> Self {
        ResultEntry::SweepFailure(failure)
    }
}

/// Entries in execution order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultSet {
    entries: Vec<ResultEntry>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: impl Into<ResultEntry>) {
        self.entries.push(entry.into());
    }

    pub fn entries(&self) -> &[ResultEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ResultEntry> {
        self.entries.iter()
    }

    /// Run results, failed ones included.
    pub fn runs(&self) -> impl Iterator<Item = &RunResult> {
        self.entries.iter().filter_map(ResultEntry::as_run)
    }

    pub fn sweep_failures(&self) -> impl Iterator<Item = &SweepFailure> {
        self.entries.iter().filter_map(|e| match e {
            ResultEntry::SweepFailure(f) => Some(f),
            ResultEntry::Run(_) => None,
        })
    }

    /// Labels in order of first appearance.
    pub fn labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = Vec::new();
        for run in self.runs() {
            if !labels.iter().any(|l| l == run.label()) {
                labels.push(run.label().to_string());
            }
        }
        labels
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_entries(self) -> Vec<ResultEntry> {
        self.entries
    }
}

impl Extend<ResultEntry> for ResultSet {
    fn extend<I: IntoIterator<Item = ResultEntry>>(&mut self, iter: I) {
        self.entries.extend(iter);
    }
}

impl FromIterator<ResultEntry> for ResultSet {
    fn from_iter<I: IntoIterator<Item = ResultEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a ResultEntry;
    type IntoIter = std::slice::Iter<'a, ResultEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qbench_hal::{AccelerationMode, Precision};
    use serde_json::json;

    #[test]
    fn test_ok_result_statistics() {
        let samples = [Duration::from_millis(100), Duration::from_millis(300)];
        let run = RunResult::ok(4, BackendConfig::cpu(Precision::Double), &samples);
        assert!((run.elapsed_seconds.unwrap() - 0.2).abs() < 1e-12);
        assert!((run.stddev_seconds.unwrap() - 0.1).abs() < 1e-12);
        assert_eq!(run.samples.len(), 2);
    }

    #[test]
    fn test_failed_result_has_no_timing() {
        let run = RunResult::failed(
            4,
            BackendConfig::gpu(AccelerationMode::Default, Precision::Double),
            &HalError::BackendUnavailable("no device".into()),
        );
        assert_eq!(run.elapsed_seconds, None);
        assert_eq!(run.error_kind, Some(FailureKind::Unavailable));
        assert!(run.error_detail.unwrap().contains("no device"));
    }

    #[test]
    fn test_run_line_layout() {
        let run = RunResult::failed(
            6,
            BackendConfig::gpu(AccelerationMode::AcceleratedStatevector, Precision::Single),
            &HalError::BackendUnavailable("missing engine".into()),
        );
        let value = serde_json::to_value(ResultEntry::Run(run)).unwrap();
        assert_eq!(value["kind"], "run");
        assert_eq!(value["qubit_count"], 6);
        assert_eq!(value["device"], "gpu");
        assert_eq!(value["acceleration_mode"], "accelerated-statevector");
        assert_eq!(value["precision"], "single");
        assert_eq!(value["label"], "gpu_custatevec");
        assert_eq!(value["status"], "failed");
        assert_eq!(value["elapsed_seconds"], serde_json::Value::Null);
        assert_eq!(value["error_kind"], "unavailable");
    }

    #[test]
    fn test_cpu_line_has_null_mode() {
        let run = RunResult::ok(2, BackendConfig::cpu(Precision::Double), &[Duration::ZERO]);
        let value = serde_json::to_value(ResultEntry::Run(run)).unwrap();
        assert_eq!(value["acceleration_mode"], serde_json::Value::Null);
        assert_eq!(value["error_detail"], serde_json::Value::Null);
    }

    #[test]
    fn test_entry_roundtrip_through_json_line() {
        let entry = ResultEntry::Run(RunResult::ok(
            8,
            BackendConfig::cpu(Precision::Single),
            &[Duration::from_millis(500)],
        ));
        let line = serde_json::to_string(&entry).unwrap();
        let back: ResultEntry = serde_json::from_str(&line).unwrap();
        assert_eq!(back, entry);
    }

    #[test]
    fn test_sweep_failure_line() {
        let value = json!({
            "kind": "sweep_failure",
            "qubit_count": 3,
            "stage": "normalize",
            "error_detail": "Gate 'cp' cannot be decomposed"
        });
        let entry: ResultEntry = serde_json::from_value(value).unwrap();
        assert_eq!(
            entry.key(),
            EntryKey::SweepFailure {
                qubit_count: 3,
                stage: FailureStage::Normalize
            }
        );
    }

    #[test]
    fn test_labels_in_first_seen_order() {
        let mut set = ResultSet::new();
        set.push(RunResult::ok(2, BackendConfig::cpu(Precision::Double), &[Duration::ZERO]));
        set.push(RunResult::failed(
            2,
            BackendConfig::gpu(AccelerationMode::Default, Precision::Double),
            &HalError::Cancelled,
        ));
        set.push(RunResult::ok(4, BackendConfig::cpu(Precision::Double), &[Duration::ZERO]));
        assert_eq!(set.labels(), vec!["cpu", "gpu_default"]);
    }
}
