//! The sweep driver.
//!
//! For every qubit count the orchestrator generates one circuit, normalizes
//! it once and hands the same read-only canonical circuit to each backend
//! in matrix order. Runs are strictly sequential: each blocking backend call
//! is awaited before the next is dispatched, so at most one simulation holds
//! the device at any time.

use std::sync::Arc;
use std::time::Duration;

use qbench_compile::{CanonicalCircuit, Normalizer};
use qbench_hal::{Backend, BackendConfig, CancelFlag, HalError, HalResult};
use rustc_hash::FxHashSet;
use tracing::{debug, info, warn};

use crate::error::{BenchError, BenchResult};
use crate::generator::{CircuitSpec, generate};
use crate::record::{FailureStage, ResultEntry, ResultSet, RunResult, SweepFailure};
use crate::store::ResultStore;
use crate::sweep::SweepConfig;

/// How long a timed-out worker gets to notice its cancel flag.
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(5);

/// Progress callbacks. Every method defaults to a no-op.
pub trait SweepObserver: Send + Sync {
    /// A qubit count is about to be prepared. `index` is zero-based.
    fn qubit_count_started(&self, _qubit_count: u32, _index: usize, _total: usize) {}

    /// The canonical circuit for a qubit count is ready.
    fn circuit_ready(&self, _qubit_count: u32, _circuit: &CanonicalCircuit) {}

    /// A backend is about to run.
    fn run_started(&self, _qubit_count: u32, _config: &BackendConfig) {}

    /// A backend run finished, successfully or not.
    fn run_finished(&self, _result: &RunResult) {}

    /// A qubit count never reached the backends.
    fn sweep_failed(&self, _failure: &SweepFailure) {}
}

/// Observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl SweepObserver for NoopObserver {}

/// Outcome of a sweep.
#[derive(Debug, Clone, Default)]
pub struct SweepReport {
    pub succeeded: usize,
    pub failed: usize,
    pub sweep_failures: usize,
    /// The sweep stopped early on an interrupt.
    pub interrupted: bool,
    /// Every entry produced, in execution order.
    pub results: ResultSet,
}

/// Runs a [`SweepConfig`] against a fixed list of backends.
pub struct Orchestrator {
    config: SweepConfig,
    backends: Vec<Arc<dyn Backend>>,
    normalizer: Normalizer,
    cancel: CancelFlag,
    observer: Arc<dyn SweepObserver>,
    grace_period: Duration,
}

impl Orchestrator {
    /// Create an orchestrator.
    ///
    /// # Errors
    ///
    /// [`BenchError::InvalidConfig`] for an invalid config, an empty backend
    /// list or two backends sharing a label.
    pub fn new(config: SweepConfig, backends: Vec<Arc<dyn Backend>>) -> BenchResult<Self> {
        config.validate()?;
        if backends.is_empty() {
            return Err(BenchError::InvalidConfig("no backends configured".into()));
        }
        let mut labels = FxHashSet::default();
        for backend in &backends {
            let label = backend.config().label();
            if !labels.insert(label.to_string()) {
                return Err(BenchError::InvalidConfig(format!(
                    "backend label '{label}' is used twice"
                )));
            }
        }

        Ok(Self {
            config,
            backends,
            normalizer: Normalizer::new(),
            cancel: CancelFlag::new(),
            observer: Arc::new(NoopObserver),
            grace_period: DEFAULT_GRACE_PERIOD,
        })
    }

    #[must_use]
    pub fn with_normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// Use an externally owned sweep-wide cancel flag.
    #[must_use]
    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn SweepObserver>) -> Self {
        self.observer = observer;
        self
    }

    #[must_use]
    pub fn with_grace_period(mut self, grace_period: Duration) -> Self {
        self.grace_period = grace_period;
        self
    }

    /// Raising this flag interrupts the sweep after the in-flight run.
    pub fn cancel_flag(&self) -> &CancelFlag {
        &self.cancel
    }

    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    pub fn backends(&self) -> &[Arc<dyn Backend>] {
        &self.backends
    }

    /// Run the whole sweep, flushing each qubit count's entries to `store`
    /// before moving on.
    ///
    /// # Errors
    ///
    /// Store failures abort the sweep. If no qubit count produced a
    /// canonical circuit (and the sweep was not interrupted) the result is
    /// [`BenchError::NoCanonicalCircuit`]. Backend failures never abort;
    /// they are recorded as failed runs.
    pub async fn run(&self, store: &dyn ResultStore) -> BenchResult<SweepReport> {
        let range = self.config.range();
        let total = range.len();
        info!(
            "Sweeping {}..={} step {} over {} backend(s), results to {}",
            range.min(),
            range.max(),
            range.step(),
            self.backends.len(),
            store.location()
        );

        let mut report = SweepReport::default();
        let mut produced = 0usize;

        for (index, qubits) in range.values().enumerate() {
            if self.cancel.is_cancelled() {
                report.interrupted = true;
                break;
            }
            self.observer.qubit_count_started(qubits, index, total);

            let mut batch: Vec<ResultEntry> = Vec::with_capacity(self.backends.len());
            match self.prepare(qubits) {
                Err(failure) => {
                    warn!(
                        "Skipping {} qubits ({}): {}",
                        qubits, failure.stage, failure.error_detail
                    );
                    self.observer.sweep_failed(&failure);
                    report.sweep_failures += 1;
                    batch.push(failure.into());
                }
                Ok(circuit) => {
                    produced += 1;
                    let circuit = Arc::new(circuit);
                    self.observer.circuit_ready(qubits, &circuit);

                    for backend in &self.backends {
                        let result = self.measure(backend, &circuit, qubits).await;
                        if result.is_ok() {
                            report.succeeded += 1;
                        } else {
                            report.failed += 1;
                        }
                        self.observer.run_finished(&result);
                        batch.push(result.into());

                        if self.cancel.is_cancelled() {
                            report.interrupted = true;
                            break;
                        }
                    }
                }
            }

            store.record(&batch).await?;
            report.results.extend(batch);
            info!("Completed {} qubits ({}/{})", qubits, index + 1, total);

            if report.interrupted {
                break;
            }
        }

        if report.interrupted {
            warn!("Sweep interrupted; flushed results are kept");
        } else if produced == 0 {
            return Err(BenchError::NoCanonicalCircuit { attempted: total });
        }

        info!(
            "Sweep finished: {} succeeded, {} failed, {} qubit count(s) skipped",
            report.succeeded, report.failed, report.sweep_failures
        );
        Ok(report)
    }

    /// Generate and normalize the circuit for one qubit count.
    fn prepare(&self, qubits: u32) -> Result<CanonicalCircuit, SweepFailure> {
        let failure = |stage, detail: String| SweepFailure {
            qubit_count: qubits,
            stage,
            error_detail: detail,
        };

        let circuit = CircuitSpec::new(
            qubits,
            self.config.depth(),
            self.config.seed(),
            self.config.vocabulary().clone(),
        )
        .and_then(|spec| generate(&spec))
        .map_err(|e| failure(FailureStage::Generate, e.to_string()))?;

        let canonical = self
            .normalizer
            .normalize(&circuit)
            .map_err(|e| failure(FailureStage::Normalize, e.to_string()))?;

        debug!(
            "Prepared {} qubits: {} gates -> {} canonical gates, depth {}",
            qubits,
            circuit.len(),
            canonical.len(),
            canonical.depth()
        );
        Ok(canonical)
    }

    /// Warm-up plus timed repeats of one backend. Any failure fails the run.
    async fn measure(
        &self,
        backend: &Arc<dyn Backend>,
        circuit: &Arc<CanonicalCircuit>,
        qubits: u32,
    ) -> RunResult {
        let config = backend.config().clone();
        self.observer.run_started(qubits, &config);

        if self.config.warmup() {
            if let Err(e) = self.execute_once(backend, circuit).await {
                warn!("{} warm-up failed at {} qubits: {}", config, qubits, e);
                return RunResult::failed(qubits, config, &e);
            }
        }

        let repeats = self.config.repeats() as usize;
        let mut samples = Vec::with_capacity(repeats);
        for _ in 0..repeats {
            match self.execute_once(backend, circuit).await {
                Ok(elapsed) => samples.push(elapsed),
                Err(e) => {
                    warn!("{} failed at {} qubits: {}", config, qubits, e);
                    return RunResult::failed(qubits, config, &e);
                }
            }
        }

        let result = RunResult::ok(qubits, config, &samples);
        debug!(
            "{} at {} qubits: {:.6}s",
            result.backend_config,
            qubits,
            result.elapsed_seconds.unwrap_or_default()
        );
        result
    }

    /// One blocking backend call on the blocking pool, bounded by the run
    /// timeout.
    async fn execute_once(
        &self,
        backend: &Arc<dyn Backend>,
        circuit: &Arc<CanonicalCircuit>,
    ) -> HalResult<Duration> {
        let run_flag = self.cancel.child();
        let mut worker = {
            let backend = Arc::clone(backend);
            let circuit = Arc::clone(circuit);
            let flag = run_flag.clone();
            tokio::task::spawn_blocking(move || backend.execute(&circuit, &flag))
        };

        let joined = match self.config.run_timeout() {
            None => (&mut worker).await,
            Some(limit) => match tokio::time::timeout(limit, &mut worker).await {
                Ok(joined) => joined,
                Err(_) => {
                    run_flag.cancel();
                    if tokio::time::timeout(self.grace_period, &mut worker)
                        .await
                        .is_err()
                    {
                        warn!(
                            "{} ignored cancellation for {:?}; detaching worker",
                            backend.name(),
                            self.grace_period
                        );
                    }
                    return Err(HalError::Timeout(limit));
                }
            },
        };

        joined.map_err(|e| HalError::Backend(format!("backend worker failed: {e}")))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::sweep::SweepRange;
    use qbench_hal::{BackendAvailability, Cancellation, Precision};

    struct Quick {
        config: BackendConfig,
    }

    impl Backend for Quick {
        fn name(&self) -> &str {
            "instant"
        }
        fn config(&self) -> &BackendConfig {
            &self.config
        }
        fn availability(&self) -> BackendAvailability {
            BackendAvailability::always_available()
        }
        fn execute(&self, _: &CanonicalCircuit, _: &dyn Cancellation) -> HalResult<Duration> {
            Ok(Duration::from_millis(1))
        }
    }

    fn cpu() -> Arc<dyn Backend> {
        Arc::new(Quick {
            config: BackendConfig::cpu(Precision::Double),
        })
    }

    fn config() -> SweepConfig {
        SweepConfig::new(SweepRange::new(1, 3, 1).unwrap()).with_depth(2)
    }

    #[test]
    fn test_rejects_empty_backends() {
        assert!(matches!(
            Orchestrator::new(config(), Vec::new()),
            Err(BenchError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_rejects_duplicate_labels() {
        assert!(matches!(
            Orchestrator::new(config(), vec![cpu(), cpu()]),
            Err(BenchError::InvalidConfig(_))
        ));
    }

    #[tokio::test]
    async fn test_basic_sweep() {
        let store = MemoryStore::new();
        let report = Orchestrator::new(config(), vec![cpu()])
            .unwrap()
            .run(&store)
            .await
            .unwrap();
        assert_eq!(report.succeeded, 3);
        assert_eq!(report.failed, 0);
        assert!(!report.interrupted);
        assert_eq!(store.load().await.unwrap(), report.results);
    }

    #[tokio::test]
    async fn test_pre_cancelled_sweep_runs_nothing() {
        let store = MemoryStore::new();
        let orchestrator = Orchestrator::new(config(), vec![cpu()]).unwrap();
        orchestrator.cancel_flag().cancel();
        let report = orchestrator.run(&store).await.unwrap();
        assert!(report.interrupted);
        assert!(report.results.is_empty());
    }
}
