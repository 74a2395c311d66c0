//! Sweep configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{BenchError, BenchResult};
use crate::generator::GateVocabulary;

/// Per-run time budget when none is configured.
pub const DEFAULT_RUN_TIMEOUT: Duration = Duration::from_secs(3600);

/// Qubit counts `min, min + step, …` up to and including `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepRange {
    min: u32,
    max: u32,
    step: u32,
}

impl SweepRange {
    /// Validate bounds: `min >= 1`, `step >= 1` and `max >= min`.
    pub fn new(min: u32, max: u32, step: u32) -> BenchResult<Self> {
        if min == 0 {
            return Err(BenchError::InvalidSweepRange(
                "min_qubits must be at least 1".into(),
            ));
        }
        if step == 0 {
            return Err(BenchError::InvalidSweepRange("step must be at least 1".into()));
        }
        if max < min {
            return Err(BenchError::InvalidSweepRange(format!(
                "max_qubits ({max}) is below min_qubits ({min})"
            )));
        }
        Ok(Self { min, max, step })
    }

    pub fn min(&self) -> u32 {
        self.min
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn step(&self) -> u32 {
        self.step
    }

    /// Qubit counts in increasing order.
    pub fn values(&self) -> impl Iterator<Item = u32> + use<> {
        let (max, step) = (self.max, self.step);
        std::iter::successors(Some(self.min), move |&n| n.checked_add(step))
            .take_while(move |&n| n <= max)
    }

    /// Number of qubit counts in the sweep.
    pub fn len(&self) -> usize {
        ((self.max - self.min) / self.step) as usize + 1
    }

    /// Always false; a valid range has at least one value.
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Everything that shapes a sweep except the backends.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepConfig {
    range: SweepRange,
    depth: u32,
    seed: i64,
    vocabulary: GateVocabulary,
    repeats: u32,
    warmup: bool,
    run_timeout: Option<Duration>,
}

impl SweepConfig {
    /// Defaults: depth 10, seed 42, full vocabulary, one repeat, no warm-up,
    /// one hour per run.
    pub fn new(range: SweepRange) -> Self {
        Self {
            range,
            depth: 10,
            seed: 42,
            vocabulary: GateVocabulary::full(),
            repeats: 1,
            warmup: false,
            run_timeout: Some(DEFAULT_RUN_TIMEOUT),
        }
    }

    #[must_use]
    pub fn with_depth(mut self, depth: u32) -> Self {
        self.depth = depth;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: i64) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn with_vocabulary(mut self, vocabulary: GateVocabulary) -> Self {
        self.vocabulary = vocabulary;
        self
    }

    /// Timed executions per (qubit count, backend).
    #[must_use]
    pub fn with_repeats(mut self, repeats: u32) -> Self {
        self.repeats = repeats;
        self
    }

    /// Run once untimed before the repeats.
    #[must_use]
    pub fn with_warmup(mut self, warmup: bool) -> Self {
        self.warmup = warmup;
        self
    }

    /// Per-execution budget; `None` waits indefinitely.
    #[must_use]
    pub fn with_run_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.run_timeout = timeout.filter(|t| !t.is_zero());
        self
    }

    /// Check the settings the builders cannot reject.
    pub fn validate(&self) -> BenchResult<()> {
        if self.depth == 0 {
            return Err(BenchError::InvalidConfig("depth must be at least 1".into()));
        }
        if self.repeats == 0 {
            return Err(BenchError::InvalidConfig("repeats must be at least 1".into()));
        }
        Ok(())
    }

    pub fn range(&self) -> SweepRange {
        self.range
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn seed(&self) -> i64 {
        self.seed
    }

    pub fn vocabulary(&self) -> &GateVocabulary {
        &self.vocabulary
    }

    pub fn repeats(&self) -> u32 {
        self.repeats
    }

    pub fn warmup(&self) -> bool {
        self.warmup
    }

    pub fn run_timeout(&self) -> Option<Duration> {
        self.run_timeout
    }
}
