//! qbench sweep engine
//!
//! Drives a CPU versus GPU state-vector benchmark across a range of qubit
//! counts:
//!
//! - [`generate`]: seeded random circuits over a [`GateVocabulary`]
//! - [`Orchestrator`]: generate, normalize once, run every backend in order
//! - [`ResultStore`] / [`JsonlStore`]: incremental, idempotent persistence
//! - [`summary`] and [`export`]: timing tables, speedups, CSV and JSON
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use qbench_adapter_sim::SimulatorBackend;
//! use qbench_bench::{JsonlStore, Orchestrator, SweepConfig, SweepRange};
//! use qbench_hal::Precision;
//!
//! let config = SweepConfig::new(SweepRange::new(2, 12, 2)?).with_repeats(3);
//! let backends = vec![Arc::new(SimulatorBackend::new(Precision::Double)) as _];
//! let store = JsonlStore::open("results", "demo").await?;
//! let report = Orchestrator::new(config, backends)?.run(&store).await?;
//! println!("{} runs succeeded", report.succeeded);
//! ```

pub mod error;
pub mod export;
pub mod generator;
pub mod orchestrator;
pub mod record;
pub mod store;
pub mod summary;
pub mod sweep;

pub use error::{BenchError, BenchResult, GeneratorError, GeneratorResult, StoreError, StoreResult};
pub use export::{SweepMetadata, SweepSummary};
pub use generator::{CircuitSpec, GateVocabulary, generate};
pub use orchestrator::{NoopObserver, Orchestrator, SweepObserver, SweepReport};
pub use record::{EntryKey, FailureStage, ResultEntry, ResultSet, RunResult, RunStatus, SweepFailure};
pub use store::{JsonlStore, MemoryStore, ResultStore};
pub use summary::{RunCounts, TimingTable};
pub use sweep::{SweepConfig, SweepRange};
