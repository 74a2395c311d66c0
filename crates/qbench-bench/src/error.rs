//! Error handling for benchmark sweeps.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for sweep operations.
pub type BenchResult<T> = Result<T, BenchError>;

/// Result type for circuit generation.
pub type GeneratorResult<T> = Result<T, GeneratorError>;

/// Result type for result storage.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that abort a sweep.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum BenchError {
    /// The qubit sweep bounds are inconsistent.
    #[error("Invalid sweep range: {0}")]
    InvalidSweepRange(String),

    /// A sweep setting is out of range.
    #[error("Invalid sweep configuration: {0}")]
    InvalidConfig(String),

    /// Not a single qubit count yielded a runnable circuit.
    #[error("No canonical circuit could be produced for any of the {attempted} qubit counts")]
    NoCanonicalCircuit { attempted: usize },

    /// Results could not be persisted.
    #[error("Result store error: {0}")]
    Store(#[from] StoreError),
}

/// Errors from the circuit generator.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum GeneratorError {
    /// A circuit spec field is out of range.
    #[error("Invalid circuit spec: {0}")]
    InvalidSpec(String),

    /// The gate vocabulary has no gates.
    #[error("Gate vocabulary is empty")]
    EmptyVocabulary,

    /// Every vocabulary gate needs more qubits than the circuit has.
    #[error("No gate in [{vocabulary}] fits on {qubit_count} qubit(s)")]
    NoApplicableGate { qubit_count: u32, vocabulary: String },

    /// A generated instruction was rejected by the IR.
    #[error("IR error: {0}")]
    Ir(#[from] qbench_ir::IrError),
}

/// Errors from result storage and export.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum StoreError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV encoding error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A record in the middle of a result file does not parse.
    #[error("Corrupt record at {}:{line}: {reason}", path.display())]
    Corrupt {
        path: PathBuf,
        line: usize,
        reason: String,
    },
}
