//! Error types for the normalization crate.

use thiserror::Error;

/// Errors that can occur during normalization.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CompileError {
    /// Error from the IR crate.
    #[error("IR error: {0}")]
    Ir(#[from] qbench_ir::IrError),

    /// A gate has no decomposition into the target basis.
    #[error("Gate '{gate}' cannot be decomposed into basis [{basis}]")]
    UnsupportedGate {
        /// Name of the offending gate.
        gate: String,
        /// The target basis, comma separated.
        basis: String,
    },

    /// A gate outside the basis survived translation.
    #[error("Gate '{gate}' at position {position} is not in basis [{basis}]")]
    NotCanonical {
        /// Name of the offending gate.
        gate: String,
        /// Instruction index.
        position: usize,
        /// The target basis, comma separated.
        basis: String,
    },

    /// Pass execution failed.
    #[error("Pass '{name}' failed: {reason}")]
    PassFailed { name: String, reason: String },

    /// Invalid normalizer configuration.
    #[error("Invalid normalizer configuration: {0}")]
    InvalidConfiguration(String),
}

impl CompileError {
    /// Whether this error means a gate could not be expressed in the basis.
    pub fn is_unsupported_gate(&self) -> bool {
        matches!(
            self,
            CompileError::UnsupportedGate { .. } | CompileError::NotCanonical { .. }
        )
    }
}

/// Result type for normalization operations.
pub type CompileResult<T> = Result<T, CompileError>;
