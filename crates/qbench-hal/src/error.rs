//! Error types for the HAL crate.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur in HAL operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HalError {
    /// Requested device or acceleration mode is not present.
    #[error("Backend not available: {0}")]
    BackendUnavailable(String),

    /// The state vector does not fit in memory.
    #[error(
        "Resource exhausted: {num_qubits}-qubit state vector needs {} bytes{}",
        required_bytes,
        format_limit(.limit_bytes)
    )]
    ResourceExhausted {
        /// Width of the circuit.
        num_qubits: u32,
        /// Bytes the state vector needs.
        required_bytes: u128,
        /// Bytes the backend may use, if known.
        limit_bytes: Option<u64>,
    },

    /// The run exceeded its time budget.
    #[error("Backend did not finish within {0:?}")]
    Timeout(Duration),

    /// The run was cancelled before it finished.
    #[error("Run cancelled")]
    Cancelled,

    /// Invalid backend configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Circuit the backend cannot execute.
    #[error("Invalid circuit: {0}")]
    InvalidCircuit(String),

    /// Generic backend error.
    #[error("Backend error: {0}")]
    Backend(String),
}

fn format_limit(limit: &Option<u64>) -> String {
    match limit {
        Some(bytes) => format!(" but the limit is {bytes} bytes"),
        None => String::new(),
    }
}

/// Machine-readable class of a failed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Device or mode not present.
    Unavailable,
    /// Not enough memory for the state vector.
    ResourceExhausted,
    /// Exceeded the per-run timeout.
    Timeout,
    /// Interrupted.
    Cancelled,
    /// Rejected configuration or circuit.
    Invalid,
    /// Any other engine failure.
    Backend,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FailureKind::Unavailable => "unavailable",
            FailureKind::ResourceExhausted => "resource_exhausted",
            FailureKind::Timeout => "timeout",
            FailureKind::Cancelled => "cancelled",
            FailureKind::Invalid => "invalid",
            FailureKind::Backend => "backend",
        };
        f.write_str(s)
    }
}

impl HalError {
    /// Classify this error for result records.
    pub fn kind(&self) -> FailureKind {
        match self {
            HalError::BackendUnavailable(_) => FailureKind::Unavailable,
            HalError::ResourceExhausted { .. } => FailureKind::ResourceExhausted,
            HalError::Timeout(_) => FailureKind::Timeout,
            HalError::Cancelled => FailureKind::Cancelled,
            HalError::InvalidConfiguration(_) | HalError::InvalidCircuit(_) => {
                FailureKind::Invalid
            }
            HalError::Backend(_) => FailureKind::Backend,
        }
    }

    /// Whether the backend should be treated as not present.
    ///
    /// A run that hangs past its timeout counts as unavailable.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, HalError::BackendUnavailable(_) | HalError::Timeout(_))
    }
}

/// Result type for HAL operations.
pub type HalResult<T> = Result<T, HalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_exhausted_message() {
        let err = HalError::ResourceExhausted {
            num_qubits: 40,
            required_bytes: 1 << 44,
            limit_bytes: Some(1 << 30),
        };
        let msg = err.to_string();
        assert!(msg.contains("40-qubit"));
        assert!(msg.contains("limit"));
        assert_eq!(err.kind(), FailureKind::ResourceExhausted);
    }

    #[test]
    fn test_timeout_is_unavailable_class() {
        assert!(HalError::Timeout(Duration::from_secs(1)).is_unavailable());
        assert!(HalError::BackendUnavailable("no gpu".into()).is_unavailable());
        assert!(!HalError::Cancelled.is_unavailable());
    }

    #[test]
    fn test_failure_kind_serde() {
        let json = serde_json::to_string(&FailureKind::ResourceExhausted).unwrap();
        assert_eq!(json, "\"resource_exhausted\"");
    }
}
