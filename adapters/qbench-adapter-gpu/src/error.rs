//! Error types for GPU engine interaction.

use std::os::raw::c_int;

use qbench_hal::HalError;

use crate::ffi;

/// Errors arising from the GPU engine.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum GpuError {
    #[error("failed to load GPU engine at '{path}': {cause}")]
    LoadFailed { path: String, cause: String },

    #[error("symbol '{symbol}' not found in GPU engine: {cause}")]
    SymbolNotFound { symbol: String, cause: String },

    #[error("no GPU device visible to the engine")]
    NoDevice,

    #[error("GPU engine does not support {0}")]
    Unsupported(String),

    #[error("GPU out of memory for a {num_qubits}-qubit state ({required_bytes} bytes)")]
    OutOfMemory { num_qubits: u32, required_bytes: u128 },

    #[error("invalid argument passed to GPU engine")]
    InvalidArgument,

    #[error("gate '{0}' has no GPU opcode")]
    UnencodableGate(String),

    #[error("GPU engine failed with status {0}")]
    Engine(i32),

    #[error("run cancelled between GPU calls")]
    Cancelled,
}

impl GpuError {
    /// Convert a non-zero engine status into a typed error.
    ///
    /// `num_qubits` and `required_bytes` describe the state the failing call
    /// worked on and only feed the out-of-memory variant.
    pub fn from_status(code: c_int, num_qubits: u32, required_bytes: u128) -> Self {
        match code {
            ffi::STATUS_INVALID_ARGUMENT => GpuError::InvalidArgument,
            ffi::STATUS_OUT_OF_MEMORY => GpuError::OutOfMemory {
                num_qubits,
                required_bytes,
            },
            ffi::STATUS_NO_DEVICE => GpuError::NoDevice,
            ffi::STATUS_UNSUPPORTED => GpuError::Unsupported("the requested configuration".into()),
            other => GpuError::Engine(other),
        }
    }
}

impl From<GpuError> for HalError {
    fn from(err: GpuError) -> Self {
        match err {
            GpuError::LoadFailed { .. }
            | GpuError::SymbolNotFound { .. }
            | GpuError::NoDevice
            | GpuError::Unsupported(_) => HalError::BackendUnavailable(err.to_string()),
            GpuError::OutOfMemory {
                num_qubits,
                required_bytes,
            } => HalError::ResourceExhausted {
                num_qubits,
                required_bytes,
                limit_bytes: None,
            },
            GpuError::UnencodableGate(_) => HalError::InvalidCircuit(err.to_string()),
            GpuError::Cancelled => HalError::Cancelled,
            GpuError::InvalidArgument | GpuError::Engine(_) => HalError::Backend(err.to_string()),
        }
    }
}

pub type GpuResult<T> = std::result::Result<T, GpuError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            GpuError::from_status(ffi::STATUS_NO_DEVICE, 4, 64),
            GpuError::NoDevice
        ));
        assert!(matches!(
            GpuError::from_status(77, 4, 64),
            GpuError::Engine(77)
        ));
    }

    #[test]
    fn test_out_of_memory_becomes_resource_exhausted() {
        let err: HalError = GpuError::from_status(ffi::STATUS_OUT_OF_MEMORY, 30, 1 << 34).into();
        assert!(matches!(
            err,
            HalError::ResourceExhausted {
                num_qubits: 30,
                required_bytes: 17_179_869_184,
                limit_bytes: None,
            }
        ));
    }

    #[test]
    fn test_missing_engine_is_unavailable() {
        let err: HalError = GpuError::LoadFailed {
            path: "libqbench_gpu.so".into(),
            cause: "not found".into(),
        }
        .into();
        assert!(err.is_unavailable());

        let err: HalError = GpuError::from_status(ffi::STATUS_UNSUPPORTED, 1, 16).into();
        assert!(err.is_unavailable());
    }
}
