//! The backend trait.

use std::time::Duration;

use qbench_compile::CanonicalCircuit;

use crate::cancel::Cancellation;
use crate::config::BackendConfig;
use crate::error::HalResult;

/// One executable configuration behind a uniform "run, return elapsed" call.
///
/// # Contract
///
/// - `config()` is fixed at construction.
/// - `availability()` is a cheap probe and never runs a circuit.
/// - `execute()` blocks until the circuit has been applied. The returned
///   duration brackets only the simulation itself: engine setup, state
///   allocation and gate lowering happen before the clock starts.
/// - `execute()` polls `cancel` where it can and returns
///   [`HalError::Cancelled`](crate::HalError::Cancelled) when raised.
/// - The circuit is borrowed read-only; backends never re-normalize it.
pub trait Backend: Send + Sync {
    /// Get the name of this backend.
    fn name(&self) -> &str;

    /// Get the configuration this backend runs.
    fn config(&self) -> &BackendConfig;

    /// Check whether the configured device and mode are present.
    fn availability(&self) -> BackendAvailability;

    /// Run the circuit to completion and return the simulation time.
    fn execute(
        &self,
        circuit: &CanonicalCircuit,
        cancel: &dyn Cancellation,
    ) -> HalResult<Duration>;
}

/// Trait for backends that can be created from configuration.
pub trait BackendFactory: Backend + Sized {
    /// Create a backend from configuration.
    fn from_config(config: BackendConfig) -> HalResult<Self>;
}

/// Availability of a backend on this machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendAvailability {
    /// Whether runs can be dispatched.
    pub is_available: bool,
    /// Devices the engine sees, if it reports them.
    pub device_count: Option<u32>,
    /// Human-readable status message.
    pub status_message: Option<String>,
}

impl BackendAvailability {
    /// Available with no further detail.
    pub fn always_available() -> Self {
        Self {
            is_available: true,
            device_count: None,
            status_message: None,
        }
    }

    /// Available with a known device count.
    pub fn with_devices(count: u32) -> Self {
        Self {
            is_available: true,
            device_count: Some(count),
            status_message: None,
        }
    }

    /// Create availability for an absent backend.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            is_available: false,
            device_count: None,
            status_message: Some(reason.into()),
        }
    }
}
