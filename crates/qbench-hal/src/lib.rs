//! qbench backend abstraction
//!
//! Everything the orchestrator needs to know about a simulation backend:
//!
//! - [`BackendConfig`] and [`BackendMatrix`]: which device, acceleration
//!   mode and precision to run, validated at construction
//! - [`Backend`]: the blocking "run this canonical circuit, return the
//!   elapsed simulation time" contract
//! - [`CancelFlag`]: cooperative cancellation for timeouts and interrupts
//! - [`BackendRegistry`]: constructs a backend per configuration
//! - [`HalError`]: the per-run failure taxonomy
//!
//! # Implementing a Backend
//!
//! ```ignore
//! use qbench_compile::CanonicalCircuit;
//! use qbench_hal::{Backend, BackendAvailability, BackendConfig, Cancellation, HalResult};
//! use std::time::{Duration, Instant};
//!
//! struct MyBackend {
//!     config: BackendConfig,
//! }
//!
//! impl Backend for MyBackend {
//!     fn name(&self) -> &str { "my_backend" }
//!     fn config(&self) -> &BackendConfig { &self.config }
//!     fn availability(&self) -> BackendAvailability {
//!         BackendAvailability::always_available()
//!     }
//!     fn execute(&self, circuit: &CanonicalCircuit, cancel: &dyn Cancellation) -> HalResult<Duration> {
//!         let start = Instant::now();
//!         // apply circuit.instructions() ...
//!         Ok(start.elapsed())
//!     }
//! }
//! ```

pub mod backend;
pub mod cancel;
pub mod config;
pub mod error;
pub mod registry;

pub use backend::{Backend, BackendAvailability, BackendFactory};
pub use cancel::{CancelFlag, Cancellation, ChildCancelFlag};
pub use config::{AccelerationMode, BackendConfig, BackendMatrix, Device, ExecutionTarget, Precision};
pub use error::{FailureKind, HalError, HalResult};
pub use registry::BackendRegistry;
