//! qbench GPU backend
//!
//! Runs canonical circuits on a GPU through an engine shared library loaded
//! at run time, so the benchmark itself never links against a GPU toolkit.
//!
//! The engine is looked up at `$QBENCH_GPU_ENGINE`, falling back to the
//! platform name of `qbench_gpu` (`libqbench_gpu.so` on Linux) on the
//! loader's search path. See [`ffi`] for the exported C ABI.
//!
//! Both acceleration modes go through the same engine:
//!
//! - `default`: the engine's general-purpose kernels
//! - `accelerated-statevector`: the engine's vendor state-vector library
//!   path (cuStateVec on NVIDIA hardware)
//!
//! A missing engine, zero visible devices or an unsupported mode are
//! reported as `HalError::BackendUnavailable` for every run. Nothing falls
//! back to the CPU.

mod backend;
pub mod engine;
pub mod error;
pub mod ffi;

pub use backend::GpuBackend;
pub use engine::{ENGINE_ENV, GpuEngine, default_engine_path};
pub use error::{GpuError, GpuResult};
