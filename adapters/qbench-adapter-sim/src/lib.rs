//! qbench CPU statevector backend
//!
//! Reference CPU backend for the benchmark sweep. It applies a canonical
//! circuit to a dense state vector held in host memory, in single (`f32`)
//! or double (`f64`) precision.
//!
//! # Memory
//!
//! | Qubits | Single | Double |
//! |--------|--------|--------|
//! | 20 | 8 MiB | 16 MiB |
//! | 25 | 256 MiB | 512 MiB |
//! | 30 | 8 GiB | 16 GiB |
//!
//! Runs that would exceed the configured limit (by default the host's
//! `MemAvailable`) fail with `HalError::ResourceExhausted` instead of
//! aborting the process.
//!
//! # Example
//!
//! ```ignore
//! use qbench_adapter_sim::SimulatorBackend;
//! use qbench_compile::Normalizer;
//! use qbench_hal::{Backend, CancelFlag, Precision};
//! use qbench_ir::{Circuit, QubitId};
//!
//! let mut circuit = Circuit::with_size("bell", 2);
//! circuit.h(QubitId(0))?.cx(QubitId(0), QubitId(1))?;
//! let canonical = Normalizer::new().normalize(&circuit)?;
//!
//! let backend = SimulatorBackend::new(Precision::Double);
//! let elapsed = backend.execute(&canonical, &CancelFlag::new())?;
//! println!("simulated in {elapsed:?}");
//! ```

mod simulator;
mod statevector;

pub use simulator::SimulatorBackend;
pub use statevector::{Op, SimFloat, Statevector};
