//! qbench circuit normalization
//!
//! Rewrites generated circuits into the fixed basis
//! `{x, y, z, h, s, t, cx, rx, ry, rz}` so every backend executes the same
//! operations. Normalization is a small pass pipeline:
//!
//! ```text
//! Circuit ──► BasisTranslation ──► (custom passes) ──► BasisVerification ──► CanonicalCircuit
//! ```
//!
//! # Example
//!
//! ```rust
//! use qbench_compile::Normalizer;
//! use qbench_ir::{Circuit, QubitId};
//!
//! let mut circuit = Circuit::with_size("swap", 2);
//! circuit.swap(QubitId(0), QubitId(1)).unwrap();
//!
//! let canonical = Normalizer::new().normalize(&circuit).unwrap();
//! assert_eq!(canonical.len(), 3); // three CNOTs
//! ```
//!
//! # Custom Passes
//!
//! Implement [`Pass`] and add it with [`Normalizer::with_pass`]. Its output
//! is still verified against the basis.

pub mod error;
pub mod manager;
pub mod normalizer;
pub mod pass;
pub mod passes;
pub mod property;

pub use error::{CompileError, CompileResult};
pub use manager::PassManager;
pub use normalizer::{CanonicalCircuit, Normalizer};
pub use pass::{Pass, PassKind};
pub use property::{BasisGates, PropertySet};
