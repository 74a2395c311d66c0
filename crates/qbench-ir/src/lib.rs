//! qbench circuit representation
//!
//! Value types shared by every qbench crate: qubit identifiers, gate kinds,
//! concrete gates, instructions and circuits.
//!
//! # Example: Building a Bell State
//!
//! ```rust
//! use qbench_ir::{Circuit, QubitId};
//!
//! let mut circuit = Circuit::with_size("bell_state", 2);
//! circuit.h(QubitId(0)).unwrap();
//! circuit.cx(QubitId(0), QubitId(1)).unwrap();
//!
//! assert_eq!(circuit.num_qubits(), 2);
//! assert_eq!(circuit.depth(), 2);
//! ```
//!
//! # Gate kinds
//!
//! | Gate | Qubits | Angles |
//! |------|--------|--------|
//! | `id`, `x`, `y`, `z`, `h`, `s`, `sdg`, `t`, `tdg`, `sx`, `sxdg` | 1 | 0 |
//! | `rx`, `ry`, `rz`, `p` | 1 | 1 |
//! | `u` | 1 | 3 |
//! | `cx`, `cy`, `cz`, `ch`, `swap` | 2 | 0 |
//! | `crx`, `cry`, `crz`, `cp`, `rxx`, `ryy`, `rzz` | 2 | 1 |
//! | `ccx`, `cswap` | 3 | 0 |

pub mod circuit;
pub mod error;
pub mod gate;
pub mod instruction;
pub mod qubit;

pub use circuit::Circuit;
pub use error::{IrError, IrResult};
pub use gate::{GateId, StandardGate};
pub use instruction::Instruction;
pub use qubit::QubitId;
