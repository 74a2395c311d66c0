//! Properties shared between passes.

use serde::{Deserialize, Serialize};
use std::fmt;

use qbench_ir::GateId;

/// Basis gates a normalized circuit may contain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasisGates {
    /// Gate kinds in the basis.
    gates: Vec<GateId>,
}

impl BasisGates {
    /// Create a basis from gate kinds. Duplicates are dropped.
    pub fn new(gates: impl IntoIterator<Item = GateId>) -> Self {
        let mut unique: Vec<GateId> = Vec::new();
        for gate in gates {
            if !unique.contains(&gate) {
                unique.push(gate);
            }
        }
        Self { gates: unique }
    }

    /// The basis every qbench backend accepts.
    pub fn canonical() -> Self {
        Self::new([
            GateId::X,
            GateId::Y,
            GateId::Z,
            GateId::H,
            GateId::S,
            GateId::T,
            GateId::CX,
            GateId::Rx,
            GateId::Ry,
            GateId::Rz,
        ])
    }

    /// Check if a gate kind is in the basis.
    pub fn contains(&self, gate: GateId) -> bool {
        self.gates.contains(&gate)
    }

    /// Get the basis gates.
    pub fn gates(&self) -> &[GateId] {
        &self.gates
    }

    /// Whether the basis is empty.
    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }
}

impl Default for BasisGates {
    fn default() -> Self {
        Self::canonical()
    }
}

impl fmt::Display for BasisGates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.gates.iter().map(|g| g.name()).collect();
        f.write_str(&names.join(", "))
    }
}

/// State threaded through a pass pipeline.
#[derive(Debug, Clone, Default)]
pub struct PropertySet {
    /// Target basis.
    pub basis_gates: BasisGates,
    /// Gates rewritten by translation passes.
    pub gates_rewritten: usize,
}

impl PropertySet {
    /// Create a property set targeting the given basis.
    pub fn new(basis_gates: BasisGates) -> Self {
        Self {
            basis_gates,
            gates_rewritten: 0,
        }
    }
}
