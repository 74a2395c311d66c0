//! The normalizer: one pipeline from a generated circuit to a canonical one.

use serde::Serialize;
use tracing::debug;

use qbench_ir::{Circuit, Instruction};

use crate::error::CompileResult;
use crate::manager::PassManager;
use crate::pass::Pass;
use crate::passes::{BasisTranslation, BasisVerification};
use crate::property::{BasisGates, PropertySet};

/// A circuit expressed only in the canonical basis.
///
/// Only [`Normalizer::normalize`] constructs one and there is no mutable
/// access, so a backend receiving a `&CanonicalCircuit` may rely on every
/// gate being a basis gate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanonicalCircuit {
    circuit: Circuit,
    basis: BasisGates,
}

impl CanonicalCircuit {
    /// The underlying circuit.
    pub fn circuit(&self) -> &Circuit {
        &self.circuit
    }

    /// The basis the circuit was normalized into.
    pub fn basis(&self) -> &BasisGates {
        &self.basis
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> u32 {
        self.circuit.num_qubits()
    }

    /// Get the instructions in application order.
    pub fn instructions(&self) -> &[Instruction] {
        self.circuit.instructions()
    }

    /// Number of instructions.
    pub fn len(&self) -> usize {
        self.circuit.len()
    }

    /// Whether the circuit has no instructions.
    pub fn is_empty(&self) -> bool {
        self.circuit.is_empty()
    }

    /// Circuit depth.
    pub fn depth(&self) -> usize {
        self.circuit.depth()
    }
}

/// Rewrites circuits into a fixed basis.
///
/// The pipeline is basis translation, then any passes added with
/// [`Normalizer::with_pass`], then basis verification.
pub struct Normalizer {
    basis: BasisGates,
    pipeline: PassManager,
}

impl Normalizer {
    /// Normalizer targeting [`BasisGates::canonical`].
    pub fn new() -> Self {
        Self::with_basis(BasisGates::canonical())
    }

    /// Normalizer targeting a custom basis.
    pub fn with_basis(basis: BasisGates) -> Self {
        let mut pipeline = PassManager::new();
        pipeline.add_pass(BasisTranslation);
        Self { basis, pipeline }
    }

    /// Add a pass that runs after translation and before verification.
    #[must_use]
    pub fn with_pass(mut self, pass: impl Pass + 'static) -> Self {
        self.pipeline.add_pass(pass);
        self
    }

    /// The target basis.
    pub fn basis(&self) -> &BasisGates {
        &self.basis
    }

    /// Names of the pipeline passes, verification included.
    pub fn pass_names(&self) -> Vec<&str> {
        let mut names = self.pipeline.pass_names();
        names.push(BasisVerification.name());
        names
    }

    /// Rewrite `circuit` into the target basis.
    ///
    /// The input is left untouched; the result is equivalent to it up to a
    /// global phase.
    pub fn normalize(&self, circuit: &Circuit) -> CompileResult<CanonicalCircuit> {
        let mut working = circuit.clone();
        let mut properties = PropertySet::new(self.basis.clone());

        self.pipeline.run(&mut working, &mut properties)?;
        BasisVerification.run(&mut working, &mut properties)?;

        debug!(
            "Normalized '{}': {} -> {} ops ({} rewritten)",
            circuit.name(),
            circuit.len(),
            working.len(),
            properties.gates_rewritten
        );

        Ok(CanonicalCircuit {
            circuit: working,
            basis: self.basis.clone(),
        })
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CompileError;
    use crate::pass::PassKind;
    use qbench_ir::{GateId, QubitId, StandardGate};

    #[test]
    fn test_normalize_leaves_input_untouched() {
        let mut circuit = Circuit::with_size("input", 3);
        circuit.ccx(QubitId(0), QubitId(1), QubitId(2)).unwrap();
        let before = circuit.clone();

        let canonical = Normalizer::new().normalize(&circuit).unwrap();
        assert_eq!(circuit, before);
        assert_eq!(canonical.num_qubits(), 3);
        assert_eq!(canonical.len(), 15);
        assert_eq!(canonical.basis(), &BasisGates::canonical());
    }

    #[test]
    fn test_unsupported_gate_propagates() {
        let normalizer = Normalizer::with_basis(BasisGates::new([GateId::H, GateId::Rz]));
        let mut circuit = Circuit::with_size("entangling", 2);
        circuit.gate(StandardGate::CP(0.2), [QubitId(0), QubitId(1)]).unwrap();

        let err = normalizer.normalize(&circuit).unwrap_err();
        assert!(err.is_unsupported_gate());
        assert!(matches!(err, CompileError::UnsupportedGate { ref gate, .. } if gate == "cp"));
    }

    struct Smuggle;

    impl Pass for Smuggle {
        fn name(&self) -> &'static str {
            "smuggle"
        }

        fn kind(&self) -> PassKind {
            PassKind::Transformation
        }

        fn run(&self, circuit: &mut Circuit, _properties: &mut PropertySet) -> CompileResult<()> {
            circuit.cz(QubitId(0), QubitId(1))?;
            Ok(())
        }
    }

    #[test]
    fn test_custom_pass_output_is_verified() {
        let normalizer = Normalizer::new().with_pass(Smuggle);
        assert_eq!(
            normalizer.pass_names(),
            vec!["basis_translation", "smuggle", "basis_verification"]
        );

        let circuit = Circuit::with_size("two", 2);
        let err = normalizer.normalize(&circuit).unwrap_err();
        assert!(matches!(err, CompileError::NotCanonical { ref gate, .. } if gate == "cz"));
    }
}
