//! Verification pass for normalized circuits.

use tracing::debug;

use qbench_ir::Circuit;

use crate::error::{CompileError, CompileResult};
use crate::pass::{Pass, PassKind};
use crate::property::PropertySet;

/// Analysis pass confirming every gate is in the target basis.
///
/// Runs last so a custom transformation pass cannot smuggle a non-basis
/// gate into a circuit handed to the backends.
pub struct BasisVerification;

impl Pass for BasisVerification {
    fn name(&self) -> &'static str {
        "basis_verification"
    }

    fn kind(&self) -> PassKind {
        PassKind::Analysis
    }

    fn run(&self, circuit: &mut Circuit, properties: &mut PropertySet) -> CompileResult<()> {
        let basis = &properties.basis_gates;
        if let Some((position, inst)) = circuit
            .instructions()
            .iter()
            .enumerate()
            .find(|(_, inst)| !basis.contains(inst.gate.id()))
        {
            return Err(CompileError::NotCanonical {
                gate: inst.name().to_string(),
                position,
                basis: basis.to_string(),
            });
        }
        debug!("Verified {} ops against basis", circuit.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::BasisGates;
    use qbench_ir::QubitId;

    #[test]
    fn test_accepts_basis_circuit() {
        let mut circuit = Circuit::with_size("ok", 2);
        circuit.h(QubitId(0)).unwrap();
        circuit.cx(QubitId(0), QubitId(1)).unwrap();
        let mut props = PropertySet::new(BasisGates::canonical());
        assert!(BasisVerification.run(&mut circuit, &mut props).is_ok());
    }

    #[test]
    fn test_reports_first_offender() {
        let mut circuit = Circuit::with_size("bad", 2);
        circuit.h(QubitId(0)).unwrap();
        circuit.cz(QubitId(0), QubitId(1)).unwrap();
        let mut props = PropertySet::new(BasisGates::canonical());

        let err = BasisVerification.run(&mut circuit, &mut props).unwrap_err();
        assert!(err.is_unsupported_gate());
        assert!(matches!(err, CompileError::NotCanonical { position: 1, .. }));
    }
}
