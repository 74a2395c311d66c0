//! Property tests for the normalizer.

use proptest::prelude::*;
use qbench_compile::{BasisGates, Normalizer};
use qbench_ir::{Circuit, GateId, QubitId, StandardGate};

fn arb_instruction(num_qubits: u32) -> impl Strategy<Value = (GateId, Vec<u32>, Vec<f64>)> {
    (0..GateId::ALL.len())
        .prop_map(|i| GateId::ALL[i])
        .prop_filter("fits register", move |id| id.num_qubits() <= num_qubits)
        .prop_flat_map(move |id| {
            (
                Just(id),
                Just((0..num_qubits).collect::<Vec<_>>()).prop_shuffle(),
                prop::collection::vec(0.0..std::f64::consts::TAU, id.num_params()),
            )
        })
        .prop_map(|(id, qubits, params)| {
            let operands = qubits[..id.num_qubits() as usize].to_vec();
            (id, operands, params)
        })
}

proptest! {
    #[test]
    fn normalized_circuits_only_use_basis_gates(
        ops in prop::collection::vec(arb_instruction(4), 0..30)
    ) {
        let mut circuit = Circuit::with_size("random", 4);
        for (id, qubits, params) in &ops {
            let gate = StandardGate::from_id(*id, params).unwrap();
            circuit.gate(gate, qubits.iter().copied().map(QubitId)).unwrap();
        }

        let canonical = Normalizer::new().normalize(&circuit).unwrap();
        let basis = BasisGates::canonical();
        prop_assert_eq!(canonical.num_qubits(), 4);
        for inst in canonical.instructions() {
            prop_assert!(basis.contains(inst.gate.id()));
        }
        // Identity gates vanish, every other gate expands to at least one.
        let non_identity = ops.iter().filter(|(id, _, _)| *id != GateId::I).count();
        prop_assert!(canonical.len() >= non_identity);
    }

    #[test]
    fn normalization_is_deterministic(
        ops in prop::collection::vec(arb_instruction(3), 0..20)
    ) {
        let mut circuit = Circuit::with_size("random", 3);
        for (id, qubits, params) in &ops {
            let gate = StandardGate::from_id(*id, params).unwrap();
            circuit.gate(gate, qubits.iter().copied().map(QubitId)).unwrap();
        }
        let normalizer = Normalizer::new();
        prop_assert_eq!(
            normalizer.normalize(&circuit).unwrap(),
            normalizer.normalize(&circuit).unwrap()
        );
    }
}
