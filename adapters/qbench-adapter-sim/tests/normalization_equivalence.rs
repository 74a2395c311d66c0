//! The normalizer must not change what a circuit computes.
//!
//! Every comparison is up to global phase: the fidelity between the state
//! reached by the original circuit and by its canonical form must be 1.

use proptest::prelude::*;

use qbench_adapter_sim::Statevector;
use qbench_bench::{CircuitSpec, GateVocabulary, generate};
use qbench_compile::Normalizer;
use qbench_ir::{Circuit, GateId, QubitId, StandardGate};

const TOLERANCE: f64 = 1e-9;

fn simulate(circuit: &Circuit) -> Statevector<f64> {
    let mut sv = Statevector::try_new(circuit.num_qubits() as usize).unwrap();
    for inst in circuit.instructions() {
        sv.apply(inst);
    }
    sv
}

/// Put every qubit in a different non-trivial state so that phase errors
/// in a decomposition become observable.
fn prepared(num_qubits: u32) -> Circuit {
    let mut circuit = Circuit::with_size("prepared", num_qubits);
    for q in 0..num_qubits {
        let k = f64::from(q + 1);
        circuit
            .gate(StandardGate::U(0.4 * k, 0.9 - 0.3 * k, 0.2 * k), [QubitId(q)])
            .unwrap();
    }
    circuit.cx(QubitId(0), QubitId(num_qubits - 1)).unwrap();
    circuit
}

#[test]
fn test_every_gate_decomposition_matches_up_to_global_phase() {
    let normalizer = Normalizer::new();
    let angles = [0.37, 1.21, -0.83];

    for id in GateId::ALL {
        let gate = StandardGate::from_id(id, &angles[..id.num_params()]).unwrap();
        // Operands in descending order to catch control/target mix-ups.
        let operands = (0..id.num_qubits()).rev().map(QubitId);

        let mut circuit = prepared(3);
        circuit.gate(gate, operands).unwrap();

        let canonical = normalizer.normalize(&circuit).unwrap();
        let expected = simulate(&circuit);
        let actual = simulate(canonical.circuit());

        let fidelity = expected.fidelity(&actual);
        assert!(
            (fidelity - 1.0).abs() < TOLERANCE,
            "{id}: fidelity {fidelity}"
        );
    }
}

#[test]
fn test_canonical_form_of_bell_pair_keeps_probabilities() {
    let mut circuit = Circuit::with_size("bell", 2);
    circuit.h(QubitId(0)).unwrap().cx(QubitId(0), QubitId(1)).unwrap();

    let canonical = Normalizer::new().normalize(&circuit).unwrap();
    let probs = simulate(canonical.circuit()).probabilities();

    assert!((probs[0b00] - 0.5).abs() < TOLERANCE);
    assert!((probs[0b11] - 0.5).abs() < TOLERANCE);
    assert!(probs[0b01].abs() < TOLERANCE);
    assert!(probs[0b10].abs() < TOLERANCE);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn generated_circuits_survive_normalization(
        seed in any::<i64>(),
        qubits in 1u32..=5,
        depth in 1u32..=6,
    ) {
        let spec = CircuitSpec::new(qubits, depth, seed, GateVocabulary::full()).unwrap();
        let circuit = generate(&spec).unwrap();
        let canonical = Normalizer::new().normalize(&circuit).unwrap();

        let expected = simulate(&circuit);
        let actual = simulate(canonical.circuit());

        prop_assert!((expected.fidelity(&actual) - 1.0).abs() < TOLERANCE);
        for (p, q) in expected.probabilities().iter().zip(actual.probabilities()) {
            prop_assert!((p - q).abs() < TOLERANCE);
        }
    }
}
