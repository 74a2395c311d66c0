//! Basis translation pass.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

use qbench_ir::{Circuit, Instruction, QubitId, StandardGate};

use crate::error::{CompileError, CompileResult};
use crate::pass::{Pass, PassKind};
use crate::property::{BasisGates, PropertySet};

/// Rewrites exceeding this nesting are treated as cycles.
const MAX_REWRITE_DEPTH: usize = 8;

/// Basis translation pass.
///
/// Every gate outside the target basis is replaced by its decomposition,
/// recursively, until only basis gates remain. Each rule is exact up to a
/// global phase, so the rewritten circuit has the same action on the state.
pub struct BasisTranslation;

impl Pass for BasisTranslation {
    fn name(&self) -> &'static str {
        "basis_translation"
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    fn run(&self, circuit: &mut Circuit, properties: &mut PropertySet) -> CompileResult<()> {
        let basis = &properties.basis_gates;
        let mut rebuilt = Circuit::with_size(circuit.name(), circuit.num_qubits());
        let mut rewritten = 0;

        for inst in circuit.instructions() {
            if basis.contains(inst.gate.id()) {
                rebuilt.apply(inst.clone())?;
                continue;
            }
            rewritten += 1;
            for replacement in translate(inst, basis, 0)? {
                rebuilt.apply(replacement)?;
            }
        }

        properties.gates_rewritten += rewritten;
        *circuit = rebuilt;
        Ok(())
    }

    fn should_run(&self, circuit: &Circuit, properties: &PropertySet) -> bool {
        circuit
            .instructions()
            .iter()
            .any(|inst| !properties.basis_gates.contains(inst.gate.id()))
    }
}

/// Translate one instruction into basis gates.
fn translate(
    instruction: &Instruction,
    basis: &BasisGates,
    depth: usize,
) -> CompileResult<Vec<Instruction>> {
    if basis.contains(instruction.gate.id()) {
        return Ok(vec![instruction.clone()]);
    }
    let unsupported = || CompileError::UnsupportedGate {
        gate: instruction.name().to_string(),
        basis: basis.to_string(),
    };
    if depth >= MAX_REWRITE_DEPTH {
        return Err(unsupported());
    }

    let Some(rule) = decompose(&instruction.gate, &instruction.qubits) else {
        return Err(unsupported());
    };

    let mut out = Vec::with_capacity(rule.len());
    for step in &rule {
        match translate(step, basis, depth + 1) {
            Ok(gates) => out.extend(gates),
            // Report the gate the caller asked for, not an intermediate.
            Err(CompileError::UnsupportedGate { .. }) => return Err(unsupported()),
            Err(e) => return Err(e),
        }
    }
    Ok(out)
}

fn one(gate: StandardGate, q: QubitId) -> Instruction {
    Instruction::single_qubit_gate(gate, q)
}

fn two(gate: StandardGate, a: QubitId, b: QubitId) -> Instruction {
    Instruction::two_qubit_gate(gate, a, b)
}

/// One rewrite step for a gate, in circuit order.
///
/// Steps may themselves lie outside the basis; [`translate`] keeps
/// rewriting them. Returns `None` for gates without a rule.
#[allow(clippy::too_many_lines)]
pub fn decompose(gate: &StandardGate, qubits: &[QubitId]) -> Option<Vec<Instruction>> {
    use StandardGate as G;

    let q0 = *qubits.first()?;
    let q1 = qubits.get(1).copied();
    let q2 = qubits.get(2).copied();

    let rule = match *gate {
        G::I => vec![],

        // Paulis are π rotations up to phase
        G::X => vec![one(G::Rx(PI), q0)],
        G::Y => vec![one(G::Ry(PI), q0)],
        G::Z => vec![one(G::Rz(PI), q0)],

        // H = Rz(π/2)·Rx(π/2)·Rz(π/2) up to phase
        G::H => vec![
            one(G::Rz(FRAC_PI_2), q0),
            one(G::Rx(FRAC_PI_2), q0),
            one(G::Rz(FRAC_PI_2), q0),
        ],

        G::S => vec![one(G::Rz(FRAC_PI_2), q0)],
        G::Sdg => vec![one(G::Rz(-FRAC_PI_2), q0)],
        G::T => vec![one(G::Rz(FRAC_PI_4), q0)],
        G::Tdg => vec![one(G::Rz(-FRAC_PI_4), q0)],
        G::SX => vec![one(G::Rx(FRAC_PI_2), q0)],
        G::SXdg => vec![one(G::Rx(-FRAC_PI_2), q0)],
        G::P(lambda) => vec![one(G::Rz(lambda), q0)],

        // Rotations through a change of axis
        G::Rx(theta) => vec![one(G::H, q0), one(G::Rz(theta), q0), one(G::H, q0)],
        G::Ry(theta) => vec![one(G::Sdg, q0), one(G::Rx(theta), q0), one(G::S, q0)],
        G::Rz(theta) => vec![one(G::H, q0), one(G::Rx(theta), q0), one(G::H, q0)],

        // U(θ, φ, λ) = Rz(φ)·Ry(θ)·Rz(λ) up to phase
        G::U(theta, phi, lambda) => vec![
            one(G::Rz(lambda), q0),
            one(G::Ry(theta), q0),
            one(G::Rz(phi), q0),
        ],

        G::CX => {
            let t = q1?;
            vec![one(G::H, t), two(G::CZ, q0, t), one(G::H, t)]
        }
        G::CZ => {
            let t = q1?;
            vec![one(G::H, t), two(G::CX, q0, t), one(G::H, t)]
        }
        // S·X·S† = Y
        G::CY => {
            let t = q1?;
            vec![one(G::Sdg, t), two(G::CX, q0, t), one(G::S, t)]
        }
        // Ry(-π/4)·X·Ry(π/4) = H
        G::CH => {
            let t = q1?;
            vec![
                one(G::Ry(FRAC_PI_4), t),
                two(G::CX, q0, t),
                one(G::Ry(-FRAC_PI_4), t),
            ]
        }
        G::Swap => {
            let b = q1?;
            vec![two(G::CX, q0, b), two(G::CX, b, q0), two(G::CX, q0, b)]
        }

        // X·R(φ)·X = R(-φ) for R in {Ry, Rz}
        G::CRy(theta) => {
            let t = q1?;
            vec![
                one(G::Ry(theta / 2.0), t),
                two(G::CX, q0, t),
                one(G::Ry(-theta / 2.0), t),
                two(G::CX, q0, t),
            ]
        }
        G::CRz(theta) => {
            let t = q1?;
            vec![
                one(G::Rz(theta / 2.0), t),
                two(G::CX, q0, t),
                one(G::Rz(-theta / 2.0), t),
                two(G::CX, q0, t),
            ]
        }
        G::CRx(theta) => {
            let t = q1?;
            vec![one(G::H, t), two(G::CRz(theta), q0, t), one(G::H, t)]
        }
        // CP(λ) = P(λ/2) on the control times CRz(λ)
        G::CP(lambda) => {
            let t = q1?;
            vec![one(G::Rz(lambda / 2.0), q0), two(G::CRz(lambda), q0, t)]
        }

        G::RZZ(theta) => {
            let b = q1?;
            vec![two(G::CX, q0, b), one(G::Rz(theta), b), two(G::CX, q0, b)]
        }
        G::RXX(theta) => {
            let b = q1?;
            vec![
                one(G::H, q0),
                one(G::H, b),
                two(G::RZZ(theta), q0, b),
                one(G::H, q0),
                one(G::H, b),
            ]
        }
        // Rx(-π/2)·Z·Rx(π/2) = Y
        G::RYY(theta) => {
            let b = q1?;
            vec![
                one(G::Rx(FRAC_PI_2), q0),
                one(G::Rx(FRAC_PI_2), b),
                two(G::RZZ(theta), q0, b),
                one(G::Rx(-FRAC_PI_2), q0),
                one(G::Rx(-FRAC_PI_2), b),
            ]
        }

        G::CCX => {
            let (b, c) = (q1?, q2?);
            let a = q0;
            vec![
                one(G::H, c),
                two(G::CX, b, c),
                one(G::Tdg, c),
                two(G::CX, a, c),
                one(G::T, c),
                two(G::CX, b, c),
                one(G::Tdg, c),
                two(G::CX, a, c),
                one(G::T, b),
                one(G::T, c),
                one(G::H, c),
                two(G::CX, a, b),
                one(G::T, a),
                one(G::Tdg, b),
                two(G::CX, a, b),
            ]
        }
        G::CSwap => {
            let (b, c) = (q1?, q2?);
            vec![
                two(G::CX, c, b),
                Instruction::gate(G::CCX, [q0, b, c]),
                two(G::CX, c, b),
            ]
        }
    };
    Some(rule)
}
