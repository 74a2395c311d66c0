//! Quantum gate types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{IrError, IrResult};

/// Identifier of a gate kind, independent of its angles.
///
/// The declaration order defines the iteration order of gate vocabularies,
/// so reordering variants changes which circuits a seed produces.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum GateId {
    /// Identity.
    #[serde(rename = "id")]
    I,
    /// Pauli-X.
    X,
    /// Pauli-Y.
    Y,
    /// Pauli-Z.
    Z,
    /// Hadamard.
    H,
    /// S gate.
    S,
    /// S-dagger.
    Sdg,
    /// T gate.
    T,
    /// T-dagger.
    Tdg,
    /// sqrt(X).
    SX,
    /// sqrt(X)-dagger.
    SXdg,
    /// X rotation.
    Rx,
    /// Y rotation.
    Ry,
    /// Z rotation.
    Rz,
    /// Phase.
    P,
    /// Universal single-qubit gate.
    U,
    /// CNOT.
    CX,
    /// Controlled-Y.
    CY,
    /// Controlled-Z.
    CZ,
    /// Controlled-Hadamard.
    CH,
    /// SWAP.
    Swap,
    /// Controlled X rotation.
    CRx,
    /// Controlled Y rotation.
    CRy,
    /// Controlled Z rotation.
    CRz,
    /// Controlled phase.
    CP,
    /// XX rotation.
    RXX,
    /// YY rotation.
    RYY,
    /// ZZ rotation.
    RZZ,
    /// Toffoli.
    CCX,
    /// Fredkin.
    CSwap,
}

impl GateId {
    /// Every gate kind, in vocabulary order.
    pub const ALL: [GateId; 30] = [
        GateId::I,
        GateId::X,
        GateId::Y,
        GateId::Z,
        GateId::H,
        GateId::S,
        GateId::Sdg,
        GateId::T,
        GateId::Tdg,
        GateId::SX,
        GateId::SXdg,
        GateId::Rx,
        GateId::Ry,
        GateId::Rz,
        GateId::P,
        GateId::U,
        GateId::CX,
        GateId::CY,
        GateId::CZ,
        GateId::CH,
        GateId::Swap,
        GateId::CRx,
        GateId::CRy,
        GateId::CRz,
        GateId::CP,
        GateId::RXX,
        GateId::RYY,
        GateId::RZZ,
        GateId::CCX,
        GateId::CSwap,
    ];

    /// Get the name of this gate kind.
    #[inline]
    pub fn name(self) -> &'static str {
        match self {
            GateId::I => "id",
            GateId::X => "x",
            GateId::Y => "y",
            GateId::Z => "z",
            GateId::H => "h",
            GateId::S => "s",
            GateId::Sdg => "sdg",
            GateId::T => "t",
            GateId::Tdg => "tdg",
            GateId::SX => "sx",
            GateId::SXdg => "sxdg",
            GateId::Rx => "rx",
            GateId::Ry => "ry",
            GateId::Rz => "rz",
            GateId::P => "p",
            GateId::U => "u",
            GateId::CX => "cx",
            GateId::CY => "cy",
            GateId::CZ => "cz",
            GateId::CH => "ch",
            GateId::Swap => "swap",
            GateId::CRx => "crx",
            GateId::CRy => "cry",
            GateId::CRz => "crz",
            GateId::CP => "cp",
            GateId::RXX => "rxx",
            GateId::RYY => "ryy",
            GateId::RZZ => "rzz",
            GateId::CCX => "ccx",
            GateId::CSwap => "cswap",
        }
    }

    /// Get the number of qubits this gate kind operates on.
    #[inline]
    pub fn num_qubits(self) -> u32 {
        match self {
            GateId::I
            | GateId::X
            | GateId::Y
            | GateId::Z
            | GateId::H
            | GateId::S
            | GateId::Sdg
            | GateId::T
            | GateId::Tdg
            | GateId::SX
            | GateId::SXdg
            | GateId::Rx
            | GateId::Ry
            | GateId::Rz
            | GateId::P
            | GateId::U => 1,

            GateId::CX
            | GateId::CY
            | GateId::CZ
            | GateId::CH
            | GateId::Swap
            | GateId::CRx
            | GateId::CRy
            | GateId::CRz
            | GateId::CP
            | GateId::RXX
            | GateId::RYY
            | GateId::RZZ => 2,

            GateId::CCX | GateId::CSwap => 3,
        }
    }

    /// Get the number of angle parameters this gate kind takes.
    #[inline]
    pub fn num_params(self) -> usize {
        match self {
            GateId::Rx
            | GateId::Ry
            | GateId::Rz
            | GateId::P
            | GateId::CRx
            | GateId::CRy
            | GateId::CRz
            | GateId::CP
            | GateId::RXX
            | GateId::RYY
            | GateId::RZZ => 1,
            GateId::U => 3,
            _ => 0,
        }
    }
}

impl fmt::Display for GateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for GateId {
    type Err = IrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        GateId::ALL
            .iter()
            .copied()
            .find(|id| id.name() == lower)
            .ok_or_else(|| IrError::UnknownGate(s.to_string()))
    }
}

/// Standard gates with concrete angles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StandardGate {
    // Single-qubit Pauli gates
    /// Identity gate.
    I,
    /// Pauli-X gate.
    X,
    /// Pauli-Y gate.
    Y,
    /// Pauli-Z gate.
    Z,

    // Single-qubit Clifford gates
    /// Hadamard gate.
    H,
    /// S gate (sqrt(Z)).
    S,
    /// S-dagger gate.
    Sdg,
    /// T gate (fourth root of Z).
    T,
    /// T-dagger gate.
    Tdg,
    /// sqrt(X) gate.
    SX,
    /// sqrt(X)-dagger gate.
    SXdg,

    // Single-qubit rotation gates
    /// Rotation around X axis.
    Rx(f64),
    /// Rotation around Y axis.
    Ry(f64),
    /// Rotation around Z axis.
    Rz(f64),
    /// Phase gate.
    P(f64),
    /// Universal single-qubit gate U(θ, φ, λ).
    U(f64, f64, f64),

    // Two-qubit gates
    /// Controlled-X (CNOT) gate.
    CX,
    /// Controlled-Y gate.
    CY,
    /// Controlled-Z gate.
    CZ,
    /// Controlled-Hadamard gate.
    CH,
    /// SWAP gate.
    Swap,
    /// Controlled rotation around X.
    CRx(f64),
    /// Controlled rotation around Y.
    CRy(f64),
    /// Controlled rotation around Z.
    CRz(f64),
    /// Controlled phase gate.
    CP(f64),
    /// XX rotation gate.
    RXX(f64),
    /// YY rotation gate.
    RYY(f64),
    /// ZZ rotation gate.
    RZZ(f64),

    // Three-qubit gates
    /// Toffoli gate (CCX).
    CCX,
    /// Fredkin gate (CSWAP).
    CSwap,
}

impl StandardGate {
    /// Build a gate of the given kind from its angles.
    pub fn from_id(id: GateId, params: &[f64]) -> IrResult<Self> {
        if params.len() != id.num_params() {
            return Err(IrError::ParameterCountMismatch {
                gate_name: id.name().to_string(),
                expected: id.num_params(),
                got: params.len(),
            });
        }
        let p = |i: usize| params[i];
        Ok(match id {
            GateId::I => StandardGate::I,
            GateId::X => StandardGate::X,
            GateId::Y => StandardGate::Y,
            GateId::Z => StandardGate::Z,
            GateId::H => StandardGate::H,
            GateId::S => StandardGate::S,
            GateId::Sdg => StandardGate::Sdg,
            GateId::T => StandardGate::T,
            GateId::Tdg => StandardGate::Tdg,
            GateId::SX => StandardGate::SX,
            GateId::SXdg => StandardGate::SXdg,
            GateId::Rx => StandardGate::Rx(p(0)),
            GateId::Ry => StandardGate::Ry(p(0)),
            GateId::Rz => StandardGate::Rz(p(0)),
            GateId::P => StandardGate::P(p(0)),
            GateId::U => StandardGate::U(p(0), p(1), p(2)),
            GateId::CX => StandardGate::CX,
            GateId::CY => StandardGate::CY,
            GateId::CZ => StandardGate::CZ,
            GateId::CH => StandardGate::CH,
            GateId::Swap => StandardGate::Swap,
            GateId::CRx => StandardGate::CRx(p(0)),
            GateId::CRy => StandardGate::CRy(p(0)),
            GateId::CRz => StandardGate::CRz(p(0)),
            GateId::CP => StandardGate::CP(p(0)),
            GateId::RXX => StandardGate::RXX(p(0)),
            GateId::RYY => StandardGate::RYY(p(0)),
            GateId::RZZ => StandardGate::RZZ(p(0)),
            GateId::CCX => StandardGate::CCX,
            GateId::CSwap => StandardGate::CSwap,
        })
    }

    /// Get the kind of this gate.
    #[inline]
    pub fn id(&self) -> GateId {
        match self {
            StandardGate::I => GateId::I,
            StandardGate::X => GateId::X,
            StandardGate::Y => GateId::Y,
            StandardGate::Z => GateId::Z,
            StandardGate::H => GateId::H,
            StandardGate::S => GateId::S,
            StandardGate::Sdg => GateId::Sdg,
            StandardGate::T => GateId::T,
            StandardGate::Tdg => GateId::Tdg,
            StandardGate::SX => GateId::SX,
            StandardGate::SXdg => GateId::SXdg,
            StandardGate::Rx(_) => GateId::Rx,
            StandardGate::Ry(_) => GateId::Ry,
            StandardGate::Rz(_) => GateId::Rz,
            StandardGate::P(_) => GateId::P,
            StandardGate::U(_, _, _) => GateId::U,
            StandardGate::CX => GateId::CX,
            StandardGate::CY => GateId::CY,
            StandardGate::CZ => GateId::CZ,
            StandardGate::CH => GateId::CH,
            StandardGate::Swap => GateId::Swap,
            StandardGate::CRx(_) => GateId::CRx,
            StandardGate::CRy(_) => GateId::CRy,
            StandardGate::CRz(_) => GateId::CRz,
            StandardGate::CP(_) => GateId::CP,
            StandardGate::RXX(_) => GateId::RXX,
            StandardGate::RYY(_) => GateId::RYY,
            StandardGate::RZZ(_) => GateId::RZZ,
            StandardGate::CCX => GateId::CCX,
            StandardGate::CSwap => GateId::CSwap,
        }
    }

    /// Get the name of this gate.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.id().name()
    }

    /// Get the number of qubits this gate operates on.
    #[inline]
    pub fn num_qubits(&self) -> u32 {
        self.id().num_qubits()
    }

    /// Get parameters of this gate.
    pub fn parameters(&self) -> Vec<f64> {
        match *self {
            StandardGate::Rx(p)
            | StandardGate::Ry(p)
            | StandardGate::Rz(p)
            | StandardGate::P(p)
            | StandardGate::CRx(p)
            | StandardGate::CRy(p)
            | StandardGate::CRz(p)
            | StandardGate::CP(p)
            | StandardGate::RXX(p)
            | StandardGate::RYY(p)
            | StandardGate::RZZ(p) => vec![p],

            StandardGate::U(a, b, c) => vec![a, b, c],

            _ => vec![],
        }
    }
}

impl fmt::Display for StandardGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params = self.parameters();
        if params.is_empty() {
            return f.write_str(self.name());
        }
        let rendered: Vec<String> = params.iter().map(|p| format!("{p:.6}")).collect();
        write!(f, "{}({})", self.name(), rendered.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_standard_gate_properties() {
        assert_eq!(StandardGate::H.num_qubits(), 1);
        assert_eq!(StandardGate::CX.num_qubits(), 2);
        assert_eq!(StandardGate::CCX.num_qubits(), 3);
        assert_eq!(StandardGate::U(1.0, 2.0, 3.0).parameters(), vec![1.0, 2.0, 3.0]);
        assert!(StandardGate::H.parameters().is_empty());
    }

    #[test]
    fn test_from_id_roundtrips_kind() {
        for id in GateId::ALL {
            let params = vec![PI / 3.0; id.num_params()];
            let gate = StandardGate::from_id(id, &params).unwrap();
            assert_eq!(gate.id(), id);
            assert_eq!(gate.parameters(), params);
        }
    }

    #[test]
    fn test_from_id_rejects_wrong_param_count() {
        let err = StandardGate::from_id(GateId::Rx, &[]).unwrap_err();
        assert!(matches!(err, IrError::ParameterCountMismatch { expected: 1, got: 0, .. }));
    }

    #[test]
    fn test_gate_id_parse() {
        assert_eq!("cx".parse::<GateId>().unwrap(), GateId::CX);
        assert_eq!("CSWAP".parse::<GateId>().unwrap(), GateId::CSwap);
        assert_eq!("id".parse::<GateId>().unwrap(), GateId::I);
        assert!("iswap".parse::<GateId>().is_err());
    }

    #[test]
    fn test_gate_id_serde_matches_name() {
        for id in GateId::ALL {
            let json = serde_json::to_string(&id).unwrap();
            assert_eq!(json, format!("\"{}\"", id.name()));
        }
    }

    #[test]
    fn test_gate_display() {
        assert_eq!(StandardGate::H.to_string(), "h");
        assert_eq!(StandardGate::Rz(0.5).to_string(), "rz(0.500000)");
    }
}
