//! Seeded random circuit generation.
//!
//! Circuits are built layer by layer: every layer shuffles the register and
//! packs random vocabulary gates onto disjoint qubits until no gate fits the
//! qubits that are left. Angles are uniform in `[0, 2π)`.
//!
//! Each call owns its RNG, seeded from the [`CircuitSpec`], so the same spec always
//! produces the same circuit regardless of what ran before it.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::f64::consts::TAU;
use std::fmt;
use std::str::FromStr;

use qbench_ir::{Circuit, GateId, IrError, QubitId, StandardGate};

use crate::error::{GeneratorError, GeneratorResult};

/// Non-empty set of gate kinds the generator draws from.
///
/// Iteration follows [`GateId`] order, which fixes the draw order for a seed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<GateId>", into = "Vec<GateId>")]
pub struct GateVocabulary(BTreeSet<GateId>);

impl GateVocabulary {
    /// Create a vocabulary; duplicates collapse.
    pub fn new(gates: impl IntoIterator<Item = GateId>) -> GeneratorResult<Self> {
        let set: BTreeSet<GateId> = gates.into_iter().collect();
        if set.is_empty() {
            return Err(GeneratorError::EmptyVocabulary);
        }
        Ok(Self(set))
    }

    /// Every supported gate kind.
    pub fn full() -> Self {
        Self(GateId::ALL.into_iter().collect())
    }

    /// Whether a gate kind is in the vocabulary.
    pub fn contains(&self, gate: GateId) -> bool {
        self.0.contains(&gate)
    }

    /// Gate kinds in draw order.
    pub fn iter(&self) -> impl Iterator<Item = GateId> + '_ {
        self.0.iter().copied()
    }

    /// Number of gate kinds.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Gate kinds grouped by arity, restricted to arities `<= max_arity`.
    fn by_arity(&self, max_arity: u32) -> BTreeMap<u32, Vec<GateId>> {
        let mut groups: BTreeMap<u32, Vec<GateId>> = BTreeMap::new();
        for gate in self.iter().filter(|g| g.num_qubits() <= max_arity) {
            groups.entry(gate.num_qubits()).or_default().push(gate);
        }
        groups
    }
}

impl Default for GateVocabulary {
    fn default() -> Self {
        Self::full()
    }
}

impl TryFrom<Vec<GateId>> for GateVocabulary {
    type Error = GeneratorError;

    fn try_from(gates: Vec<GateId>) -> Result<Self, Self::Error> {
        Self::new(gates)
    }
}

impl From<GateVocabulary> for Vec<GateId> {
    fn from(vocabulary: GateVocabulary) -> Self {
        vocabulary.0.into_iter().collect()
    }
}

impl fmt::Display for GateVocabulary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, gate) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{gate}")?;
        }
        Ok(())
    }
}

impl FromStr for GateVocabulary {
    type Err = GeneratorError;

    /// Parse a comma separated list such as `"h, cx, rz"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let gates = s
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(GateId::from_str)
            .collect::<Result<Vec<_>, IrError>>()?;
        Self::new(gates)
    }
}

/// Parameters of one generated circuit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CircuitSpec {
    qubit_count: u32,
    depth: u32,
    seed: i64,
    vocabulary: GateVocabulary,
}

impl CircuitSpec {
    /// Validate and create a spec.
    pub fn new(
        qubit_count: u32,
        depth: u32,
        seed: i64,
        vocabulary: GateVocabulary,
    ) -> GeneratorResult<Self> {
        if qubit_count == 0 {
            return Err(GeneratorError::InvalidSpec(
                "qubit_count must be at least 1".into(),
            ));
        }
        if depth == 0 {
            return Err(GeneratorError::InvalidSpec("depth must be at least 1".into()));
        }
        Ok(Self {
            qubit_count,
            depth,
            seed,
            vocabulary,
        })
    }

    pub fn qubit_count(&self) -> u32 {
        self.qubit_count
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn seed(&self) -> i64 {
        self.seed
    }

    pub fn vocabulary(&self) -> &GateVocabulary {
        &self.vocabulary
    }
}

/// Generate the circuit described by `spec`.
///
/// # Errors
///
/// [`GeneratorError::NoApplicableGate`] if every vocabulary gate needs more
/// qubits than `spec.qubit_count()`.
pub fn generate(spec: &CircuitSpec) -> GeneratorResult<Circuit> {
    let n = spec.qubit_count;
    let groups = spec.vocabulary.by_arity(n);
    if groups.is_empty() {
        return Err(GeneratorError::NoApplicableGate {
            qubit_count: n,
            vocabulary: spec.vocabulary.to_string(),
        });
    }
    let arities: Vec<u32> = groups.keys().copied().collect();

    // Two's-complement bits, so negative seeds are valid and distinct.
    #[allow(clippy::cast_sign_loss)]
    let mut rng = StdRng::seed_from_u64(spec.seed as u64);

    let mut circuit = Circuit::with_size(
        format!("random_q{}_d{}_s{}", n, spec.depth, spec.seed),
        n,
    );
    let mut register: Vec<u32> = (0..n).collect();
    let mut params = Vec::with_capacity(3);

    for _ in 0..spec.depth {
        register.shuffle(&mut rng);
        let mut next = 0usize;

        loop {
            let remaining = register.len() - next;
            let fitting: Vec<u32> = arities
                .iter()
                .copied()
                .filter(|&arity| arity as usize <= remaining)
                .collect();
            if fitting.is_empty() {
                break;
            }
            let arity = fitting[rng.gen_range(0..fitting.len())];

            let candidates = &groups[&arity];
            let id = candidates[rng.gen_range(0..candidates.len())];

            params.clear();
            params.extend((0..id.num_params()).map(|_| rng.gen_range(0.0..TAU)));
            let gate = StandardGate::from_id(id, &params)?;

            let operands = &register[next..next + arity as usize];
            circuit.gate(gate, operands.iter().copied().map(QubitId))?;
            next += arity as usize;
        }
    }

    Ok(circuit)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(qubits: u32, depth: u32, seed: i64) -> CircuitSpec {
        CircuitSpec::new(qubits, depth, seed, GateVocabulary::full()).unwrap()
    }

    #[test]
    fn test_same_spec_same_circuit() {
        let a = generate(&spec(6, 10, 42)).unwrap();
        let b = generate(&spec(6, 10, 42)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_seed_different_circuit() {
        let a = generate(&spec(6, 10, 42)).unwrap();
        let b = generate(&spec(6, 10, 43)).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_negative_seed_is_accepted() {
        let a = generate(&spec(3, 4, -1)).unwrap();
        assert!(!a.is_empty());
    }

    #[test]
    fn test_circuit_uses_requested_width() {
        let circuit = generate(&spec(5, 3, 7)).unwrap();
        assert_eq!(circuit.num_qubits(), 5);
        assert!(circuit.depth() <= 3);
    }

    #[test]
    fn test_single_qubit_vocabulary_fills_every_layer() {
        let vocab = GateVocabulary::new([GateId::H]).unwrap();
        let circuit = generate(&CircuitSpec::new(4, 3, 1, vocab).unwrap()).unwrap();
        assert_eq!(circuit.len(), 12);
        assert_eq!(circuit.depth(), 3);
    }

    #[test]
    fn test_only_vocabulary_gates_are_drawn() {
        let vocab: GateVocabulary = "cx, rz".parse().unwrap();
        let circuit = generate(&CircuitSpec::new(5, 8, 9, vocab.clone()).unwrap()).unwrap();
        for inst in circuit.instructions() {
            assert!(vocab.contains(inst.gate.id()), "unexpected {}", inst.name());
        }
    }

    #[test]
    fn test_no_applicable_gate() {
        let vocab = GateVocabulary::new([GateId::CX, GateId::CCX]).unwrap();
        let err = generate(&CircuitSpec::new(1, 4, 0, vocab).unwrap()).unwrap_err();
        assert!(matches!(
            err,
            GeneratorError::NoApplicableGate { qubit_count: 1, .. }
        ));
    }

    #[test]
    fn test_wide_gates_skipped_on_small_registers() {
        let vocab = GateVocabulary::new([GateId::X, GateId::CCX]).unwrap();
        let circuit = generate(&CircuitSpec::new(2, 5, 3, vocab).unwrap()).unwrap();
        assert!(circuit.instructions().iter().all(|i| i.gate.id() == GateId::X));
    }

    #[test]
    fn test_invalid_spec() {
        assert!(CircuitSpec::new(0, 1, 0, GateVocabulary::full()).is_err());
        assert!(CircuitSpec::new(1, 0, 0, GateVocabulary::full()).is_err());
        assert!(matches!(
            GateVocabulary::new(Vec::new()),
            Err(GeneratorError::EmptyVocabulary)
        ));
    }

    #[test]
    fn test_vocabulary_parse_and_display() {
        let vocab: GateVocabulary = "rz, H ,cx,h".parse().unwrap();
        assert_eq!(vocab.len(), 3);
        assert_eq!(vocab.to_string(), "h, rz, cx");
        assert!("h, bogus".parse::<GateVocabulary>().is_err());
    }
}
