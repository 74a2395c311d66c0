//! Statevector simulation engine.

use num_complex::Complex;
use num_traits::Float;
use std::collections::TryReserveError;
use std::fmt;

use qbench_ir::{Instruction, StandardGate};

/// Scalar type of a state vector: `f32` or `f64`.
pub trait SimFloat: Float + Send + Sync + fmt::Debug + 'static {
    /// Convert an `f64` angle or constant.
    fn cast(value: f64) -> Self;

    /// Widen to `f64` for comparisons and reporting.
    fn widen(self) -> f64;
}

impl SimFloat for f32 {
    #[inline]
    #[allow(clippy::cast_possible_truncation)]
    fn cast(value: f64) -> Self {
        value as f32
    }

    #[inline]
    fn widen(self) -> f64 {
        f64::from(self)
    }
}

impl SimFloat for f64 {
    #[inline]
    fn cast(value: f64) -> Self {
        value
    }

    #[inline]
    fn widen(self) -> f64 {
        self
    }
}

fn c<T: SimFloat>(re: f64, im: f64) -> Complex<T> {
    Complex::new(T::cast(re), T::cast(im))
}

fn polar<T: SimFloat>(theta: f64) -> Complex<T> {
    c(theta.cos(), theta.sin())
}

/// A gate lowered to the kernel that applies it.
///
/// Matrices are row-major `[m00, m01, m10, m11]`.
#[derive(Debug, Clone, PartialEq)]
pub enum Op<T: SimFloat> {
    /// General single-qubit unitary.
    Single { qubit: usize, m: [Complex<T>; 4] },
    /// Diagonal single-qubit gate.
    Diagonal { qubit: usize, d: [Complex<T>; 2] },
    /// Single-qubit unitary on `target` when `control` is set.
    Controlled {
        control: usize,
        target: usize,
        m: [Complex<T>; 4],
    },
    /// CNOT.
    Cx { control: usize, target: usize },
    /// SWAP.
    Swap { a: usize, b: usize },
    /// ZZ rotation: phase by parity of the two bits.
    ZzPhase {
        a: usize,
        b: usize,
        even: Complex<T>,
        odd: Complex<T>,
    },
    /// XX or YY rotation: mixes |x⟩ with |x ⊕ a ⊕ b⟩.
    PairRotation {
        a: usize,
        b: usize,
        cos: T,
        k_even: Complex<T>,
        k_odd: Complex<T>,
    },
    /// Toffoli.
    Ccx { c1: usize, c2: usize, target: usize },
    /// Fredkin.
    CSwap { control: usize, a: usize, b: usize },
}

impl<T: SimFloat> Op<T> {
    /// Lower an instruction.
    #[allow(clippy::too_many_lines)]
    pub fn lower(instruction: &Instruction) -> Self {
        let q: Vec<usize> = instruction.qubits.iter().map(|q| q.index()).collect();
        let zero = c::<T>(0.0, 0.0);
        let one = c::<T>(1.0, 0.0);
        let r = std::f64::consts::FRAC_1_SQRT_2;

        let rx = |theta: f64| {
            let (s, co) = (theta / 2.0).sin_cos();
            [c(co, 0.0), c(0.0, -s), c(0.0, -s), c(co, 0.0)]
        };
        let ry = |theta: f64| {
            let (s, co) = (theta / 2.0).sin_cos();
            [c(co, 0.0), c(-s, 0.0), c(s, 0.0), c(co, 0.0)]
        };
        let rz = |theta: f64| [polar(-theta / 2.0), polar(theta / 2.0)];
        let x = [zero, one, one, zero];
        let y = [zero, c(0.0, -1.0), c(0.0, 1.0), zero];
        let h = [c(r, 0.0), c(r, 0.0), c(r, 0.0), c(-r, 0.0)];
        let diag = |d: [Complex<T>; 2]| [d[0], zero, zero, d[1]];

        match instruction.gate {
            StandardGate::I => Op::Diagonal {
                qubit: q[0],
                d: [one, one],
            },
            StandardGate::X => Op::Single { qubit: q[0], m: x },
            StandardGate::Y => Op::Single { qubit: q[0], m: y },
            StandardGate::Z => Op::Diagonal {
                qubit: q[0],
                d: [one, c(-1.0, 0.0)],
            },
            StandardGate::H => Op::Single { qubit: q[0], m: h },
            StandardGate::S => Op::Diagonal {
                qubit: q[0],
                d: [one, c(0.0, 1.0)],
            },
            StandardGate::Sdg => Op::Diagonal {
                qubit: q[0],
                d: [one, c(0.0, -1.0)],
            },
            StandardGate::T => Op::Diagonal {
                qubit: q[0],
                d: [one, polar(std::f64::consts::FRAC_PI_4)],
            },
            StandardGate::Tdg => Op::Diagonal {
                qubit: q[0],
                d: [one, polar(-std::f64::consts::FRAC_PI_4)],
            },
            StandardGate::SX => Op::Single {
                qubit: q[0],
                m: [c(0.5, 0.5), c(0.5, -0.5), c(0.5, -0.5), c(0.5, 0.5)],
            },
            StandardGate::SXdg => Op::Single {
                qubit: q[0],
                m: [c(0.5, -0.5), c(0.5, 0.5), c(0.5, 0.5), c(0.5, -0.5)],
            },
            StandardGate::Rx(theta) => Op::Single {
                qubit: q[0],
                m: rx(theta),
            },
            StandardGate::Ry(theta) => Op::Single {
                qubit: q[0],
                m: ry(theta),
            },
            StandardGate::Rz(theta) => Op::Diagonal {
                qubit: q[0],
                d: rz(theta),
            },
            StandardGate::P(lambda) => Op::Diagonal {
                qubit: q[0],
                d: [one, polar(lambda)],
            },
            StandardGate::U(theta, phi, lambda) => {
                let (s, co) = (theta / 2.0).sin_cos();
                Op::Single {
                    qubit: q[0],
                    m: [
                        c(co, 0.0),
                        -polar::<T>(lambda) * T::cast(s),
                        polar::<T>(phi) * T::cast(s),
                        polar::<T>(phi + lambda) * T::cast(co),
                    ],
                }
            }

            StandardGate::CX => Op::Cx {
                control: q[0],
                target: q[1],
            },
            StandardGate::CY => Op::Controlled {
                control: q[0],
                target: q[1],
                m: y,
            },
            StandardGate::CZ => Op::Controlled {
                control: q[0],
                target: q[1],
                m: diag([one, c(-1.0, 0.0)]),
            },
            StandardGate::CH => Op::Controlled {
                control: q[0],
                target: q[1],
                m: h,
            },
            StandardGate::Swap => Op::Swap { a: q[0], b: q[1] },
            StandardGate::CRx(theta) => Op::Controlled {
                control: q[0],
                target: q[1],
                m: rx(theta),
            },
            StandardGate::CRy(theta) => Op::Controlled {
                control: q[0],
                target: q[1],
                m: ry(theta),
            },
            StandardGate::CRz(theta) => Op::Controlled {
                control: q[0],
                target: q[1],
                m: diag(rz(theta)),
            },
            StandardGate::CP(lambda) => Op::Controlled {
                control: q[0],
                target: q[1],
                m: diag([one, polar(lambda)]),
            },
            StandardGate::RZZ(theta) => Op::ZzPhase {
                a: q[0],
                b: q[1],
                even: polar(-theta / 2.0),
                odd: polar(theta / 2.0),
            },
            // exp(-iθ/2 X⊗X): both subspaces mix with -i sin(θ/2)
            StandardGate::RXX(theta) => {
                let (s, co) = (theta / 2.0).sin_cos();
                Op::PairRotation {
                    a: q[0],
                    b: q[1],
                    cos: T::cast(co),
                    k_even: c(0.0, -s),
                    k_odd: c(0.0, -s),
                }
            }
            // Y⊗Y flips sign on |00⟩↔|11⟩ relative to X⊗X
            StandardGate::RYY(theta) => {
                let (s, co) = (theta / 2.0).sin_cos();
                Op::PairRotation {
                    a: q[0],
                    b: q[1],
                    cos: T::cast(co),
                    k_even: c(0.0, s),
                    k_odd: c(0.0, -s),
                }
            }

            StandardGate::CCX => Op::Ccx {
                c1: q[0],
                c2: q[1],
                target: q[2],
            },
            StandardGate::CSwap => Op::CSwap {
                control: q[0],
                a: q[1],
                b: q[2],
            },
        }
    }
}

/// A statevector representing a quantum state.
pub struct Statevector<T: SimFloat = f64> {
    /// The state amplitudes (2^n complex numbers).
    amplitudes: Vec<Complex<T>>,
    /// Number of qubits.
    num_qubits: usize,
}

impl<T: SimFloat> Statevector<T> {
    /// Create a new statevector initialized to |0...0⟩.
    ///
    /// Fails instead of aborting when the allocation cannot be satisfied.
    pub fn try_new(num_qubits: usize) -> Result<Self, TryReserveError> {
        let size = 1usize.checked_shl(num_qubits as u32).unwrap_or(usize::MAX);
        let mut amplitudes = Vec::new();
        amplitudes.try_reserve_exact(size)?;
        amplitudes.resize(size, Complex::new(T::zero(), T::zero()));
        amplitudes[0] = Complex::new(T::one(), T::zero());
        Ok(Self {
            amplitudes,
            num_qubits,
        })
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// The amplitudes, indexed with qubit 0 as the least significant bit.
    pub fn amplitudes(&self) -> &[Complex<T>] {
        &self.amplitudes
    }

    /// Measurement probabilities of every basis state.
    pub fn probabilities(&self) -> Vec<f64> {
        self.amplitudes.iter().map(|a| a.norm_sqr().widen()).collect()
    }

    /// Squared norm of the state; 1 up to rounding.
    pub fn norm_sqr(&self) -> f64 {
        self.amplitudes.iter().map(|a| a.norm_sqr().widen()).sum()
    }

    /// |⟨self|other⟩|², insensitive to global phase.
    pub fn fidelity(&self, other: &Self) -> f64 {
        let mut re = 0.0;
        let mut im = 0.0;
        for (a, b) in self.amplitudes.iter().zip(&other.amplitudes) {
            let p = a.conj() * b;
            re += p.re.widen();
            im += p.im.widen();
        }
        re * re + im * im
    }

    /// Apply an instruction to the statevector.
    pub fn apply(&mut self, instruction: &Instruction) {
        self.apply_op(&Op::lower(instruction));
    }

    /// Apply a lowered gate.
    pub fn apply_op(&mut self, op: &Op<T>) {
        match *op {
            Op::Single { qubit, m } => self.apply_single(qubit, m),
            Op::Diagonal { qubit, d } => self.apply_diagonal(qubit, d),
            Op::Controlled { control, target, m } => self.apply_controlled(control, target, m),
            Op::Cx { control, target } => self.apply_cx(control, target),
            Op::Swap { a, b } => self.apply_swap(a, b),
            Op::ZzPhase { a, b, even, odd } => self.apply_zz_phase(a, b, even, odd),
            Op::PairRotation {
                a,
                b,
                cos,
                k_even,
                k_odd,
            } => self.apply_pair_rotation(a, b, cos, k_even, k_odd),
            Op::Ccx { c1, c2, target } => self.apply_ccx(c1, c2, target),
            Op::CSwap { control, a, b } => self.apply_cswap(control, a, b),
        }
    }

    // =========================================================================
    // Single-qubit kernels
    // =========================================================================

    fn apply_single(&mut self, qubit: usize, m: [Complex<T>; 4]) {
        let mask = 1 << qubit;
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 {
                let j = i | mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = m[0] * a + m[1] * b;
                self.amplitudes[j] = m[2] * a + m[3] * b;
            }
        }
    }

    fn apply_diagonal(&mut self, qubit: usize, d: [Complex<T>; 2]) {
        let mask = 1 << qubit;
        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            *amp = *amp * d[usize::from(i & mask != 0)];
        }
    }

    // =========================================================================
    // Two-qubit kernels
    // =========================================================================

    fn apply_controlled(&mut self, control: usize, target: usize, m: [Complex<T>; 4]) {
        let ctrl_mask = 1 << control;
        let tgt_mask = 1 << target;
        for i in 0..self.amplitudes.len() {
            if (i & ctrl_mask != 0) && (i & tgt_mask == 0) {
                let j = i | tgt_mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = m[0] * a + m[1] * b;
                self.amplitudes[j] = m[2] * a + m[3] * b;
            }
        }
    }

    fn apply_cx(&mut self, control: usize, target: usize) {
        let ctrl_mask = 1 << control;
        let tgt_mask = 1 << target;
        for i in 0..self.amplitudes.len() {
            if (i & ctrl_mask != 0) && (i & tgt_mask == 0) {
                self.amplitudes.swap(i, i | tgt_mask);
            }
        }
    }

    fn apply_swap(&mut self, a: usize, b: usize) {
        let mask_a = 1 << a;
        let mask_b = 1 << b;
        for i in 0..self.amplitudes.len() {
            if (i & mask_a != 0) && (i & mask_b == 0) {
                let j = (i & !mask_a) | mask_b;
                self.amplitudes.swap(i, j);
            }
        }
    }

    fn apply_zz_phase(&mut self, a: usize, b: usize, even: Complex<T>, odd: Complex<T>) {
        let mask_a = 1 << a;
        let mask_b = 1 << b;
        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            let parity = (i & mask_a != 0) ^ (i & mask_b != 0);
            *amp = *amp * if parity { odd } else { even };
        }
    }

    fn apply_pair_rotation(
        &mut self,
        a: usize,
        b: usize,
        cos: T,
        k_even: Complex<T>,
        k_odd: Complex<T>,
    ) {
        let mask_a = 1 << a;
        let mask_b = 1 << b;
        for i in 0..self.amplitudes.len() {
            if i & mask_a == 0 {
                let j = i ^ mask_a ^ mask_b;
                let k = if i & mask_b == 0 { k_even } else { k_odd };
                let x = self.amplitudes[i];
                let y = self.amplitudes[j];
                self.amplitudes[i] = x * cos + k * y;
                self.amplitudes[j] = y * cos + k * x;
            }
        }
    }

    // =========================================================================
    // Three-qubit kernels
    // =========================================================================

    fn apply_ccx(&mut self, c1: usize, c2: usize, target: usize) {
        let c1_mask = 1 << c1;
        let c2_mask = 1 << c2;
        let tgt_mask = 1 << target;
        for i in 0..self.amplitudes.len() {
            if (i & c1_mask != 0) && (i & c2_mask != 0) && (i & tgt_mask == 0) {
                self.amplitudes.swap(i, i | tgt_mask);
            }
        }
    }

    fn apply_cswap(&mut self, control: usize, a: usize, b: usize) {
        let ctrl_mask = 1 << control;
        let mask_a = 1 << a;
        let mask_b = 1 << b;
        for i in 0..self.amplitudes.len() {
            if (i & ctrl_mask != 0) && (i & mask_a != 0) && (i & mask_b == 0) {
                let j = (i & !mask_a) | mask_b;
                self.amplitudes.swap(i, j);
            }
        }
    }
}
