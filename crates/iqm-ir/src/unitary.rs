//! Unitary matrices of gates and small circuits.
//!
//! Matrices use big-endian qubit order: the first qubit of an operation is
//! the most significant bit of the basis-state index.

use ndarray::Array2;
use num_complex::Complex64;
use std::f64::consts::PI;

use crate::gate::{Gate, Power};

/// Tolerance for floating point comparisons.
pub const EPSILON: f64 = 1e-10;

const ZERO: Complex64 = Complex64::new(0.0, 0.0);
const ONE: Complex64 = Complex64::new(1.0, 0.0);

/// `e^{iπx}`.
#[inline]
fn phase(x: f64) -> Complex64 {
    Complex64::from_polar(1.0, PI * x)
}

/// Power of an involution `A`: `e^{iπts} [(I+A)/2 + e^{iπt}(I−A)/2]`.
fn involution_pow(a: &Array2<Complex64>, power: Power) -> Array2<Complex64> {
    let dim = a.nrows();
    let eye = Array2::<Complex64>::eye(dim);
    let half = Complex64::new(0.5, 0.0);
    let plus = (&eye + a).mapv(|v| v * half);
    let minus = (&eye - a).mapv(|v| v * half * phase(power.exponent));
    (plus + minus).mapv(|v| v * phase(power.exponent * power.global_shift))
}

fn from_rows<const N: usize>(rows: [[Complex64; N]; N]) -> Array2<Complex64> {
    Array2::from_shape_fn((N, N), |(r, c)| rows[r][c])
}

fn diagonal(entries: &[f64]) -> Array2<Complex64> {
    let mut m = Array2::<Complex64>::zeros((entries.len(), entries.len()));
    for (i, &v) in entries.iter().enumerate() {
        m[[i, i]] = Complex64::new(v, 0.0);
    }
    m
}

fn pauli_x() -> Array2<Complex64> {
    from_rows([[ZERO, ONE], [ONE, ZERO]])
}

fn pauli_y() -> Array2<Complex64> {
    let i = Complex64::new(0.0, 1.0);
    from_rows([[ZERO, -i], [i, ZERO]])
}

fn hadamard() -> Array2<Complex64> {
    let s = Complex64::new(std::f64::consts::FRAC_1_SQRT_2, 0.0);
    from_rows([[s, s], [s, -s]])
}

fn swap_matrix() -> Array2<Complex64> {
    from_rows([
        [ONE, ZERO, ZERO, ZERO],
        [ZERO, ZERO, ONE, ZERO],
        [ZERO, ONE, ZERO, ZERO],
        [ZERO, ZERO, ZERO, ONE],
    ])
}

/// Controlled version of a single-qubit involution, control bits leading.
fn controlled(target: &Array2<Complex64>, num_controls: usize) -> Array2<Complex64> {
    let dim = 1 << (num_controls + 1);
    let mut m = Array2::<Complex64>::eye(dim);
    let base = dim - 2;
    for r in 0..2 {
        for c in 0..2 {
            m[[base + r, base + c]] = target[[r, c]];
        }
    }
    m
}

/// Get the unitary matrix of a gate.
pub fn gate_matrix(gate: &Gate) -> Array2<Complex64> {
    match *gate {
        Gate::Identity { num_qubits } => Array2::eye(1 << num_qubits),
        Gate::XPow(p) => involution_pow(&pauli_x(), p),
        Gate::YPow(p) => involution_pow(&pauli_y(), p),
        Gate::ZPow(p) => involution_pow(&diagonal(&[1.0, -1.0]), p),
        Gate::HPow(p) => involution_pow(&hadamard(), p),
        Gate::PhasedXPow {
            phase_exponent,
            power,
        } => {
            let z = gate_matrix(&Gate::z_pow(phase_exponent));
            let z_inv = gate_matrix(&Gate::z_pow(-phase_exponent));
            z.dot(&involution_pow(&pauli_x(), power)).dot(&z_inv)
        }
        Gate::PhasedXZ {
            x_exponent,
            z_exponent,
            axis_phase_exponent,
        } => {
            let phased = gate_matrix(&Gate::phased_x(x_exponent, axis_phase_exponent));
            gate_matrix(&Gate::z_pow(z_exponent)).dot(&phased)
        }
        Gate::CZPow(p) => involution_pow(&diagonal(&[1.0, 1.0, 1.0, -1.0]), p),
        Gate::CXPow(p) => involution_pow(&controlled(&pauli_x(), 1), p),
        Gate::ZZPow(p) => involution_pow(&diagonal(&[1.0, -1.0, -1.0, 1.0]), p),
        Gate::SwapPow(p) => involution_pow(&swap_matrix(), p),
        Gate::CCZPow(p) => involution_pow(
            &diagonal(&[1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, -1.0]),
            p,
        ),
        Gate::CCXPow(p) => involution_pow(&controlled(&pauli_x(), 2), p),
        Gate::ISwapPow(p) => {
            let c = Complex64::new((PI * p.exponent / 2.0).cos(), 0.0);
            let s = Complex64::new(0.0, (PI * p.exponent / 2.0).sin());
            from_rows([
                [ONE, ZERO, ZERO, ZERO],
                [ZERO, c, s, ZERO],
                [ZERO, s, c, ZERO],
                [ZERO, ZERO, ZERO, ONE],
            ])
            .mapv(|v| v * phase(p.exponent * p.global_shift))
        }
        // The MOVE phase is left undefined by the hardware; the population
        // exchange is represented with a unit phase.
        Gate::Move => swap_matrix(),
    }
}

/// Apply a `2^k × 2^k` matrix to `targets` of an `n`-qubit operator, in place.
///
/// Computes `embed(m) · state` without materializing the embedded matrix.
pub fn apply_matrix(
    state: &mut Array2<Complex64>,
    m: &Array2<Complex64>,
    targets: &[usize],
    num_qubits: usize,
) {
    let k = targets.len();
    let sub_dim = 1usize << k;
    let masks: Vec<usize> = targets
        .iter()
        .map(|&t| 1usize << (num_qubits - 1 - t))
        .collect();
    let target_mask: usize = masks.iter().sum();

    let offset = |sub: usize| -> usize {
        let mut idx = 0;
        for (j, mask) in masks.iter().enumerate() {
            if sub & (1 << (k - 1 - j)) != 0 {
                idx |= mask;
            }
        }
        idx
    };
    let offsets: Vec<usize> = (0..sub_dim).map(offset).collect();

    let dim = 1usize << num_qubits;
    let mut gathered = vec![ZERO; sub_dim];
    for col in 0..state.ncols() {
        for base in (0..dim).filter(|b| b & target_mask == 0) {
            for (s, off) in offsets.iter().enumerate() {
                gathered[s] = state[[base | off, col]];
            }
            for (r, off) in offsets.iter().enumerate() {
                let mut acc = ZERO;
                for (c, g) in gathered.iter().enumerate() {
                    acc += m[[r, c]] * g;
                }
                state[[base | off, col]] = acc;
            }
        }
    }
}

/// Embed a `2^k × 2^k` matrix acting on `targets` into an `n`-qubit space.
pub fn embed(m: &Array2<Complex64>, targets: &[usize], num_qubits: usize) -> Array2<Complex64> {
    let mut full = Array2::eye(1 << num_qubits);
    apply_matrix(&mut full, m, targets, num_qubits);
    full
}

/// Check if two matrices are element-wise equal within `atol`.
pub fn allclose(a: &Array2<Complex64>, b: &Array2<Complex64>, atol: f64) -> bool {
    a.dim() == b.dim() && a.iter().zip(b.iter()).all(|(x, y)| (x - y).norm() <= atol)
}

/// Check if two matrices are equal up to a global phase.
pub fn allclose_up_to_global_phase(
    a: &Array2<Complex64>,
    b: &Array2<Complex64>,
    atol: f64,
) -> bool {
    if a.dim() != b.dim() {
        return false;
    }
    let Some((x, y)) = a
        .iter()
        .zip(b.iter())
        .max_by(|(x1, _), (x2, _)| x1.norm().total_cmp(&x2.norm()))
    else {
        return true;
    };
    if y.norm() < EPSILON {
        return x.norm() <= atol;
    }
    let correction = (x / y).unscale((x / y).norm());
    let rephased = b.mapv(|v| v * correction);
    allclose(a, &rephased, atol)
}

/// A 2x2 unitary matrix in row-major order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Unitary2x2 {
    /// The matrix elements in row-major order: [[a, b], [c, d]].
    pub data: [Complex64; 4],
}

impl Unitary2x2 {
    /// Create a new 2x2 unitary matrix.
    pub fn new(a: Complex64, b: Complex64, c: Complex64, d: Complex64) -> Self {
        Self { data: [a, b, c, d] }
    }

    /// Create the identity matrix.
    pub fn identity() -> Self {
        Self::new(ONE, ZERO, ZERO, ONE)
    }

    /// Get the matrix of a single-qubit gate.
    pub fn from_gate(gate: &Gate) -> Option<Self> {
        if gate.num_qubits() != 1 {
            return None;
        }
        let m = gate_matrix(gate);
        Some(Self::new(m[[0, 0]], m[[0, 1]], m[[1, 0]], m[[1, 1]]))
    }

    /// Multiply this matrix by another: self * other.
    #[allow(clippy::many_single_char_names)]
    pub fn mul(&self, other: &Self) -> Self {
        let [a, b, c, d] = self.data;
        let [e, f, g, h] = other.data;
        Self::new(a * e + b * g, a * f + b * h, c * e + d * g, c * f + d * h)
    }

    /// Get the conjugate transpose (dagger).
    pub fn dagger(&self) -> Self {
        Self::new(
            self.data[0].conj(),
            self.data[2].conj(),
            self.data[1].conj(),
            self.data[3].conj(),
        )
    }

    /// Check if this is approximately identity (up to global phase).
    pub fn is_identity(&self) -> bool {
        let [a, b, c, d] = self.data;
        if b.norm() > EPSILON || c.norm() > EPSILON {
            return false;
        }
        (a - d).norm() < EPSILON
    }

    /// Convert to a dense matrix.
    pub fn to_array(&self) -> Array2<Complex64> {
        let [a, b, c, d] = self.data;
        from_rows([[a, b], [c, d]])
    }

    /// Split into `(pre, rotation, post)` angles with
    /// `U ≅ diag(1, e^{i·post}) · R(rotation/2) · diag(1, e^{i·pre})`.
    fn deconstruct_into_angles(&self) -> (f64, f64, f64) {
        let [m00, m01, m10, m11] = self.data;

        let right = (m01 * m00.conj()).arg() + PI;
        let m01 = m01 * Complex64::from_polar(1.0, -right);
        let m11 = m11 * Complex64::from_polar(1.0, -right);

        let bottom = (m10 * m00.conj()).arg();
        let m10 = m10 * Complex64::from_polar(1.0, -bottom);
        let m11 = m11 * Complex64::from_polar(1.0, -bottom);

        let rotation = m10.norm().atan2(m00.norm());
        let (sin, cos) = rotation.sin_cos();
        let n00 = m00 * cos + m10 * sin;
        let n11 = m01 * -sin + m11 * cos;
        let diagonal = (n11 * n00.conj()).arg();

        (right + diagonal, rotation * 2.0, bottom)
    }

    /// Rewrite as at most a `PhasedXPow` followed by a `ZPow`, up to global phase.
    ///
    /// Rotations whose effect is below `tolerance` are omitted; a half-turn
    /// PhasedX absorbs the trailing Z rotation into its axis.
    pub fn to_phased_x_and_z(&self, tolerance: f64) -> Vec<Gate> {
        let (pre, rotation, post) = self.deconstruct_into_angles();
        let tau = 2.0 * PI;
        let xy_turn = signed_mod_1(rotation / tau);
        let xy_phase_turn = signed_mod_1(0.25 - pre / tau);
        let z_turn = signed_mod_1((post + pre) / tau);

        let mut gates = Vec::with_capacity(2);
        let has_xy = (PI * xy_turn).sin().abs() > tolerance;
        let has_z = (PI * z_turn).sin().abs() > tolerance;
        if has_xy && has_z && (xy_turn.abs() - 0.5).abs() <= tolerance {
            gates.push(Gate::phased_x(1.0, 2.0 * xy_phase_turn + z_turn));
            return gates;
        }
        if has_xy {
            gates.push(Gate::phased_x(2.0 * xy_turn, 2.0 * xy_phase_turn));
        }
        if has_z {
            gates.push(Gate::z_pow(2.0 * z_turn));
        }
        gates
    }
}

impl Default for Unitary2x2 {
    fn default() -> Self {
        Self::identity()
    }
}

impl std::ops::Mul for Unitary2x2 {
    type Output = Self;

    #[allow(clippy::needless_pass_by_value)]
    fn mul(self, rhs: Self) -> Self::Output {
        Unitary2x2::mul(&self, &rhs)
    }
}

/// Reduce into `[-0.5, 0.5)`.
fn signed_mod_1(x: f64) -> f64 {
    (x + 0.5).rem_euclid(1.0) - 0.5
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gates_matrix(gates: &[Gate]) -> Unitary2x2 {
        gates.iter().fold(Unitary2x2::identity(), |acc, g| {
            Unitary2x2::from_gate(g).unwrap() * acc
        })
    }

    #[test]
    fn test_rotation_convention() {
        // Rx(π) = -iX
        let rx = gate_matrix(&Gate::rx(PI));
        assert!((rx[[0, 1]] - Complex64::new(0.0, -1.0)).norm() < EPSILON);
        assert!(rx[[0, 0]].norm() < EPSILON);
    }

    #[test]
    fn test_cz_matrix() {
        let cz = gate_matrix(&Gate::cz());
        assert!(allclose(&cz, &diagonal(&[1.0, 1.0, 1.0, -1.0]), EPSILON));
    }

    #[test]
    fn test_cnot_is_big_endian() {
        let cx = gate_matrix(&Gate::cnot());
        // |10> -> |11>
        assert!((cx[[3, 2]] - ONE).norm() < EPSILON);
        assert!((cx[[1, 1]] - ONE).norm() < EPSILON);
    }

    #[test]
    fn test_embed_reversed_targets() {
        let cx = gate_matrix(&Gate::cnot());
        let reversed = embed(&cx, &[1, 0], 2);
        // control on the second qubit: |01> -> |11>
        assert!((reversed[[3, 1]] - ONE).norm() < EPSILON);
        assert!((reversed[[2, 2]] - ONE).norm() < EPSILON);
    }

    #[test]
    fn test_iswap_squared_is_zz_like() {
        let iswap = gate_matrix(&Gate::iswap());
        let sq = iswap.dot(&iswap);
        assert!(allclose(&sq, &diagonal(&[1.0, -1.0, -1.0, 1.0]), EPSILON));
    }

    #[test]
    fn test_up_to_global_phase() {
        let a = gate_matrix(&Gate::x());
        let b = gate_matrix(&Gate::rx(PI));
        assert!(!allclose(&a, &b, EPSILON));
        assert!(allclose_up_to_global_phase(&a, &b, EPSILON));
    }

    #[test]
    fn test_phased_x_and_z_reconstructs() {
        let original = [Gate::x_pow(0.1), Gate::y_pow(0.2), Gate::z_pow(0.3)];
        let u = gates_matrix(&original);
        let gates = u.to_phased_x_and_z(EPSILON);
        assert_eq!(gates.len(), 2);
        assert!(matches!(gates[0], Gate::PhasedXPow { .. }));
        assert!(matches!(gates[1], Gate::ZPow(_)));
        let v = gates_matrix(&gates);
        assert!(allclose_up_to_global_phase(&u.to_array(), &v.to_array(), 1e-9));
    }

    #[test]
    fn test_phased_x_and_z_of_identity_is_empty() {
        let u = gates_matrix(&[Gate::x_pow(0.5), Gate::x_pow(-0.5)]);
        assert!(u.to_phased_x_and_z(EPSILON).is_empty());
    }

    #[test]
    fn test_half_turn_absorbs_z() {
        let original = [Gate::x(), Gate::z_pow(0.3)];
        let u = gates_matrix(&original);
        let gates = u.to_phased_x_and_z(EPSILON);
        assert_eq!(gates.len(), 1);
        let v = gates_matrix(&gates);
        assert!(allclose_up_to_global_phase(&u.to_array(), &v.to_array(), 1e-9));
    }

    #[test]
    fn test_pure_z() {
        let u = gates_matrix(&[Gate::z_pow(0.4)]);
        let gates = u.to_phased_x_and_z(EPSILON);
        assert_eq!(gates.len(), 1);
        let Gate::ZPow(p) = gates[0] else {
            panic!("expected a Z rotation, got {:?}", gates[0]);
        };
        assert!((p.exponent - 0.4).abs() < 1e-9);
    }
}
