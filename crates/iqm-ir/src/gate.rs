//! Quantum gate types.
//!
//! Parametrized gates follow the eigen-gate convention: a gate with exponent
//! `t` and global shift `s` acts as `e^{iπts} Σ_λ e^{iπtλ} P_λ`, where `P_λ`
//! are the projectors onto the eigenspaces of the base gate. The global shift
//! only contributes a global phase, but that phase becomes observable once the
//! gate is used inside a controlled construction, so it is tracked exactly.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;

/// Exponent and global shift of a power gate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Power {
    /// Exponent in half turns.
    pub exponent: f64,
    /// Global phase shift in units of the exponent.
    #[serde(default)]
    pub global_shift: f64,
}

impl Power {
    /// Create a power with the given exponent and global shift.
    pub const fn new(exponent: f64, global_shift: f64) -> Self {
        Self {
            exponent,
            global_shift,
        }
    }

    /// Create a power with no global shift.
    pub const fn exponent(exponent: f64) -> Self {
        Self::new(exponent, 0.0)
    }
}

impl Default for Power {
    fn default() -> Self {
        Self::exponent(1.0)
    }
}

/// Type tag of a gate, ignoring its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GateFamily {
    /// Identity on any number of qubits.
    Identity,
    /// Powers of Pauli-X.
    XPow,
    /// Powers of Pauli-Y.
    YPow,
    /// Powers of Pauli-Z.
    ZPow,
    /// Powers of Hadamard.
    HPow,
    /// X rotation about an axis in the XY plane.
    PhasedXPow,
    /// Phased X rotation followed by a Z rotation.
    PhasedXZ,
    /// Powers of controlled-Z.
    CZPow,
    /// Powers of CNOT.
    CXPow,
    /// Powers of Z⊗Z.
    ZZPow,
    /// Powers of iSWAP.
    ISwapPow,
    /// Powers of SWAP.
    SwapPow,
    /// Powers of the doubly controlled Z.
    CCZPow,
    /// Powers of the Toffoli gate.
    CCXPow,
    /// Population exchange between a qubit and a resonator.
    Move,
    /// Measurement in the computational basis.
    Measure,
}

impl GateFamily {
    /// Get the name of this family.
    pub fn name(&self) -> &'static str {
        match self {
            GateFamily::Identity => "id",
            GateFamily::XPow => "x",
            GateFamily::YPow => "y",
            GateFamily::ZPow => "z",
            GateFamily::HPow => "h",
            GateFamily::PhasedXPow => "phased_x",
            GateFamily::PhasedXZ => "phased_xz",
            GateFamily::CZPow => "cz",
            GateFamily::CXPow => "cx",
            GateFamily::ZZPow => "zz",
            GateFamily::ISwapPow => "iswap",
            GateFamily::SwapPow => "swap",
            GateFamily::CCZPow => "ccz",
            GateFamily::CCXPow => "ccx",
            GateFamily::Move => "move",
            GateFamily::Measure => "measure",
        }
    }

    /// Check if the family is invariant under permutation of its qubits.
    pub fn is_symmetric(&self) -> bool {
        matches!(
            self,
            GateFamily::Identity
                | GateFamily::CZPow
                | GateFamily::ZZPow
                | GateFamily::ISwapPow
                | GateFamily::SwapPow
                | GateFamily::CCZPow
        )
    }

    /// Exponent period of a one-parameter family, ignoring global phase.
    ///
    /// Families with eigenvalues `{0, 1}` repeat after 2; iSWAP has
    /// eigenvalues `{0, ±½}` and repeats after 4.
    pub fn period(&self) -> Option<f64> {
        match self {
            GateFamily::XPow
            | GateFamily::YPow
            | GateFamily::ZPow
            | GateFamily::HPow
            | GateFamily::PhasedXPow
            | GateFamily::CZPow
            | GateFamily::CXPow
            | GateFamily::ZZPow
            | GateFamily::SwapPow
            | GateFamily::CCZPow
            | GateFamily::CCXPow => Some(2.0),
            GateFamily::ISwapPow => Some(4.0),
            GateFamily::Identity
            | GateFamily::PhasedXZ
            | GateFamily::Move
            | GateFamily::Measure => None,
        }
    }
}

impl fmt::Display for GateFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A unitary gate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Gate {
    /// Identity on `num_qubits` qubits.
    Identity {
        /// Number of qubits.
        num_qubits: usize,
    },
    /// `X^t`.
    XPow(Power),
    /// `Y^t`.
    YPow(Power),
    /// `Z^t`.
    ZPow(Power),
    /// `H^t`.
    HPow(Power),
    /// `Z^p · X^t · Z^-p`.
    PhasedXPow {
        /// Axis angle in half turns.
        phase_exponent: f64,
        /// Rotation power.
        power: Power,
    },
    /// `Z^z · Z^a · X^x · Z^-a`.
    PhasedXZ {
        /// X rotation in half turns.
        x_exponent: f64,
        /// Trailing Z rotation in half turns.
        z_exponent: f64,
        /// Axis angle in half turns.
        axis_phase_exponent: f64,
    },
    /// `CZ^t`.
    CZPow(Power),
    /// `CNOT^t`, control first.
    CXPow(Power),
    /// `(Z⊗Z)^t`.
    ZZPow(Power),
    /// `iSWAP^t`.
    ISwapPow(Power),
    /// `SWAP^t`.
    SwapPow(Power),
    /// `CCZ^t`.
    CCZPow(Power),
    /// `CCX^t`, controls first.
    CCXPow(Power),
    /// MOVE between a qubit (first) and a resonator (second).
    Move,
}

impl Gate {
    // =========================================================================
    // Constructors
    // =========================================================================

    /// Identity on `num_qubits` qubits.
    pub const fn identity(num_qubits: usize) -> Self {
        Gate::Identity { num_qubits }
    }

    /// Pauli-X.
    pub const fn x() -> Self {
        Gate::XPow(Power::exponent(1.0))
    }

    /// Pauli-Y.
    pub const fn y() -> Self {
        Gate::YPow(Power::exponent(1.0))
    }

    /// Pauli-Z.
    pub const fn z() -> Self {
        Gate::ZPow(Power::exponent(1.0))
    }

    /// Hadamard.
    pub const fn h() -> Self {
        Gate::HPow(Power::exponent(1.0))
    }

    /// S gate.
    pub const fn s() -> Self {
        Gate::ZPow(Power::exponent(0.5))
    }

    /// T gate.
    pub const fn t() -> Self {
        Gate::ZPow(Power::exponent(0.25))
    }

    /// `X^exponent`.
    pub const fn x_pow(exponent: f64) -> Self {
        Gate::XPow(Power::exponent(exponent))
    }

    /// `Y^exponent`.
    pub const fn y_pow(exponent: f64) -> Self {
        Gate::YPow(Power::exponent(exponent))
    }

    /// `Z^exponent`.
    pub const fn z_pow(exponent: f64) -> Self {
        Gate::ZPow(Power::exponent(exponent))
    }

    /// Rotation by `theta` radians about the X axis.
    pub fn rx(theta: f64) -> Self {
        Gate::XPow(Power::new(theta / PI, -0.5))
    }

    /// Rotation by `theta` radians about the Y axis.
    pub fn ry(theta: f64) -> Self {
        Gate::YPow(Power::new(theta / PI, -0.5))
    }

    /// Rotation by `theta` radians about the Z axis.
    pub fn rz(theta: f64) -> Self {
        Gate::ZPow(Power::new(theta / PI, -0.5))
    }

    /// Phased X rotation.
    pub const fn phased_x(exponent: f64, phase_exponent: f64) -> Self {
        Gate::PhasedXPow {
            phase_exponent,
            power: Power::exponent(exponent),
        }
    }

    /// Controlled-Z.
    pub const fn cz() -> Self {
        Gate::CZPow(Power::exponent(1.0))
    }

    /// `CZ^exponent`.
    pub const fn cz_pow(exponent: f64) -> Self {
        Gate::CZPow(Power::exponent(exponent))
    }

    /// CNOT.
    pub const fn cnot() -> Self {
        Gate::CXPow(Power::exponent(1.0))
    }

    /// `(Z⊗Z)^exponent`.
    pub const fn zz_pow(exponent: f64) -> Self {
        Gate::ZZPow(Power::exponent(exponent))
    }

    /// iSWAP.
    pub const fn iswap() -> Self {
        Gate::ISwapPow(Power::exponent(1.0))
    }

    /// `iSWAP^exponent`.
    pub const fn iswap_pow(exponent: f64) -> Self {
        Gate::ISwapPow(Power::exponent(exponent))
    }

    /// SWAP.
    pub const fn swap() -> Self {
        Gate::SwapPow(Power::exponent(1.0))
    }

    /// Doubly controlled Z.
    pub const fn ccz() -> Self {
        Gate::CCZPow(Power::exponent(1.0))
    }

    /// Toffoli.
    pub const fn ccx() -> Self {
        Gate::CCXPow(Power::exponent(1.0))
    }

    // =========================================================================
    // Properties
    // =========================================================================

    /// Get the type tag of this gate.
    pub fn family(&self) -> GateFamily {
        match self {
            Gate::Identity { .. } => GateFamily::Identity,
            Gate::XPow(_) => GateFamily::XPow,
            Gate::YPow(_) => GateFamily::YPow,
            Gate::ZPow(_) => GateFamily::ZPow,
            Gate::HPow(_) => GateFamily::HPow,
            Gate::PhasedXPow { .. } => GateFamily::PhasedXPow,
            Gate::PhasedXZ { .. } => GateFamily::PhasedXZ,
            Gate::CZPow(_) => GateFamily::CZPow,
            Gate::CXPow(_) => GateFamily::CXPow,
            Gate::ZZPow(_) => GateFamily::ZZPow,
            Gate::ISwapPow(_) => GateFamily::ISwapPow,
            Gate::SwapPow(_) => GateFamily::SwapPow,
            Gate::CCZPow(_) => GateFamily::CCZPow,
            Gate::CCXPow(_) => GateFamily::CCXPow,
            Gate::Move => GateFamily::Move,
        }
    }

    /// Get the name of this gate.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.family().name()
    }

    /// Get the number of qubits this gate operates on.
    pub fn num_qubits(&self) -> usize {
        match self {
            Gate::Identity { num_qubits } => *num_qubits,
            Gate::XPow(_)
            | Gate::YPow(_)
            | Gate::ZPow(_)
            | Gate::HPow(_)
            | Gate::PhasedXPow { .. }
            | Gate::PhasedXZ { .. } => 1,
            Gate::CZPow(_)
            | Gate::CXPow(_)
            | Gate::ZZPow(_)
            | Gate::ISwapPow(_)
            | Gate::SwapPow(_)
            | Gate::Move => 2,
            Gate::CCZPow(_) | Gate::CCXPow(_) => 3,
        }
    }

    /// Get the exponent and global shift of a power gate.
    pub fn power(&self) -> Option<Power> {
        match self {
            Gate::XPow(p)
            | Gate::YPow(p)
            | Gate::ZPow(p)
            | Gate::HPow(p)
            | Gate::CZPow(p)
            | Gate::CXPow(p)
            | Gate::ZZPow(p)
            | Gate::ISwapPow(p)
            | Gate::SwapPow(p)
            | Gate::CCZPow(p)
            | Gate::CCXPow(p) => Some(*p),
            Gate::PhasedXPow { power, .. } => Some(*power),
            Gate::Identity { .. } | Gate::PhasedXZ { .. } | Gate::Move => None,
        }
    }

    /// Get the exponent of a power gate.
    pub fn exponent(&self) -> Option<f64> {
        self.power().map(|p| p.exponent)
    }

    /// Replace the power of a power gate, keeping its family.
    ///
    /// Gates without a power are returned unchanged.
    #[must_use]
    pub fn with_power(self, power: Power) -> Self {
        match self {
            Gate::XPow(_) => Gate::XPow(power),
            Gate::YPow(_) => Gate::YPow(power),
            Gate::ZPow(_) => Gate::ZPow(power),
            Gate::HPow(_) => Gate::HPow(power),
            Gate::CZPow(_) => Gate::CZPow(power),
            Gate::CXPow(_) => Gate::CXPow(power),
            Gate::ZZPow(_) => Gate::ZZPow(power),
            Gate::ISwapPow(_) => Gate::ISwapPow(power),
            Gate::SwapPow(_) => Gate::SwapPow(power),
            Gate::CCZPow(_) => Gate::CCZPow(power),
            Gate::CCXPow(_) => Gate::CCXPow(power),
            Gate::PhasedXPow { phase_exponent, .. } => Gate::PhasedXPow {
                phase_exponent,
                power,
            },
            other => other,
        }
    }

    /// Check if the gate is invariant under permutation of its qubits.
    #[inline]
    pub fn is_symmetric(&self) -> bool {
        self.family().is_symmetric()
    }

    /// Check if the gate is diagonal in the computational basis.
    pub fn is_diagonal(&self) -> bool {
        matches!(
            self,
            Gate::Identity { .. }
                | Gate::ZPow(_)
                | Gate::CZPow(_)
                | Gate::ZZPow(_)
                | Gate::CCZPow(_)
        )
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gate::Identity { num_qubits } => write!(f, "id[{num_qubits}]"),
            Gate::PhasedXPow {
                phase_exponent,
                power,
            } => write!(
                f,
                "phased_x(p={phase_exponent})^{}",
                power.exponent
            ),
            Gate::PhasedXZ {
                x_exponent,
                z_exponent,
                axis_phase_exponent,
            } => write!(
                f,
                "phased_xz(x={x_exponent}, z={z_exponent}, a={axis_phase_exponent})"
            ),
            Gate::Move => f.write_str("move"),
            other => {
                let power = other.power().unwrap_or_default();
                if power.global_shift == 0.0 {
                    write!(f, "{}^{}", other.name(), power.exponent)
                } else {
                    write!(
                        f,
                        "{}^{}(shift {})",
                        other.name(),
                        power.exponent,
                        power.global_shift
                    )
                }
            }
        }
    }
}
