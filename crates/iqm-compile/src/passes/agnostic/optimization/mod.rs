//! Optimization passes.
//!
//! Every pass is a pure function from circuit to circuit. They are meant
//! to be repeated until the circuit stops changing, see
//! [`simplify_circuit`](crate::simplify::simplify_circuit).

mod drop;
mod eject_z;
mod merge_1q;
mod merge_gates;


pub use drop::{DropEmptyMoments, DropRzBeforeMeasurement};
pub use eject_z::EjectZ;
pub use merge_1q::MergeSingleQubitGates;
pub use merge_gates::MergeOneParameterGates;

/// Tolerance for angle comparisons.
pub(super) const EPSILON: f64 = 1e-10;

/// Reduce an exponent into `(-period/2, period/2]`.
///
/// Values already in range are returned unchanged, so repeated reduction
/// is exact.
pub(crate) fn reduce_into_period(exponent: f64, period: f64) -> f64 {
    let half = period / 2.0;
    if exponent > -half && exponent <= half {
        return exponent;
    }
    let shifted = exponent - half;
    shifted - (-period) * (shifted / -period).floor() + half
}
