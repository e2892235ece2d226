//! Passes that remove operations without observable effect.

use tracing::trace;

use iqm_ir::{Circuit, GateFamily, Qubit};

use crate::error::CompileResult;
use crate::pass::{Pass, PassKind};
use crate::property::PropertySet;

/// Removes moments without operations.
#[derive(Debug, Clone, Copy, Default)]
pub struct DropEmptyMoments;

impl Pass for DropEmptyMoments {
    fn name(&self) -> &'static str {
        "DropEmptyMoments"
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    fn run(&self, circuit: Circuit, _properties: &mut PropertySet) -> CompileResult<Circuit> {
        Ok(circuit.without_empty_moments())
    }
}

/// Removes Z rotations whose next non-Z operation is a measurement.
///
/// A Z rotation before a computational-basis measurement does not change
/// the outcome statistics, and neither does a chain of them. With
/// `drop_final` set, rotations that only Z rotations follow are removed as
/// well; this changes the final state vector, so it is opt-in.
#[derive(Debug, Clone, Copy, Default)]
pub struct DropRzBeforeMeasurement {
    drop_final: bool,
}

impl DropRzBeforeMeasurement {
    /// Create the pass.
    pub fn new(drop_final: bool) -> Self {
        Self { drop_final }
    }
}

impl Pass for DropRzBeforeMeasurement {
    fn name(&self) -> &'static str {
        "DropRzBeforeMeasurement"
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    fn run(&self, circuit: Circuit, _properties: &mut PropertySet) -> CompileResult<Circuit> {
        let moments = circuit
            .moments()
            .iter()
            .enumerate()
            .map(|(i, moment)| {
                moment.filtered(|op| {
                    if op.family() != Some(GateFamily::ZPow) {
                        return true;
                    }
                    let droppable = op
                        .qubits
                        .first()
                        .is_some_and(|qubit| self.is_removable(&circuit, qubit, i + 1));
                    if droppable {
                        trace!("Dropping {} at moment {}", op, i);
                    }
                    !droppable
                })
            })
            .collect::<Vec<_>>();
        Ok(Circuit::from_moments(moments))
    }
}

impl DropRzBeforeMeasurement {
    /// Whether the Z rotations on `qubit` from moment `start` on are
    /// followed by a measurement, or by nothing when dropping final ones.
    fn is_removable(&self, circuit: &Circuit, qubit: &Qubit, start: usize) -> bool {
        let mut from = start;
        loop {
            match circuit.next_operation_on(qubit, from) {
                Some((index, next)) if next.family() == Some(GateFamily::ZPow) => from = index + 1,
                Some((_, next)) => return next.is_measurement(),
                None => return self.drop_final,
            }
        }
    }
}
