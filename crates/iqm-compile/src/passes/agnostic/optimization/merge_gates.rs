//! Merging of consecutive two-qubit gates of the same family.

use rustc_hash::FxHashSet;
use std::collections::BTreeMap;
use tracing::trace;

use iqm_ir::{Circuit, Gate, GateFamily, Moment, Operation, Power, Qubit};

use crate::error::CompileResult;
use crate::pass::{Pass, PassKind};
use crate::property::PropertySet;

use super::{EPSILON, reduce_into_period};

/// Merges runs of two-qubit gates of one family acting on the same qubits.
///
/// Exponents are added and reduced into `(-period/2, period/2]` using the
/// period declared for the family. A run whose merged exponent reduces to
/// zero disappears. Only gates with equal global shifts are merged; for
/// qubit-exchange symmetric families the qubit order does not matter.
pub struct MergeOneParameterGates {
    periods: BTreeMap<GateFamily, f64>,
}

impl MergeOneParameterGates {
    /// Create the pass for `ISwapPow` (period 4), `ZZPow` and `CZPow` (period 2).
    pub fn new() -> Self {
        Self {
            periods: BTreeMap::from([
                (GateFamily::ISwapPow, 4.0),
                (GateFamily::ZZPow, 2.0),
                (GateFamily::CZPow, 2.0),
            ]),
        }
    }

    /// Merge gates of `family` too, with exponent period `period`.
    #[must_use]
    pub fn with_family_period(mut self, family: GateFamily, period: f64) -> Self {
        self.periods.insert(family, period);
        self
    }

    /// Period used for a family, if the family is merged.
    pub fn period(&self, family: GateFamily) -> Option<f64> {
        self.periods.get(&family).copied()
    }

    fn mergeable(&self, op: &Operation) -> Option<(Gate, Power, f64)> {
        let gate = *op.as_gate()?;
        if gate.num_qubits() != 2 {
            return None;
        }
        let period = self.period(gate.family())?;
        Some((gate, gate.power()?, period))
    }
}

impl Default for MergeOneParameterGates {
    fn default() -> Self {
        Self::new()
    }
}

fn same_target(gate: &Gate, a: &[Qubit], b: &[Qubit]) -> bool {
    if gate.is_symmetric() {
        a.len() == b.len() && a.iter().all(|q| b.contains(q))
    } else {
        a == b
    }
}

impl Pass for MergeOneParameterGates {
    fn name(&self) -> &'static str {
        "MergeOneParameterGates"
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    fn run(&self, circuit: Circuit, _properties: &mut PropertySet) -> CompileResult<Circuit> {
        let mut consumed: FxHashSet<(usize, Qubit)> = FxHashSet::default();
        let mut moments = Vec::with_capacity(circuit.depth());

        for (i, moment) in circuit.moments().iter().enumerate() {
            let mut ops = vec![];
            for op in moment.operations() {
                if op
                    .qubits
                    .first()
                    .is_some_and(|q| consumed.contains(&(i, q.clone())))
                {
                    continue;
                }
                let Some((gate, power, period)) = self.mergeable(op) else {
                    ops.push(op.clone());
                    continue;
                };

                let chain = circuit.find_operations_until_blocked(i + 1, &op.qubits, |other| {
                    !other.as_gate().is_some_and(|g| {
                        g.family() == gate.family()
                            && g.power().is_some_and(|p| p.global_shift == power.global_shift)
                            && same_target(&gate, &op.qubits, &other.qubits)
                    })
                });
                if chain.is_empty() {
                    ops.push(op.clone());
                    continue;
                }

                let mut exponent = power.exponent;
                for (j, other) in &chain {
                    exponent += other.as_gate().and_then(Gate::exponent).unwrap_or(0.0);
                    consumed.insert((*j, other.qubits[0].clone()));
                }
                let exponent = reduce_into_period(exponent, period);
                trace!(
                    "Merged {} {} gates on {:?} into exponent {}",
                    chain.len() + 1,
                    gate.name(),
                    op.qubits,
                    exponent
                );
                if exponent.abs() > EPSILON {
                    let merged = gate.with_power(Power::new(exponent, power.global_shift));
                    ops.push(Operation::gate(merged, op.qubits.clone())?);
                }
            }
            moments.push(Moment::from_operations(ops)?);
        }

        Ok(Circuit::from_moments(moments))
    }
}
