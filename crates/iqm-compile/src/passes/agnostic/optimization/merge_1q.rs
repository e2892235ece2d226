//! Single-qubit gate merging.

use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::BTreeMap;
use tracing::trace;

use iqm_ir::{Circuit, Gate, Moment, Operation, Qubit, Unitary2x2};

use crate::error::CompileResult;
use crate::pass::{Pass, PassKind};
use crate::property::PropertySet;

use super::EPSILON;

/// Single-qubit gate merging pass.
///
/// Multiplies every run of consecutive single-qubit gates on a qubit into
/// one unitary and rewrites it as at most a `PhasedXPow` followed by a
/// `ZPow`. Runs that already have that shape are left untouched, so the
/// pass reaches a fixed point.
#[derive(Debug, Clone, Copy, Default)]
pub struct MergeSingleQubitGates;

/// Rewrites collected while scanning the circuit.
#[derive(Default)]
struct Rewrites {
    /// `(moment, qubit)` of removed operations.
    removed: FxHashSet<(usize, Qubit)>,
    /// Replacement operations per original moment.
    placed: FxHashMap<usize, Vec<Operation>>,
    /// Operations for a new moment right after an original one.
    extra: BTreeMap<usize, Vec<Operation>>,
}

impl Rewrites {
    fn flush(&mut self, qubit: &Qubit, run: &[(usize, Gate)]) -> CompileResult<()> {
        if run.is_empty() {
            return Ok(());
        }
        let mut unitary = Unitary2x2::identity();
        for (_, gate) in run {
            if let Some(u) = Unitary2x2::from_gate(gate) {
                unitary = u.mul(&unitary);
            }
        }
        let replacement = unitary.to_phased_x_and_z(EPSILON);

        let canonical = replacement.len() == run.len()
            && replacement
                .iter()
                .zip(run)
                .all(|(new, (_, old))| new.family() == old.family());
        if canonical {
            return Ok(());
        }

        trace!(
            "Merging {} single-qubit gates on {} into {}",
            run.len(),
            qubit,
            replacement.len()
        );
        for (i, _) in run {
            self.removed.insert((*i, qubit.clone()));
        }
        for (k, gate) in replacement.into_iter().enumerate() {
            let op = Operation::gate(gate, [qubit.clone()])?;
            match run.get(k) {
                Some((i, _)) => self.placed.entry(*i).or_default().push(op),
                None => {
                    let last = run.last().map_or(0, |(i, _)| *i);
                    self.extra.entry(last).or_default().push(op);
                }
            }
        }
        Ok(())
    }
}

impl Pass for MergeSingleQubitGates {
    fn name(&self) -> &'static str {
        "MergeSingleQubitGates"
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    fn run(&self, circuit: Circuit, _properties: &mut PropertySet) -> CompileResult<Circuit> {
        let mut rewrites = Rewrites::default();
        let mut runs: BTreeMap<Qubit, Vec<(usize, Gate)>> = BTreeMap::new();

        for (i, moment) in circuit.moments().iter().enumerate() {
            for op in moment.operations() {
                match op.as_gate() {
                    Some(gate) if gate.num_qubits() == 1 => {
                        runs.entry(op.qubits[0].clone())
                            .or_default()
                            .push((i, *gate));
                    }
                    _ => {
                        for q in &op.qubits {
                            if let Some(run) = runs.remove(q) {
                                rewrites.flush(q, &run)?;
                            }
                        }
                    }
                }
            }
        }
        for (q, run) in &runs {
            rewrites.flush(q, run)?;
        }

        let mut moments = Vec::with_capacity(circuit.depth());
        for (i, moment) in circuit.moments().iter().enumerate() {
            let mut ops: Vec<Operation> = moment
                .operations()
                .iter()
                .filter(|op| {
                    op.num_qubits() != 1 || !rewrites.removed.contains(&(i, op.qubits[0].clone()))
                })
                .cloned()
                .collect();
            if let Some(placed) = rewrites.placed.remove(&i) {
                ops.extend(placed);
            }
            moments.push(Moment::from_operations(ops)?);
            if let Some(extra) = rewrites.extra.remove(&i) {
                moments.push(Moment::from_operations(extra)?);
            }
        }

        Ok(Circuit::from_moments(moments))
    }
}
