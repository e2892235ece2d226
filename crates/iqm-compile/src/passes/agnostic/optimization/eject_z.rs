//! Pushing Z rotations towards the end of the circuit.

use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use tracing::trace;

use iqm_ir::{Circuit, Gate, Moment, Operation, Power, Qubit};

use crate::error::CompileResult;
use crate::pass::{Pass, PassKind};
use crate::property::PropertySet;

use super::{EPSILON, reduce_into_period};

/// Moves `ZPow` gates as late as commutation allows.
///
/// Z rotations are collected per qubit and carried forward:
///
/// - through diagonal gates (`CZPow`, `ZZPow`, `CCZPow`, identities) unchanged
/// - across odd-integer `ISwapPow` and `SwapPow` gates to the other qubit
/// - into `PhasedXPow`, `XPow` and `YPow` gates, which absorb the rotation
///   into their axis with `Z^z · PhasedX(e, p) = PhasedX(e, p - z) · Z^z`
///
/// Any other operation stops the rotation, which is then emitted right
/// before it. Global phase is not preserved.
#[derive(Debug, Clone, Copy, Default)]
pub struct EjectZ;

/// How a gate interacts with pending Z rotations.
enum Interaction {
    /// The gate commutes with Z rotations on all its qubits.
    Commutes,
    /// The gate exchanges the Z rotations of its two qubits.
    Exchanges,
    /// The gate absorbs the rotation into its phase exponent.
    Absorbs { phase: f64, power: Power },
    /// The rotation cannot move past the gate.
    Blocks,
}

fn is_odd_integer(x: f64) -> Option<bool> {
    let rounded = x.round();
    if (x - rounded).abs() > EPSILON {
        return None;
    }
    Some(rounded.rem_euclid(2.0) == 1.0)
}

fn interaction(op: &Operation) -> Interaction {
    let Some(gate) = op.as_gate() else {
        return Interaction::Blocks;
    };
    match *gate {
        Gate::Identity { .. } | Gate::CZPow(_) | Gate::ZZPow(_) | Gate::CCZPow(_) => {
            Interaction::Commutes
        }
        Gate::ISwapPow(p) | Gate::SwapPow(p) => match is_odd_integer(p.exponent) {
            Some(true) => Interaction::Exchanges,
            Some(false) => Interaction::Commutes,
            None => Interaction::Blocks,
        },
        Gate::XPow(power) => Interaction::Absorbs { phase: 0.0, power },
        Gate::YPow(power) => Interaction::Absorbs { phase: 0.5, power },
        Gate::PhasedXPow {
            phase_exponent,
            power,
        } => Interaction::Absorbs {
            phase: phase_exponent,
            power,
        },
        _ => Interaction::Blocks,
    }
}

/// Output under construction.
struct Ejection {
    /// Pending Z exponent per qubit.
    pending: BTreeMap<Qubit, f64>,
    /// Last output moment holding an operation, per qubit.
    last_busy: FxHashMap<Qubit, usize>,
    /// Operations per original moment.
    main: Vec<Vec<Operation>>,
    /// Operations for a new moment inserted before an original one.
    before: BTreeMap<usize, Vec<Operation>>,
}

impl Ejection {
    fn pending_on(&self, qubit: &Qubit) -> f64 {
        self.pending.get(qubit).copied().unwrap_or(0.0)
    }

    fn keep(&mut self, index: usize, op: Operation) {
        for q in &op.qubits {
            self.last_busy.insert(q.clone(), index);
        }
        self.main[index].push(op);
    }

    /// Emit the pending rotation on `qubit` before moment `index`.
    ///
    /// The rotation goes into the previous moment when the qubit is idle
    /// there, otherwise into a new moment.
    fn dump(&mut self, qubit: &Qubit, index: usize) -> CompileResult<()> {
        let Some(turns) = self.pending.remove(qubit) else {
            return Ok(());
        };
        let exponent = reduce_into_period(turns, 2.0);
        if exponent.abs() <= EPSILON {
            return Ok(());
        }
        let op = Operation::gate(Gate::z_pow(exponent), [qubit.clone()])?;
        let idle_before = index > 0
            && self
                .last_busy
                .get(qubit)
                .is_none_or(|&busy| busy < index - 1);
        trace!("Emitting Z^{} on {} before moment {}", exponent, qubit, index);
        if idle_before {
            self.keep(index - 1, op);
        } else {
            self.before.entry(index).or_default().push(op);
        }
        Ok(())
    }
}

impl Pass for EjectZ {
    fn name(&self) -> &'static str {
        "EjectZ"
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    fn run(&self, circuit: Circuit, _properties: &mut PropertySet) -> CompileResult<Circuit> {
        let depth = circuit.depth();
        let mut state = Ejection {
            pending: BTreeMap::new(),
            last_busy: FxHashMap::default(),
            main: vec![vec![]; depth],
            before: BTreeMap::new(),
        };

        for (i, moment) in circuit.moments().iter().enumerate() {
            for op in moment.operations() {
                if let Some(Gate::ZPow(power)) = op.as_gate() {
                    *state.pending.entry(op.qubits[0].clone()).or_insert(0.0) += power.exponent;
                    continue;
                }
                match interaction(op) {
                    Interaction::Commutes => state.keep(i, op.clone()),
                    Interaction::Exchanges => {
                        let (a, b) = (&op.qubits[0], &op.qubits[1]);
                        let za = state.pending.remove(a);
                        let zb = state.pending.remove(b);
                        if let Some(z) = za {
                            state.pending.insert(b.clone(), z);
                        }
                        if let Some(z) = zb {
                            state.pending.insert(a.clone(), z);
                        }
                        state.keep(i, op.clone());
                    }
                    Interaction::Absorbs { phase, power } => {
                        let q = &op.qubits[0];
                        let z = reduce_into_period(state.pending_on(q), 2.0);
                        if z.abs() <= EPSILON {
                            state.keep(i, op.clone());
                        } else {
                            let gate = Gate::PhasedXPow {
                                phase_exponent: phase - z,
                                power,
                            };
                            state.keep(i, Operation::gate(gate, [q.clone()])?);
                        }
                    }
                    Interaction::Blocks => {
                        for q in &op.qubits {
                            state.dump(q, i)?;
                        }
                        state.keep(i, op.clone());
                    }
                }
            }
        }

        let remaining: Vec<Qubit> = state.pending.keys().cloned().collect();
        for q in &remaining {
            state.dump(q, depth)?;
        }

        let mut moments = Vec::with_capacity(depth + state.before.len());
        let mut main = std::mem::take(&mut state.main).into_iter();
        for i in 0..=depth {
            if let Some(ops) = state.before.remove(&i) {
                moments.push(Moment::from_operations(ops)?);
            }
            if let Some(ops) = main.next() {
                moments.push(Moment::from_operations(ops)?);
            }
        }

        Ok(Circuit::from_moments(moments))
    }
}
