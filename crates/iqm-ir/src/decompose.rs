//! Device-independent gate decompositions.
//!
//! Every rule here reproduces the unitary of the decomposed gate exactly,
//! global phase included, so the results may be used inside controlled
//! constructions.

use crate::error::IrResult;
use crate::gate::{Gate, Power};
use crate::operation::{Operation, OperationKind};
use crate::qubit::Qubit;

/// Decompose an operation into more primitive gates.
///
/// Returns `None` when no generic rule applies: for native single-qubit
/// families, for `CZPow`, `ZZPow`, `ISwapPow` and `Move`, and for anything
/// that is not a gate.
pub fn default_decomposition(op: &Operation) -> Option<Vec<Operation>> {
    let OperationKind::Gate(gate) = &op.kind else {
        return None;
    };
    decompose_gate(gate, &op.qubits).ok().flatten()
}

fn decompose_gate(gate: &Gate, qubits: &[Qubit]) -> IrResult<Option<Vec<Operation>>> {
    let on = |g: Gate, idx: &[usize]| Operation::gate(g, idx.iter().map(|&i| qubits[i].clone()));

    let ops = match *gate {
        Gate::Identity { .. } => vec![],
        Gate::HPow(p) => vec![
            on(Gate::y_pow(0.25), &[0])?,
            on(Gate::XPow(p), &[0])?,
            on(Gate::y_pow(-0.25), &[0])?,
        ],
        Gate::PhasedXZ {
            x_exponent,
            z_exponent,
            axis_phase_exponent,
        } => vec![
            on(Gate::phased_x(x_exponent, axis_phase_exponent), &[0])?,
            on(Gate::z_pow(z_exponent), &[0])?,
        ],
        Gate::CXPow(p) => vec![
            on(Gate::y_pow(-0.5), &[1])?,
            on(Gate::CZPow(p), &[0, 1])?,
            on(Gate::y_pow(0.5), &[1])?,
        ],
        Gate::SwapPow(p) => vec![
            on(Gate::cnot(), &[1, 0])?,
            on(Gate::CXPow(p), &[0, 1])?,
            on(Gate::cnot(), &[1, 0])?,
        ],
        Gate::CCZPow(p) => ccz_network(p, &on)?,
        Gate::CCXPow(p) => vec![
            on(Gate::y_pow(-0.5), &[2])?,
            on(Gate::CCZPow(p), &[0, 1, 2])?,
            on(Gate::y_pow(0.5), &[2])?,
        ],
        Gate::XPow(_)
        | Gate::YPow(_)
        | Gate::ZPow(_)
        | Gate::PhasedXPow { .. }
        | Gate::CZPow(_)
        | Gate::ZZPow(_)
        | Gate::ISwapPow(_)
        | Gate::Move => return Ok(None),
    };
    Ok(Some(ops))
}

/// Phase-polynomial network for `CCZ^t`: seven quarter-turn phases and six
/// CNOTs, with the global shift carried by the first phase.
fn ccz_network(
    p: Power,
    on: &impl Fn(Gate, &[usize]) -> IrResult<Operation>,
) -> IrResult<Vec<Operation>> {
    let t = p.exponent;
    let phase = |x: f64| Gate::z_pow(x / 4.0);
    let sweep = || -> IrResult<[Operation; 2]> {
        Ok([on(Gate::cnot(), &[0, 1])?, on(Gate::cnot(), &[1, 2])?])
    };

    let mut ops = vec![
        on(Gate::ZPow(Power::new(t / 4.0, 4.0 * p.global_shift)), &[0])?,
        on(phase(t), &[1])?,
        on(phase(t), &[2])?,
    ];
    ops.extend(sweep()?);
    ops.push(on(phase(-t), &[1])?);
    ops.push(on(phase(t), &[2])?);
    ops.extend(sweep()?);
    ops.push(on(phase(-t), &[2])?);
    ops.extend(sweep()?);
    ops.push(on(phase(-t), &[2])?);
    ops.extend(sweep()?);
    Ok(ops)
}
