//! MOVE insertion and validation for devices with computational resonators.
//!
//! On such devices two qubits interact through a shared resonator: the state
//! of one qubit is moved into the resonator, the other qubit interacts with
//! the resonator, and the state is moved back.

use std::collections::BTreeMap;
use tracing::trace;

use iqm_ir::{Circuit, Gate, GateFamily, Operation, Qubit};

use crate::error::{DeviceError, DeviceResult};
use crate::metadata::DeviceMetadata;

/// Rewrite every CZ between qubits coupled only through a resonator.
///
/// `CZ(a, b)` becomes `MOVE(b, r), CZ(a, r), MOVE(b, r)` for the first
/// resonator `r` on which `b` may be moved and `a` may interact, trying
/// both operand orders. CZs on a direct coupling are kept.
pub fn insert_moves(circuit: &Circuit, metadata: &DeviceMetadata) -> DeviceResult<Circuit> {
    if !metadata.has_resonators() {
        return Ok(circuit.clone());
    }
    let mut out = Circuit::new();
    for op in circuit.all_operations() {
        match resonator_sequence(op, metadata)? {
            Some(sequence) => {
                trace!("Routing {} through a resonator", op);
                for part in sequence {
                    out.push(part)?;
                }
            }
            None => {
                out.push(op.clone())?;
            }
        }
    }
    Ok(out)
}

fn resonator_sequence(
    op: &Operation,
    metadata: &DeviceMetadata,
) -> DeviceResult<Option<Vec<Operation>>> {
    let Some(gate @ Gate::CZPow(_)) = op.as_gate() else {
        return Ok(None);
    };
    let [a, b] = op.qubits.as_slice() else {
        return Ok(None);
    };
    if a.is_resonator()
        || b.is_resonator()
        || metadata.supports_locus(GateFamily::CZPow, &op.qubits)
    {
        return Ok(None);
    }

    for r in metadata.resonators() {
        for (stay, moved) in [(a, b), (b, a)] {
            let can_move = metadata.supports_locus(GateFamily::Move, &[moved.clone(), r.clone()]);
            let can_interact =
                metadata.supports_locus(GateFamily::CZPow, &[stay.clone(), r.clone()]);
            if can_move && can_interact {
                let mv = Operation::gate(Gate::Move, [moved.clone(), r.clone()])?;
                let cz = Operation::gate(*gate, [stay.clone(), r.clone()])?;
                return Ok(Some(vec![mv.clone(), cz, mv]));
            }
        }
    }
    Err(DeviceError::UnsupportedConnectivity(format!(
        "{op} has no direct coupling and no shared resonator"
    )))
}

/// Check that a MOVE acts from a device qubit into a resonator.
///
/// Other operations are accepted.
pub fn validate_move(op: &Operation, metadata: &DeviceMetadata) -> DeviceResult<()> {
    if op.family() != Some(GateFamily::Move) {
        return Ok(());
    }
    let [qubit, resonator] = op.qubits.as_slice() else {
        return Err(DeviceError::InvalidMove(format!("{op} must act on two components")));
    };
    if qubit.is_resonator() || !metadata.contains(qubit) {
        return Err(DeviceError::InvalidMove(format!(
            "MOVE is only supported with a qubit register as the first argument, but got {qubit}"
        )));
    }
    if !resonator.is_resonator() || !metadata.contains(resonator) {
        return Err(DeviceError::InvalidMove(format!(
            "MOVE is only supported with a resonator register as the second argument, \
             but got {resonator}"
        )));
    }
    Ok(())
}

/// Check every MOVE of a circuit.
///
/// MOVEs on a resonator come in pairs that take a state out and bring the
/// same state back; a circuit may not end with a state left in a resonator.
pub fn validate_moves(circuit: &Circuit, metadata: &DeviceMetadata) -> DeviceResult<()> {
    let mut moves: BTreeMap<&Qubit, Vec<&Qubit>> = BTreeMap::new();
    for op in circuit.all_operations() {
        if op.family() == Some(GateFamily::Move) {
            validate_move(op, metadata)?;
            moves.entry(&op.qubits[1]).or_default().push(&op.qubits[0]);
        }
    }
    for (resonator, qubits) in moves {
        for pair in qubits.chunks(2) {
            match pair {
                [first, second] if first != second => {
                    return Err(DeviceError::InvalidMove(format!(
                        "MOVE({second}, {resonator}) is applied between two logical qubit states"
                    )));
                }
                [_] => return Err(DeviceError::ResonatorNotEmpty(resonator.clone())),
                _ => {}
            }
        }
    }
    Ok(())
}
