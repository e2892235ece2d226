//! Initial placement of logical qubits onto physical qubits.

use rustc_hash::{FxHashMap, FxHashSet};
use std::cmp::Reverse;
use tracing::debug;

use iqm_ir::{Circuit, Qubit};

use crate::error::{CompileError, CompileResult};
use crate::property::{CouplingMap, Layout};

/// Complete a partial layout for every qubit of `circuit`.
///
/// Qubits are placed in order of first use. A qubit whose interaction
/// partners are already placed goes to the free physical qubit closest to
/// them, preferring qubits with more free neighbors; otherwise it goes to
/// the free physical qubit with the most free neighbors. Remaining ties go
/// to the lowest physical qubit.
pub fn greedy_layout(
    circuit: &Circuit,
    coupling: &CouplingMap,
    partial: Option<&Layout>,
) -> CompileResult<Layout> {
    let logical = circuit.all_qubits();
    if logical.len() > coupling.num_qubits() {
        return Err(CompileError::RoutingImpossible(format!(
            "circuit acts on {} qubits but the device has {}",
            logical.len(),
            coupling.num_qubits()
        )));
    }

    let mut layout = Layout::new();
    if let Some(partial) = partial {
        for (l, p) in partial.pairs() {
            if !coupling.contains(&p) {
                return Err(CompileError::RoutingImpossible(format!(
                    "initial mapping uses {p}, which is not a device qubit"
                )));
            }
            layout.add(l, p);
        }
        if layout.len() != partial.len() {
            return Err(CompileError::RoutingImpossible(
                "initial mapping assigns a physical qubit twice".into(),
            ));
        }
    }

    let mut order: Vec<Qubit> = vec![];
    let mut seen = FxHashSet::default();
    let mut partners: FxHashMap<Qubit, Vec<Qubit>> = FxHashMap::default();
    for op in circuit.all_operations() {
        for q in &op.qubits {
            if seen.insert(q.clone()) {
                order.push(q.clone());
            }
        }
        if op.as_gate().is_some() && op.num_qubits() == 2 {
            let (a, b) = (&op.qubits[0], &op.qubits[1]);
            let entry = partners.entry(a.clone()).or_default();
            if !entry.contains(b) {
                entry.push(b.clone());
            }
            let entry = partners.entry(b.clone()).or_default();
            if !entry.contains(a) {
                entry.push(a.clone());
            }
        }
    }

    let physical = coupling.qubits();
    for l in order {
        if layout.get_physical(&l).is_some() {
            continue;
        }
        let free: Vec<&Qubit> = physical
            .iter()
            .filter(|p| layout.get_logical(p).is_none())
            .collect();
        let placed: Vec<Qubit> = partners
            .get(&l)
            .into_iter()
            .flatten()
            .filter_map(|partner| layout.get_physical(partner).cloned())
            .collect();

        let free_neighbors = |p: &Qubit| {
            coupling
                .neighbors(p)
                .iter()
                .filter(|n| layout.get_logical(n).is_none())
                .count()
        };
        let choice = if placed.is_empty() {
            // The lowest qubit wins ties: max_by_key keeps the last maximum.
            free.iter()
                .copied()
                .max_by_key(|p| (free_neighbors(p), Reverse(*p)))
        } else {
            free.iter().copied().min_by_key(|p| {
                let mut unreachable = 0usize;
                let mut total = 0u64;
                for target in &placed {
                    match coupling.distance(p, target) {
                        Some(d) => total += u64::from(d),
                        None => unreachable += 1,
                    }
                }
                (unreachable, total, Reverse(free_neighbors(p)), *p)
            })
        };

        let p = choice.cloned().ok_or_else(|| {
            CompileError::RoutingImpossible(format!("no free device qubit left for {l}"))
        })?;
        debug!("Placing {} on {}", l, p);
        layout.add(l, p);
    }

    Ok(layout)
}
