//! Routing: inserting SWAP gates to satisfy connectivity constraints.

use std::collections::BTreeMap;
use tracing::{debug, trace};

use iqm_ir::{Circuit, Gate, Moment, Operation, OperationKind, Qubit};

use crate::error::{CompileError, CompileResult};
use crate::passes::target::layout::greedy_layout;
use crate::property::{CouplingMap, Layout};

/// Result of routing a circuit onto a device.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutingOutcome {
    /// The routed circuit, acting on physical qubits.
    pub circuit: Circuit,
    /// Where each logical qubit starts.
    pub initial_mapping: Layout,
    /// Where the state initially on each physical qubit ends up.
    pub final_mapping: BTreeMap<Qubit, Qubit>,
}

impl RoutingOutcome {
    /// Physical qubit holding `logical` at the end of the circuit.
    pub fn final_physical(&self, logical: &Qubit) -> Option<&Qubit> {
        let start = self.initial_mapping.get_physical(logical)?;
        self.final_mapping.get(start)
    }
}

/// A qubit router.
pub trait Router: Send + Sync {
    /// Get the name of this router.
    fn name(&self) -> &str;

    /// Place `circuit` on `coupling`, completing the optional partial
    /// `initial` layout, and make every two-qubit gate act on an edge.
    fn route(
        &self,
        circuit: &Circuit,
        coupling: &CouplingMap,
        initial: Option<&Layout>,
    ) -> CompileResult<RoutingOutcome>;
}

/// Greedy router.
///
/// Places qubits with [`greedy_layout`], then walks the circuit in order.
/// For each two-qubit gate on non-adjacent qubits it inserts SWAP gates
/// along a shortest path, moving the first operand next to the second.
/// This is a simple algorithm that may not produce optimal results but is
/// fast and correct.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyRouter;

impl Router for GreedyRouter {
    fn name(&self) -> &str {
        "GreedyRouter"
    }

    fn route(
        &self,
        circuit: &Circuit,
        coupling: &CouplingMap,
        initial: Option<&Layout>,
    ) -> CompileResult<RoutingOutcome> {
        let initial_mapping = greedy_layout(circuit, coupling, initial)?;
        let mut layout = initial_mapping.clone();
        let mut routed = Circuit::new();
        let mut swaps = 0usize;

        for op in circuit.all_operations() {
            if op.as_gate().is_some() && op.num_qubits() > 2 {
                return Err(CompileError::RoutingImpossible(format!(
                    "cannot route {op}: gates on more than two qubits must be decomposed first"
                )));
            }

            if op.as_gate().is_some() && op.num_qubits() == 2 {
                let p0 = physical(&layout, &op.qubits[0])?;
                let p1 = physical(&layout, &op.qubits[1])?;
                if !coupling.is_connected(&p0, &p1) {
                    let path = coupling.shortest_path(&p0, &p1).ok_or_else(|| {
                        CompileError::RoutingImpossible(format!(
                            "no path between {p0} and {p1} for {op}"
                        ))
                    })?;
                    // Swap along the path, except the last edge which is the gate
                    for pair in path[..path.len() - 1].windows(2) {
                        trace!("Inserting SWAP on {} and {}", pair[0], pair[1]);
                        routed.push(Operation::gate(
                            Gate::swap(),
                            [pair[0].clone(), pair[1].clone()],
                        )?)?;
                        layout.swap(&pair[0], &pair[1]);
                        swaps += 1;
                    }
                }
            }

            let qubits = op
                .qubits
                .iter()
                .map(|q| physical(&layout, q))
                .collect::<CompileResult<Vec<_>>>()?;
            routed.push(op.with_qubits(qubits)?)?;
        }

        let mut final_mapping = BTreeMap::new();
        for (logical, start) in initial_mapping.pairs() {
            final_mapping.insert(start, physical(&layout, &logical)?);
        }

        debug!(
            "Routed {} operations with {} SWAPs, depth {} -> {}",
            circuit.num_operations(),
            swaps,
            circuit.depth(),
            routed.depth()
        );

        Ok(RoutingOutcome {
            circuit: routed,
            initial_mapping,
            final_mapping,
        })
    }
}

fn physical(layout: &Layout, logical: &Qubit) -> CompileResult<Qubit> {
    layout
        .get_physical(logical)
        .cloned()
        .ok_or_else(|| CompileError::RoutingImpossible(format!("{logical} has no physical qubit")))
}

// =============================================================================
// Measurement-preserving routing
// =============================================================================

/// Find a qubit acted on after being measured.
pub fn find_non_terminal_measurement(circuit: &Circuit) -> Option<Qubit> {
    for (i, moment) in circuit.moments().iter().enumerate() {
        for op in moment.operations().iter().filter(|op| op.is_measurement()) {
            if let Some(q) = op
                .qubits
                .iter()
                .find(|q| circuit.next_operation_on(q, i + 1).is_some())
            {
                return Some(q.clone());
            }
        }
    }
    None
}

/// Route a circuit whose measurements are all terminal.
///
/// Measurements are taken out before routing and each measured qubit gets
/// a single-qubit identity placeholder at the end, so that the router sees
/// only one- and two-qubit gates but still places every measured qubit.
/// After routing the placeholders are removed again and the measurements
/// come back in one final moment, on the physical qubit now holding each
/// measured state and with their original keys.
pub fn route_preserving_measurements(
    router: &dyn Router,
    circuit: &Circuit,
    coupling: &CouplingMap,
    initial: Option<&Layout>,
) -> CompileResult<RoutingOutcome> {
    if let Some(qubit) = find_non_terminal_measurement(circuit) {
        return Err(CompileError::NonTerminalMeasurement { qubit });
    }

    let mut measurements: Vec<Operation> = vec![];
    let mut placeholders: Vec<Qubit> = vec![];
    let mut moments = vec![];
    for moment in circuit.moments() {
        for op in moment.operations().iter().filter(|op| op.is_measurement()) {
            for q in &op.qubits {
                if !placeholders.contains(q) {
                    placeholders.push(q.clone());
                }
            }
            measurements.push(op.clone());
        }
        moments.push(moment.filtered(|op| !op.is_measurement()));
    }
    // Placeholders go into a moment of their own at the very end, so the
    // router handles them after every SWAP and each one lands on the wire
    // holding its qubit's final state.
    let mut working = Circuit::from_moments(moments);
    if !placeholders.is_empty() {
        let ids = placeholders
            .iter()
            .map(|q| Operation::gate(Gate::identity(1), [q.clone()]))
            .collect::<Result<Vec<_>, _>>()?;
        working.push_moment(Moment::from_operations(ids)?);
    }

    let outcome = router.route(&working, coupling, initial)?;
    let RoutingOutcome {
        circuit: routed,
        initial_mapping,
        final_mapping,
    } = outcome;

    let resolve = |logical: &Qubit| -> CompileResult<Qubit> {
        initial_mapping
            .get_physical(logical)
            .and_then(|p| final_mapping.get(p))
            .cloned()
            .ok_or_else(|| {
                CompileError::RoutingImpossible(format!("{logical} was not placed by the router"))
            })
    };

    let mut moments = routed.into_moments();
    for logical in &placeholders {
        let p = resolve(logical)?;
        let last = moments.iter().rposition(|m| m.operates_on(&p));
        let is_placeholder = last
            .and_then(|i| moments[i].operation_at(&p))
            .is_some_and(|op| {
                matches!(op.kind, OperationKind::Gate(Gate::Identity { num_qubits: 1 }))
            });
        match last {
            Some(i) if is_placeholder => {
                moments[i] = moments[i].filtered(|op| !op.acts_on(&p));
            }
            _ => {
                return Err(CompileError::RoutingImpossible(format!(
                    "router {} did not keep the placeholder of {logical} last on {p}",
                    router.name()
                )));
            }
        }
    }

    let mut routed = Circuit::from_moments(moments).without_empty_moments();
    if !measurements.is_empty() {
        let remapped = measurements
            .iter()
            .map(|op| {
                let qubits = op
                    .qubits
                    .iter()
                    .map(&resolve)
                    .collect::<CompileResult<Vec<_>>>()?;
                Ok(op.with_qubits(qubits)?)
            })
            .collect::<CompileResult<Vec<_>>>()?;
        routed.push_moment(Moment::from_operations(remapped)?);
    }

    Ok(RoutingOutcome {
        circuit: routed,
        initial_mapping,
        final_mapping,
    })
}
