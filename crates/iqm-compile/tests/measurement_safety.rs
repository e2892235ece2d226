//! Integration tests for measurement safety across routing and simplification.
//!
//! These tests verify that no pass moves gates across a measurement, drops
//! a measurement, or changes its key. Mid-circuit measurements are left in
//! place by the optimizer; routing only accepts terminal measurements.

use iqm_compile::passes::{EjectZ, MergeOneParameterGates, MergeSingleQubitGates};
use iqm_compile::{
    CompileError, CouplingMap, GreedyRouter, Pass, PropertySet, SimplifyOptions,
    route_preserving_measurements, simplify_circuit,
};
use iqm_ir::{Circuit, Gate, GateFamily, Operation, Qubit};

fn q(i: u32) -> Qubit {
    Qubit::line(i)
}

/// Helper: operation names on one qubit, in moment order.
fn ops_on_qubit(circuit: &Circuit, qubit: &Qubit) -> Vec<String> {
    circuit
        .all_operations()
        .filter(|op| op.acts_on(qubit))
        .map(|op| op.name().to_string())
        .collect()
}

/// Helper: count measurements.
fn count_measurements(circuit: &Circuit) -> usize {
    circuit
        .all_operations()
        .filter(|op| op.is_measurement())
        .count()
}

// ============================================================================
// Mid-circuit measurements block the optimizer
// ============================================================================

#[test]
fn test_h_measure_h_not_optimized() {
    let mut circuit = Circuit::new();
    circuit
        .h(q(0))
        .unwrap()
        .measure("mid", [q(0)])
        .unwrap()
        .h(q(0))
        .unwrap();

    let out = MergeSingleQubitGates
        .run(circuit, &mut PropertySet::new())
        .unwrap();
    let names = ops_on_qubit(&out, &q(0));
    let position = names.iter().position(|n| n == "measure").unwrap();
    assert!(position > 0, "gates before the measurement were removed");
    assert!(position < names.len() - 1, "gates after the measurement were removed");
    assert_eq!(count_measurements(&out), 1);
}

#[test]
fn test_cz_merge_blocked_by_measurement() {
    let mut circuit = Circuit::new();
    circuit
        .cz(q(0), q(1))
        .unwrap()
        .measure("mid", [q(0)])
        .unwrap()
        .cz(q(0), q(1))
        .unwrap();

    let out = MergeOneParameterGates::new()
        .run(circuit.clone(), &mut PropertySet::new())
        .unwrap();
    assert_eq!(out, circuit);
}

#[test]
fn test_z_not_ejected_past_measurement() {
    let mut circuit = Circuit::new();
    circuit
        .gate(Gate::z_pow(0.3), [q(0)])
        .unwrap()
        .measure("mid", [q(0)])
        .unwrap()
        .gate(Gate::x_pow(0.5), [q(0)])
        .unwrap();

    let out = EjectZ.run(circuit, &mut PropertySet::new()).unwrap();
    let names = ops_on_qubit(&out, &q(0));
    assert_eq!(names, vec!["z", "measure", "x"]);
}

#[test]
fn test_simplify_keeps_mid_circuit_measurement() {
    let mut circuit = Circuit::new();
    circuit
        .gate(Gate::x_pow(0.5), [q(0)])
        .unwrap()
        .measure("first", [q(0)])
        .unwrap()
        .gate(Gate::x_pow(0.5), [q(0)])
        .unwrap()
        .measure("second", [q(0)])
        .unwrap();

    let out = simplify_circuit(circuit, SimplifyOptions::default()).unwrap();
    assert_eq!(count_measurements(&out), 2);
    assert_eq!(out.measurement_keys(), vec!["first", "second"]);
    let names = ops_on_qubit(&out, &q(0));
    assert_eq!(names.len(), 4);
    assert_eq!(names[1], "measure");
    assert_eq!(names[3], "measure");
}

// ============================================================================
// Routing keeps measurements terminal and keyed
// ============================================================================

#[test]
fn test_routing_preserves_keys_and_terminality() {
    let mut circuit = Circuit::new();
    circuit
        .h(q(0))
        .unwrap()
        .cz(q(0), q(1))
        .unwrap()
        .cz(q(2), q(3))
        .unwrap()
        .cz(q(1), q(3))
        .unwrap()
        .cz(q(0), q(2))
        .unwrap()
        .measure("a", [q(0)])
        .unwrap()
        .measure("b", [q(1), q(2)])
        .unwrap()
        .measure("c", [q(3)])
        .unwrap();
    let coupling = CouplingMap::linear(5);

    let outcome = route_preserving_measurements(&GreedyRouter, &circuit, &coupling, None).unwrap();
    let routed = &outcome.circuit;

    let mut keys = routed.measurement_keys();
    keys.sort_unstable();
    assert_eq!(keys, vec!["a", "b", "c"]);
    assert!(routed.are_all_measurements_terminal());
    assert!(routed.all_qubits().iter().all(|p| coupling.contains(p)));
    for op in routed.all_operations() {
        if op.as_gate().is_some() && op.num_qubits() == 2 {
            assert!(coupling.is_connected(&op.qubits[0], &op.qubits[1]));
        }
    }

    let b: &Operation = routed
        .all_operations()
        .find(|op| op.measurement_key() == Some("b"))
        .unwrap();
    assert_eq!(b.num_qubits(), 2);
    assert_eq!(&b.qubits[0], outcome.final_physical(&q(1)).unwrap());
    assert_eq!(&b.qubits[1], outcome.final_physical(&q(2)).unwrap());
}

#[test]
fn test_routing_never_exceeds_device() {
    for n in 1..=5 {
        let circuit = Circuit::ghz(n).unwrap();
        let outcome =
            route_preserving_measurements(&GreedyRouter, &circuit, &CouplingMap::star(5), None)
                .unwrap();
        assert!(outcome.circuit.all_qubits().len() <= 5);
        assert_eq!(outcome.initial_mapping.len(), n as usize);
    }

    let circuit = Circuit::ghz(6).unwrap();
    let coupling = CouplingMap::star(5);
    let result = route_preserving_measurements(&GreedyRouter, &circuit, &coupling, None);
    assert!(matches!(result, Err(CompileError::RoutingImpossible(_))));
}

#[test]
fn test_routing_rejects_mid_circuit_measurement() {
    let mut circuit = Circuit::new();
    circuit
        .measure("mid", [q(0)])
        .unwrap()
        .cz(q(0), q(1))
        .unwrap();
    let result =
        route_preserving_measurements(&GreedyRouter, &circuit, &CouplingMap::star(5), None);
    assert!(matches!(
        result,
        Err(CompileError::NonTerminalMeasurement { .. })
    ));
}

#[test]
fn test_swaps_inserted_for_distant_pair() {
    let mut circuit = Circuit::new();
    circuit
        .cz(q(0), q(1))
        .unwrap()
        .measure("m", [q(0), q(1)])
        .unwrap();
    let coupling = CouplingMap::linear(5);
    let initial = iqm_compile::Layout::from_pairs([
        (q(0), Qubit::device(1)),
        (q(1), Qubit::device(5)),
    ]);

    let outcome =
        route_preserving_measurements(&GreedyRouter, &circuit, &coupling, Some(&initial)).unwrap();
    let swaps = outcome
        .circuit
        .all_operations()
        .filter(|op| op.family() == Some(GateFamily::SwapPow))
        .count();
    assert_eq!(swaps, 3);
    let m = outcome
        .circuit
        .all_operations()
        .find(|op| op.is_measurement())
        .unwrap();
    assert_eq!(m.qubits, vec![Qubit::device(4), Qubit::device(5)]);
}
