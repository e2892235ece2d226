//! Shared helpers: measurement statistics computed from the dense unitary.

#![allow(dead_code)]

use iqm_ir::{Circuit, Operation, Qubit};

/// Outcome probabilities over all measured qubits.
///
/// Measurements are ordered by key, qubits within a measurement in operand
/// order; outcome `i` has its most significant bit on the first measured
/// qubit. The circuit starts in |0…0⟩.
pub fn measurement_probabilities(circuit: &Circuit) -> Vec<f64> {
    let qubits = circuit.all_qubits();
    let mut measurements: Vec<&Operation> =
        circuit.all_operations().filter(|op| op.is_measurement()).collect();
    measurements.sort_by_key(|op| op.measurement_key().map(str::to_string));
    let measured: Vec<usize> = measurements
        .iter()
        .flat_map(|op| op.qubits.iter())
        .map(|q| position(&qubits, q))
        .collect();

    let gates = Circuit::from_operations(
        circuit
            .all_operations()
            .filter(|op| !op.is_measurement())
            .cloned(),
    )
    .unwrap();
    let u = gates.unitary_on(&qubits).unwrap();

    let n = qubits.len();
    let m = measured.len();
    let mut probabilities = vec![0.0; 1 << m];
    for (i, amplitude) in u.column(0).iter().enumerate() {
        let mut outcome = 0;
        for &k in &measured {
            outcome = (outcome << 1) | ((i >> (n - 1 - k)) & 1);
        }
        probabilities[outcome] += amplitude.norm_sqr();
    }
    probabilities
}

fn position(qubits: &[Qubit], q: &Qubit) -> usize {
    qubits.iter().position(|x| x == q).unwrap()
}

/// Assert that two circuits produce the same measurement statistics.
pub fn assert_same_statistics(expected: &Circuit, actual: &Circuit) {
    let p = measurement_probabilities(expected);
    let q = measurement_probabilities(actual);
    assert_eq!(p.len(), q.len(), "different number of measured qubits");
    for (i, (a, b)) in p.iter().zip(&q).enumerate() {
        assert!(
            (a - b).abs() < 1e-6,
            "outcome {i:b}: expected probability {a}, got {b}"
        );
    }
}
