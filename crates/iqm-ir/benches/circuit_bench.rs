//! Benchmarks for IQM circuit operations
//!
//! Run with: cargo bench -p iqm-ir

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use iqm_ir::{Circuit, Gate, Qubit, default_decomposition};

/// Benchmark building circuits with earliest insertion
fn bench_circuit_creation(c: &mut Criterion) {
    let mut group = c.benchmark_group("circuit_creation");

    for num_qubits in &[2u32, 5, 10, 20, 50] {
        group.bench_with_input(BenchmarkId::new("ghz", num_qubits), num_qubits, |b, &n| {
            b.iter(|| Circuit::ghz(black_box(n)).unwrap());
        });
    }

    group.finish();
}

/// Benchmark dense unitary construction
fn bench_unitary(c: &mut Criterion) {
    let mut group = c.benchmark_group("unitary");

    for num_qubits in &[2u32, 4, 6, 8] {
        let mut circuit = Circuit::new();
        for i in 0..*num_qubits {
            circuit.h(Qubit::line(i)).unwrap();
        }
        for i in 1..*num_qubits {
            circuit.cz(Qubit::line(i - 1), Qubit::line(i)).unwrap();
        }
        group.bench_with_input(
            BenchmarkId::new("layered", num_qubits),
            &circuit,
            |b, circuit| {
                b.iter(|| black_box(circuit).unitary().unwrap());
            },
        );
    }

    group.finish();
}

/// Benchmark the generic decomposition of a Toffoli
fn bench_default_decomposition(c: &mut Criterion) {
    let mut circuit = Circuit::new();
    circuit
        .gate(Gate::ccx(), [Qubit::line(0), Qubit::line(1), Qubit::line(2)])
        .unwrap();
    let op = circuit.all_operations().next().cloned().unwrap();

    c.bench_function("decompose_ccx", |b| {
        b.iter(|| default_decomposition(black_box(&op)));
    });
}

criterion_group!(
    benches,
    bench_circuit_creation,
    bench_unitary,
    bench_default_decomposition
);
criterion_main!(benches);
