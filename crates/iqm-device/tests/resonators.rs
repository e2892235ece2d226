//! Integration tests for devices whose qubits interact through a
//! computational resonator, and for the wire format.

mod common;

use common::assert_same_statistics;
use iqm_device::{
    ArchitectureDescriptor, Device, DeviceError, DeviceMetadata, TranspileOptions,
    deserialize_circuit, serialize_circuit,
};
use iqm_ir::{Circuit, Gate, GateFamily, Operation, Qubit};

const STAR: &str = r#"{
    "calibration_set_id": "b0c9a4b2-7f3e-4b43-9a9e-0a2b1c3d4e5f",
    "qubits": ["QB1", "QB2", "QB3", "QB4"],
    "computational_resonators": ["COMP_R"],
    "gates": {
        "prx": {"loci": [["QB1"], ["QB2"], ["QB3"], ["QB4"]]},
        "cz": {"loci": [
            ["QB1", "COMP_R"], ["QB2", "COMP_R"], ["QB3", "COMP_R"], ["QB4", "COMP_R"]
        ]},
        "move": {"loci": [["QB1", "COMP_R"], ["QB2", "COMP_R"], ["QB3", "COMP_R"]]},
        "measure": {"loci": [["QB1"], ["QB2"], ["QB3"], ["QB4"]]},
        "cc_prx": {"loci": [["QB1"]]}
    }
}"#;

fn star() -> Device {
    let arch = ArchitectureDescriptor::from_json(STAR).unwrap();
    Device::from_architecture("Star", &arch).unwrap()
}

fn qb(i: u32) -> Qubit {
    Qubit::device(i)
}

fn resonator() -> Qubit {
    Qubit::resonator("COMP_R")
}

fn count(circuit: &Circuit, name: &str) -> usize {
    circuit
        .all_operations()
        .filter(|op| op.name() == name)
        .count()
}

#[test]
fn test_architecture_loaded() {
    let device = star();
    assert_eq!(device.qubits().len(), 4);
    assert_eq!(device.resonators(), &[resonator()]);
    assert_eq!(
        device.metadata().calibration_set_id(),
        Some("b0c9a4b2-7f3e-4b43-9a9e-0a2b1c3d4e5f")
    );
    assert!(
        device
            .metadata()
            .supports_locus(GateFamily::Move, &[qb(2), resonator()])
    );
    assert!(
        !device
            .metadata()
            .supports_locus(GateFamily::Move, &[qb(4), resonator()])
    );
    // Unknown operations are not native.
    assert!(!device.metadata().gateset().contains_family(GateFamily::HPow));
}

#[test]
fn test_metadata_architecture_roundtrip() {
    let device = star();
    let json = device.metadata().to_architecture().to_json().unwrap();
    let descriptor = ArchitectureDescriptor::from_json(&json).unwrap();
    let again = DeviceMetadata::from_architecture(&descriptor).unwrap();
    assert_eq!(&again, device.metadata());
}

#[test]
fn test_transpile_ghz_through_resonator() {
    let device = star();
    let circuit = Circuit::ghz(3).unwrap();
    let outcome = device.transpile(&circuit, &TranspileOptions::default()).unwrap();

    device.validate_circuit(&outcome.circuit).unwrap();
    assert!(count(&outcome.circuit, "move") >= 2);
    assert_eq!(count(&outcome.circuit, "move") % 2, 0);
    for op in outcome.circuit.all_operations() {
        if op.name() == "cz" {
            assert_eq!(op.qubits[1], resonator());
        }
    }
    assert_same_statistics(&circuit, &outcome.circuit);
}

#[test]
fn test_transpile_with_unmovable_qubit() {
    let device = star();
    let mut circuit = Circuit::new();
    circuit
        .h(Qubit::line(0))
        .unwrap()
        .gate(Gate::rx(0.3), [Qubit::line(1)])
        .unwrap()
        .cnot(Qubit::line(0), Qubit::line(1))
        .unwrap()
        .gate(Gate::zz_pow(0.4), [Qubit::line(1), Qubit::line(2)])
        .unwrap()
        .cnot(Qubit::line(3), Qubit::line(2))
        .unwrap()
        .measure("m", (0..4).map(Qubit::line))
        .unwrap();

    let outcome = device.transpile(&circuit, &TranspileOptions::default()).unwrap();
    device.validate_circuit(&outcome.circuit).unwrap();
    for op in outcome.circuit.all_operations() {
        if op.name() == "move" {
            assert_ne!(op.qubits[0], qb(4), "QB4 has no move locus");
        }
    }
    assert_same_statistics(&circuit, &outcome.circuit);
}

#[test]
fn test_direct_cz_between_qubits_rejected() {
    let device = star();
    let op = Operation::gate(Gate::cz(), [qb(1), qb(2)]).unwrap();
    assert!(matches!(
        device.validate_operation(&op),
        Err(DeviceError::UnsupportedConnectivity(_))
    ));
}

#[test]
fn test_unpaired_move_rejected() {
    let device = star();
    let mut circuit = Circuit::new();
    circuit
        .gate(Gate::Move, [qb(1), resonator()])
        .unwrap()
        .gate(Gate::x(), [qb(2)])
        .unwrap();
    assert!(matches!(
        device.validate_circuit(&circuit),
        Err(DeviceError::ResonatorNotEmpty(r)) if r == resonator()
    ));

    let backwards = Operation::gate(Gate::Move, [resonator(), qb(1)]).unwrap();
    assert!(device.validate_move(&backwards).is_err());
}

#[test]
fn test_wire_roundtrip_with_resonator() {
    let device = star();
    let circuit = Circuit::ghz(3).unwrap();
    let compiled = device
        .transpile(&circuit, &TranspileOptions::default())
        .unwrap()
        .circuit;

    let wire = serialize_circuit(&compiled).unwrap();
    assert!(wire.instructions.iter().any(|i| i.name == "move"));
    let json = wire.to_json().unwrap();
    assert!(json.contains("\"COMP_R\""));

    let parsed = iqm_device::WireCircuit::from_json(&json).unwrap();
    let back = deserialize_circuit(&parsed, device.resonators()).unwrap();
    device.validate_circuit(&back).unwrap();
    assert_eq!(back.num_operations(), compiled.num_operations());
    assert_same_statistics(&circuit, &back);
}
