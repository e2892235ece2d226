//! End-to-end tests for the `iqm` binary.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use iqm_device::WireCircuit;
use iqm_ir::Circuit;
use tempfile::TempDir;

fn iqm(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_iqm"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn write_circuit(dir: &TempDir, name: &str, circuit: &Circuit) -> String {
    let path = dir.path().join(name);
    fs::write(&path, serde_json::to_string(circuit).unwrap()).unwrap();
    path.to_string_lossy().into_owned()
}

fn read_wire(path: &Path) -> WireCircuit {
    WireCircuit::from_json(&fs::read_to_string(path).unwrap()).unwrap()
}

// ============================================================================
// transpile
// ============================================================================

#[test]
fn test_transpile_to_file() {
    let dir = TempDir::new().unwrap();
    let input = write_circuit(&dir, "ghz.json", &Circuit::ghz(3).unwrap());
    let output = dir.path().join("ghz.wire.json");

    let out = iqm(&[
        "transpile",
        "-i",
        &input,
        "-d",
        "adonis",
        "-o",
        output.to_str().unwrap(),
    ]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert!(String::from_utf8_lossy(&out.stderr).contains("Transpilation complete"));

    let wire = read_wire(&output);
    assert_eq!(wire.name, iqm_device::SERIALIZED_CIRCUIT_NAME);
    assert!(
        wire.instructions
            .iter()
            .all(|i| ["prx", "cz", "measure"].contains(&i.name.as_str()))
    );
    assert_eq!(wire.instructions.last().unwrap().name, "measure");
}

#[test]
fn test_transpile_to_stdout() {
    let dir = TempDir::new().unwrap();
    let input = write_circuit(&dir, "bell.json", &Circuit::bell().unwrap());

    let out = iqm(&["transpile", "-i", &input, "-d", "apollo", "--no-simplify"]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let wire = WireCircuit::from_json(&String::from_utf8_lossy(&out.stdout)).unwrap();
    assert!(wire.instructions.iter().any(|i| i.name == "measure"));
}

#[test]
fn test_transpile_with_mapping() {
    let dir = TempDir::new().unwrap();
    let input = write_circuit(&dir, "ghz.json", &Circuit::ghz(2).unwrap());

    let out = iqm(&["transpile", "-i", &input, "--map", "q0=QB5", "--drop-final-rz"]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let wire = WireCircuit::from_json(&String::from_utf8_lossy(&out.stdout)).unwrap();
    assert!(
        wire.instructions
            .iter()
            .any(|i| i.qubits.iter().any(|q| q == "QB5"))
    );
}

#[test]
fn test_transpile_with_architecture() {
    let dir = TempDir::new().unwrap();
    let input = write_circuit(&dir, "bell.json", &Circuit::bell().unwrap());
    let arch = dir.path().join("pair.json");
    fs::write(
        &arch,
        r#"{
            "qubits": ["QB1", "QB2"],
            "gates": {
                "prx": {"loci": [["QB1"], ["QB2"]]},
                "cz": {"loci": [["QB1", "QB2"]]},
                "measure": {"loci": [["QB1"], ["QB2"]]}
            }
        }"#,
    )
    .unwrap();

    let out = iqm(&[
        "transpile",
        "-i",
        &input,
        "--architecture",
        arch.to_str().unwrap(),
    ]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert!(String::from_utf8_lossy(&out.stderr).contains("pair"));
}

#[test]
fn test_transpile_oversize_circuit_fails() {
    let dir = TempDir::new().unwrap();
    let input = write_circuit(&dir, "ghz.json", &Circuit::ghz(3).unwrap());

    let out = iqm(&["transpile", "-i", &input, "-d", "valkmusa"]);
    assert!(!out.status.success());
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("Error:"));
}

#[test]
fn test_transpile_iswap_device_not_serializable() {
    let dir = TempDir::new().unwrap();
    let input = write_circuit(&dir, "bell.json", &Circuit::bell().unwrap());

    let out = iqm(&["transpile", "-i", &input, "-d", "valkmusa"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("not supported"));
}

#[test]
fn test_transpile_missing_input_fails() {
    let out = iqm(&["transpile", "-i", "/nonexistent/circuit.json"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("File not found"));
}

#[test]
fn test_transpile_unknown_device_fails() {
    let dir = TempDir::new().unwrap();
    let input = write_circuit(&dir, "bell.json", &Circuit::bell().unwrap());

    let out = iqm(&["transpile", "-i", &input, "-d", "deneb"]);
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("deneb"));
    assert!(stderr.contains("aphrodite"));
}

// ============================================================================
// devices / version
// ============================================================================

#[test]
fn test_devices_lists_all() {
    let out = iqm(&["devices"]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    for name in ["Adonis", "Valkmusa", "Apollo", "Aphrodite"] {
        assert!(stdout.contains(name), "{name} missing");
    }
    assert!(stdout.contains("54 qubits"));
}

#[test]
fn test_version() {
    let out = iqm(&["version"]);
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stdout).contains(env!("CARGO_PKG_VERSION")));
}
