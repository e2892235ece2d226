//! Wire format for circuit submission.
//!
//! Circuits are sent to the execution service as a flat list of named
//! instructions:
//!
//! | Operation | Instruction | Arguments |
//! |-----------|-------------|-----------|
//! | `PhasedXPow(e, p)` | `prx` | `angle_t = e/2`, `phase_t = p/2` |
//! | `XPow(e)` | `prx` | `angle_t = e/2`, `phase_t = 0` |
//! | `YPow(e)` | `prx` | `angle_t = e/2`, `phase_t = ¼` |
//! | `CZ` | `cz` | none |
//! | `Move` | `move` | none |
//! | measurement | `measure` | `key` |
//!
//! Angles are in full turns on the wire and in half turns in the IR.
//! Global phases are not transmitted.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::BTreeMap;

use iqm_ir::{Circuit, EPSILON, Gate, Operation, OperationKind, Qubit};

use crate::error::{DeviceError, DeviceResult};

/// Name given to serialized circuits.
pub const SERIALIZED_CIRCUIT_NAME: &str = "Serialized from Rust";

/// One instruction of a wire circuit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    /// Operation name.
    pub name: String,
    /// Names of the components acted on.
    pub qubits: Vec<String>,
    /// Operation arguments.
    #[serde(default)]
    pub args: BTreeMap<String, Value>,
}

impl Instruction {
    fn new(name: &str, op: &Operation, args: BTreeMap<String, Value>) -> Self {
        Self {
            name: name.to_string(),
            qubits: op.qubits.iter().map(|q| q.name.clone()).collect(),
            args,
        }
    }

    fn float_arg(&self, key: &str) -> DeviceResult<f64> {
        self.args
            .get(key)
            .and_then(Value::as_f64)
            .ok_or_else(|| {
                DeviceError::OperationNotSupported(format!(
                    "{} instruction is missing numeric argument '{key}'",
                    self.name
                ))
            })
    }
}

/// A circuit in the wire format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireCircuit {
    /// Circuit name.
    pub name: String,
    /// Instructions in execution order.
    pub instructions: Vec<Instruction>,
}

impl WireCircuit {
    /// Render as pretty-printed JSON.
    pub fn to_json(&self) -> DeviceResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse from JSON.
    pub fn from_json(json: &str) -> DeviceResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Map a native operation to its instruction.
pub fn map_operation(op: &Operation) -> DeviceResult<Instruction> {
    let prx = |angle_t: f64, phase_t: f64| {
        BTreeMap::from([
            ("angle_t".to_string(), json!(angle_t)),
            ("phase_t".to_string(), json!(phase_t)),
        ])
    };
    match &op.kind {
        OperationKind::Gate(Gate::PhasedXPow {
            phase_exponent,
            power,
        }) => Ok(Instruction::new(
            "prx",
            op,
            prx(power.exponent / 2.0, phase_exponent / 2.0),
        )),
        OperationKind::Gate(Gate::XPow(power)) => {
            Ok(Instruction::new("prx", op, prx(power.exponent / 2.0, 0.0)))
        }
        OperationKind::Gate(Gate::YPow(power)) => {
            Ok(Instruction::new("prx", op, prx(power.exponent / 2.0, 0.25)))
        }
        OperationKind::Gate(Gate::CZPow(power)) => {
            if (power.exponent - 1.0).abs() < EPSILON {
                Ok(Instruction::new("cz", op, BTreeMap::new()))
            } else {
                Err(DeviceError::OperationNotSupported(format!(
                    "CZPow exponent was {}, but only 1 is natively supported",
                    power.exponent
                )))
            }
        }
        OperationKind::Gate(Gate::Move) => Ok(Instruction::new("move", op, BTreeMap::new())),
        OperationKind::Measure { key } => Ok(Instruction::new(
            "measure",
            op,
            BTreeMap::from([("key".to_string(), json!(key))]),
        )),
        _ => Err(DeviceError::OperationNotSupported(format!(
            "{op} is not natively supported"
        ))),
    }
}

/// Map an instruction back to an operation.
///
/// Component names matching one of `resonators` become those resonators;
/// all others become qubits.
pub fn instruction_to_operation(
    instruction: &Instruction,
    resonators: &[Qubit],
) -> DeviceResult<Operation> {
    let qubits = instruction.qubits.iter().map(|name| {
        resonators
            .iter()
            .find(|r| r.name == *name)
            .cloned()
            .unwrap_or_else(|| Qubit::named(name.as_str()))
    });
    let op = match instruction.name.as_str() {
        "prx" => {
            let exponent = instruction.float_arg("angle_t")? * 2.0;
            let phase = instruction.float_arg("phase_t")? * 2.0;
            Operation::gate(Gate::phased_x(exponent, phase), qubits)?
        }
        "cz" => Operation::gate(Gate::cz(), qubits)?,
        "move" => Operation::gate(Gate::Move, qubits)?,
        "measure" => {
            let key = instruction
                .args
                .get("key")
                .and_then(Value::as_str)
                .ok_or_else(|| {
                    DeviceError::OperationNotSupported(
                        "measure instruction is missing its key".into(),
                    )
                })?;
            Operation::measure(key, qubits)?
        }
        other => {
            return Err(DeviceError::OperationNotSupported(format!(
                "Operation {other} not supported"
            )));
        }
    };
    Ok(op)
}

/// Serialize a circuit of native operations.
pub fn serialize_circuit(circuit: &Circuit) -> DeviceResult<WireCircuit> {
    let instructions = circuit
        .all_operations()
        .map(map_operation)
        .collect::<DeviceResult<Vec<_>>>()?;
    Ok(WireCircuit {
        name: SERIALIZED_CIRCUIT_NAME.to_string(),
        instructions,
    })
}

/// Deserialize a wire circuit, laying operations out with earliest insertion.
pub fn deserialize_circuit(circuit: &WireCircuit, resonators: &[Qubit]) -> DeviceResult<Circuit> {
    let operations = circuit
        .instructions
        .iter()
        .map(|instruction| instruction_to_operation(instruction, resonators))
        .collect::<DeviceResult<Vec<_>>>()?;
    Ok(Circuit::from_operations(operations)?)
}
