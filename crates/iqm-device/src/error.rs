//! Error types for the device crate.

use iqm_compile::CompileError;
use iqm_ir::{IrError, Qubit};
use thiserror::Error;

/// Errors raised while validating, decomposing or routing for a device.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DeviceError {
    /// The operation is not a gate or measurement acting on qubits.
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// The gate is not native to the device.
    #[error("Unsupported gate type: {0}")]
    UnsupportedGateType(String),

    /// A multi-qubit operation targets qubits that are not coupled.
    #[error("Unsupported operation between qubits: {0}")]
    UnsupportedConnectivity(String),

    /// An operation references a qubit the device does not have.
    #[error("Qubit not on device: {0}")]
    QubitNotOnDevice(Qubit),

    /// Two measurements share a key.
    #[error("Measurement key {0} repeated")]
    DuplicateMeasurementKey(String),

    /// An operation follows a measurement on the same qubit.
    #[error("Non-terminal measurements are not supported (qubit {qubit})")]
    NonTerminalMeasurement {
        /// The measured qubit.
        qubit: Qubit,
    },

    /// The circuit cannot be placed on the device.
    #[error("Routing impossible: {0}")]
    RoutingImpossible(String),

    /// A non-native gate has no applicable decomposition.
    #[error("Decomposition deadlock: no rule makes progress on {gate}")]
    DecompositionDeadlock {
        /// The operation that could not be decomposed.
        gate: String,
    },

    /// A MOVE gate is applied to the wrong registers or states.
    #[error("Invalid MOVE: {0}")]
    InvalidMove(String),

    /// The circuit ends with a qubit state stored in a resonator.
    #[error("Circuit ends with a qubit state in the resonator {0}")]
    ResonatorNotEmpty(Qubit),

    /// An architecture description is inconsistent.
    #[error("Invalid architecture: {0}")]
    InvalidArchitecture(String),

    /// The operation has no wire-format counterpart.
    #[error("Operation not supported: {0}")]
    OperationNotSupported(String),

    /// No static architecture has this name.
    #[error("Unknown device: {0}")]
    UnknownDevice(String),

    /// Other compilation failure.
    #[error("Compilation error: {0}")]
    Compile(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Error from the circuit IR.
    #[error("IR error: {0}")]
    Ir(#[from] IrError),
}

impl From<CompileError> for DeviceError {
    fn from(e: CompileError) -> Self {
        match e {
            CompileError::Ir(e) => DeviceError::Ir(e),
            CompileError::NonTerminalMeasurement { qubit } => {
                DeviceError::NonTerminalMeasurement { qubit }
            }
            CompileError::RoutingImpossible(msg) => DeviceError::RoutingImpossible(msg),
            CompileError::DecompositionDeadlock { gate } => {
                DeviceError::DecompositionDeadlock { gate }
            }
            other => DeviceError::Compile(other.to_string()),
        }
    }
}

/// Result type for device operations.
pub type DeviceResult<T> = Result<T, DeviceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_key_display() {
        let err = DeviceError::DuplicateMeasurementKey("a".into());
        assert_eq!(err.to_string(), "Measurement key a repeated");
    }

    #[test]
    fn test_qubit_not_on_device_display() {
        let err = DeviceError::QubitNotOnDevice(Qubit::device(6));
        assert!(err.to_string().contains("QB6"));
    }

    #[test]
    fn test_compile_error_conversion() {
        let err: DeviceError = CompileError::RoutingImpossible("too many qubits".into()).into();
        assert!(matches!(err, DeviceError::RoutingImpossible(msg) if msg == "too many qubits"));

        let err: DeviceError = CompileError::NonTerminalMeasurement {
            qubit: Qubit::line(0),
        }
        .into();
        assert!(matches!(err, DeviceError::NonTerminalMeasurement { .. }));

        let err: DeviceError = CompileError::DecompositionDeadlock {
            gate: "move(q0, q1)".into(),
        }
        .into();
        assert!(matches!(
            err,
            DeviceError::DecompositionDeadlock { gate } if gate.contains("move")
        ));
    }

    #[test]
    fn test_resonator_not_empty_display() {
        let err = DeviceError::ResonatorNotEmpty(Qubit::resonator("COMP_R"));
        assert!(err.to_string().contains("COMP_R"));
    }
}
