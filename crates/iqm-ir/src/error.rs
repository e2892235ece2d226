//! Error types for the IR crate.

use crate::qubit::Qubit;
use thiserror::Error;

/// Errors that can occur in IR operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IrError {
    /// Gate requires different number of qubits.
    #[error("Gate '{gate_name}' requires {expected} qubits, got {got}")]
    QubitCountMismatch {
        /// Name of the gate.
        gate_name: String,
        /// Expected number of qubits.
        expected: usize,
        /// Actual number of qubits provided.
        got: usize,
    },

    /// Duplicate qubit in operation.
    #[error("Duplicate qubit {qubit} in operation{}", format_gate_context(.gate_name))]
    DuplicateQubit {
        /// The duplicate qubit.
        qubit: Qubit,
        /// Optional gate name for context.
        gate_name: Option<String>,
    },

    /// An operation was placed into a moment that already touches one of its qubits.
    #[error("Qubit {qubit} is already used in this moment")]
    QubitConflict {
        /// The qubit acted on twice.
        qubit: Qubit,
    },

    /// Qubit missing from the register a matrix is built over.
    #[error("Qubit {0} is not part of the register")]
    UnknownQubit(Qubit),

    /// Operation has no unitary matrix.
    #[error("Operation '{0}' is not unitary")]
    NonUnitary(String),

    /// Circuit is too wide for a dense matrix.
    #[error("Circuit acts on {got} qubits, dense matrices are limited to {limit}")]
    TooManyQubits {
        /// Number of qubits in the circuit.
        got: usize,
        /// Maximum supported.
        limit: usize,
    },
}

/// Helper function to format optional gate context.
#[allow(clippy::ref_option)]
fn format_gate_context(gate_name: &Option<String>) -> String {
    match gate_name {
        Some(name) => format!(" (gate: {name})"),
        None => String::new(),
    }
}

/// Result type for IR operations.
pub type IrResult<T> = Result<T, IrError>;
