//! Error types for compilation.

use iqm_ir::{IrError, Qubit};
use thiserror::Error;

/// Errors that can occur during compilation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CompileError {
    /// Error from the circuit IR.
    #[error("IR error: {0}")]
    Ir(#[from] IrError),

    /// A measurement is followed by another operation on the same qubit.
    #[error("Measurement on qubit {qubit} is followed by another operation")]
    NonTerminalMeasurement {
        /// The measured qubit.
        qubit: Qubit,
    },

    /// No qubit assignment respecting connectivity exists.
    #[error("Routing impossible: {0}")]
    RoutingImpossible(String),

    /// A non-native gate has no applicable decomposition.
    #[error("Decomposition deadlock: no rule makes progress on {gate}")]
    DecompositionDeadlock {
        /// The operation that could not be decomposed.
        gate: String,
    },
}

/// Result type for compilation operations.
pub type CompileResult<T> = Result<T, CompileError>;
