//! Pass trait and types for compilation passes.

use iqm_ir::Circuit;

use crate::error::CompileResult;
use crate::property::PropertySet;

/// The kind of compilation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassKind {
    /// Analysis pass that reads the circuit and returns it unchanged.
    Analysis,
    /// Transformation pass that produces a rewritten circuit.
    Transformation,
}

/// A compilation pass: a function from circuit to circuit.
///
/// Passes take the circuit by value and return the rewritten one, so a
/// pipeline never observes a partially transformed circuit.
pub trait Pass: Send + Sync {
    /// Get the name of this pass.
    fn name(&self) -> &str;

    /// Get the kind of this pass.
    fn kind(&self) -> PassKind;

    /// Run the pass.
    ///
    /// Passes may record results in the `PropertySet`.
    fn run(&self, circuit: Circuit, properties: &mut PropertySet) -> CompileResult<Circuit>;

    /// Check if this pass should run based on current state.
    fn should_run(&self, _circuit: &Circuit, _properties: &PropertySet) -> bool {
        true
    }
}
