//! Rewriting circuits into native operations.
//!
//! The [`CircuitDecomposer`] expands every non-native operation with a
//! device rule table first and the generic rules of
//! [`iqm_ir::default_decomposition`] second, recursing until only native
//! leaves remain.

use tracing::trace;

use iqm_ir::{Circuit, Operation, default_decomposition};

use crate::error::{CompileError, CompileResult};

/// Default bound on the nesting of decomposition rules.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// A table of device-specific decomposition rules.
pub trait OperationDecomposer: Send + Sync {
    /// Decompose one operation, or `None` if no rule applies.
    ///
    /// A rule that applies but fails to build its operations returns the
    /// error instead of `None`.
    fn decompose(&self, op: &Operation) -> CompileResult<Option<Vec<Operation>>>;
}

/// A decomposer with no rules of its own.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRules;

impl OperationDecomposer for NoRules {
    fn decompose(&self, _op: &Operation) -> CompileResult<Option<Vec<Operation>>> {
        Ok(None)
    }
}

/// Recursive decomposition of operations and circuits.
pub struct CircuitDecomposer<'a> {
    rules: &'a dyn OperationDecomposer,
    keep: &'a (dyn Fn(&Operation) -> bool + Sync),
    max_depth: usize,
}

impl<'a> CircuitDecomposer<'a> {
    /// Create a decomposer keeping operations for which `keep` holds.
    pub fn new(
        rules: &'a dyn OperationDecomposer,
        keep: &'a (dyn Fn(&Operation) -> bool + Sync),
    ) -> Self {
        Self {
            rules,
            keep,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Set the recursion bound.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    fn is_leaf(&self, op: &Operation) -> bool {
        // Only gates are rewritten; measurements the predicate rejects are
        // left for validation to report.
        op.as_gate().is_none() || (self.keep)(op)
    }

    /// Decompose one operation into native leaves.
    ///
    /// Native operations come back unchanged as a single-element list.
    pub fn decompose_operation(&self, op: &Operation) -> CompileResult<Vec<Operation>> {
        let mut leaves = vec![];
        self.expand(op, 0, &mut leaves)?;
        Ok(leaves)
    }

    fn expand(&self, op: &Operation, depth: usize, out: &mut Vec<Operation>) -> CompileResult<()> {
        if self.is_leaf(op) {
            out.push(op.clone());
            return Ok(());
        }
        if depth >= self.max_depth {
            return Err(CompileError::DecompositionDeadlock {
                gate: op.to_string(),
            });
        }
        let parts = self
            .rules
            .decompose(op)?
            .or_else(|| default_decomposition(op))
            .ok_or_else(|| CompileError::DecompositionDeadlock {
                gate: op.to_string(),
            })?;
        trace!("Decomposed {} into {} operations", op, parts.len());
        for part in &parts {
            self.expand(part, depth + 1, out)?;
        }
        Ok(())
    }

    /// Decompose a whole circuit.
    ///
    /// Moments made only of native operations are kept as they are, so an
    /// already-native circuit comes back equal. The decomposed operations of
    /// any other moment are laid out with earliest insertion in place of it.
    ///
    /// Identity gates decompose to nothing. A qubit acted on only by
    /// identities is therefore absent from the output; every other qubit of
    /// the input is kept.
    pub fn decompose(&self, circuit: &Circuit) -> CompileResult<Circuit> {
        let mut out = Circuit::new();
        for moment in circuit.moments() {
            if moment.operations().iter().all(|op| self.is_leaf(op)) {
                out.push_moment(moment.clone());
                continue;
            }
            let mut block = Circuit::new();
            for op in moment.operations() {
                for leaf in self.decompose_operation(op)? {
                    block.push(leaf)?;
                }
            }
            for m in block.into_moments() {
                out.push_moment(m);
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use iqm_ir::{Gate, GateFamily, IrError, Qubit};

    fn native(op: &Operation) -> bool {
        matches!(
            op.family(),
            Some(GateFamily::XPow | GateFamily::YPow | GateFamily::CZPow | GateFamily::Measure)
        )
    }

    #[test]
    fn test_native_operation_unchanged() {
        let decomposer = CircuitDecomposer::new(&NoRules, &native);
        let op = Operation::gate(Gate::x(), [Qubit::line(0)]).unwrap();
        assert_eq!(decomposer.decompose_operation(&op).unwrap(), vec![op]);
    }

    #[test]
    fn test_generic_fallback() {
        let decomposer = CircuitDecomposer::new(&NoRules, &native);
        let op = Operation::gate(Gate::cnot(), [Qubit::line(0), Qubit::line(1)]).unwrap();
        let leaves = decomposer.decompose_operation(&op).unwrap();
        assert_eq!(leaves.len(), 3);
        assert!(leaves.iter().all(native));
    }

    #[test]
    fn test_deadlock_names_gate() {
        let decomposer = CircuitDecomposer::new(&NoRules, &native);
        let op = Operation::gate(Gate::iswap(), [Qubit::line(0), Qubit::line(1)]).unwrap();
        let err = decomposer.decompose_operation(&op).unwrap_err();
        match err {
            CompileError::DecompositionDeadlock { gate } => assert!(gate.contains("iswap")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_depth_limit() {
        /// Rewrites every gate into itself.
        struct Loop;
        impl OperationDecomposer for Loop {
            fn decompose(&self, op: &Operation) -> CompileResult<Option<Vec<Operation>>> {
                Ok(Some(vec![op.clone()]))
            }
        }
        let decomposer = CircuitDecomposer::new(&Loop, &native).with_max_depth(4);
        let op = Operation::gate(Gate::h(), [Qubit::line(0)]).unwrap();
        assert!(matches!(
            decomposer.decompose_operation(&op),
            Err(CompileError::DecompositionDeadlock { .. })
        ));
    }

    #[test]
    fn test_native_circuit_is_fixed() {
        let mut circuit = Circuit::new();
        circuit
            .x(Qubit::line(0))
            .unwrap()
            .cz(Qubit::line(0), Qubit::line(1))
            .unwrap()
            .measure("m", [Qubit::line(0), Qubit::line(1)])
            .unwrap();
        let decomposer = CircuitDecomposer::new(&NoRules, &native);
        assert_eq!(decomposer.decompose(&circuit).unwrap(), circuit);
    }

    #[test]
    fn test_keeps_qubits() {
        let circuit = Circuit::ghz(3).unwrap();
        let decomposer = CircuitDecomposer::new(&NoRules, &native);
        let out = decomposer.decompose(&circuit).unwrap();
        assert_eq!(out.all_qubits(), circuit.all_qubits());
        assert!(out.all_operations().all(native));
    }

    #[test]
    fn test_identity_only_qubit_dropped() {
        let mut circuit = Circuit::new();
        circuit
            .x(Qubit::line(0))
            .unwrap()
            .gate(Gate::identity(1), [Qubit::line(0)])
            .unwrap()
            .gate(Gate::identity(1), [Qubit::line(1)])
            .unwrap();
        let decomposer = CircuitDecomposer::new(&NoRules, &native);
        let out = decomposer.decompose(&circuit).unwrap();
        assert_eq!(out.num_operations(), 1);
        assert_eq!(out.all_qubits(), vec![Qubit::line(0)]);
    }

    #[test]
    fn test_rule_error_propagates() {
        /// Builds a two-qubit gate on a single qubit.
        struct Broken;
        impl OperationDecomposer for Broken {
            fn decompose(&self, op: &Operation) -> CompileResult<Option<Vec<Operation>>> {
                let part = Operation::gate(Gate::cz(), op.qubits.iter().take(1).cloned())?;
                Ok(Some(vec![part]))
            }
        }
        let decomposer = CircuitDecomposer::new(&Broken, &native);
        let op = Operation::gate(Gate::h(), [Qubit::line(0)]).unwrap();
        assert!(matches!(
            decomposer.decompose_operation(&op),
            Err(CompileError::Ir(IrError::QubitCountMismatch { .. }))
        ));
    }
}
