//! Pass manager for orchestrating compilation.

use tracing::{debug, info, instrument, trace};

use iqm_ir::Circuit;

use crate::error::CompileResult;
use crate::pass::Pass;
use crate::property::PropertySet;

/// Outcome of [`PassManager::run_to_fixed_point`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedPointReport {
    /// Number of rounds executed.
    pub rounds: usize,
    /// Whether the last round left the circuit unchanged.
    pub converged: bool,
}

/// Manages and executes a sequence of compilation passes.
pub struct PassManager {
    /// The passes to execute, in order.
    passes: Vec<Box<dyn Pass>>,
}

impl PassManager {
    /// Create a new empty pass manager.
    pub fn new() -> Self {
        Self { passes: vec![] }
    }

    /// Add a pass to the manager.
    pub fn add_pass(&mut self, pass: impl Pass + 'static) {
        self.passes.push(Box::new(pass));
    }

    /// Add a pass, builder style.
    #[must_use]
    pub fn with_pass(mut self, pass: impl Pass + 'static) -> Self {
        self.add_pass(pass);
        self
    }

    /// Run all passes once, in order.
    #[instrument(skip(self, circuit, properties))]
    pub fn run(&self, circuit: Circuit, properties: &mut PropertySet) -> CompileResult<Circuit> {
        debug!(
            "Running pass manager with {} passes on circuit with {} operations",
            self.passes.len(),
            circuit.num_operations()
        );

        let mut circuit = circuit;
        for pass in &self.passes {
            if pass.should_run(&circuit, properties) {
                trace!("Running pass: {}", pass.name());
                circuit = pass.run(circuit, properties)?;
                trace!(
                    "Pass {} completed, depth: {}, ops: {}",
                    pass.name(),
                    circuit.depth(),
                    circuit.num_operations()
                );
            } else {
                trace!("Skipping pass: {}", pass.name());
            }
        }

        Ok(circuit)
    }

    /// Repeat [`run`](Self::run) until a round leaves the circuit unchanged
    /// or `max_rounds` rounds have run.
    ///
    /// Hitting the round limit is not an error; the latest circuit is
    /// returned.
    pub fn run_to_fixed_point(
        &self,
        circuit: Circuit,
        properties: &mut PropertySet,
        max_rounds: usize,
    ) -> CompileResult<(Circuit, FixedPointReport)> {
        let mut current = circuit;
        for round in 1..=max_rounds {
            let next = self.run(current.clone(), properties)?;
            debug!(
                "Round {round}: depth {} -> {}, ops {} -> {}",
                current.depth(),
                next.depth(),
                current.num_operations(),
                next.num_operations()
            );
            if next == current {
                return Ok((
                    next,
                    FixedPointReport {
                        rounds: round,
                        converged: true,
                    },
                ));
            }
            current = next;
        }

        info!("No fixed point after {max_rounds} rounds, keeping latest circuit");
        Ok((
            current,
            FixedPointReport {
                rounds: max_rounds,
                converged: false,
            },
        ))
    }

    /// Get the number of passes.
    pub fn len(&self) -> usize {
        self.passes.len()
    }

    /// Check if the manager has no passes.
    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    /// Names of the passes, in order.
    pub fn pass_names(&self) -> Vec<&str> {
        self.passes.iter().map(|p| p.name()).collect()
    }
}

impl Default for PassManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pass::PassKind;
    use crate::passes::DropEmptyMoments;
    use iqm_ir::{Gate, Moment, Operation, Qubit};

    /// Removes one operation per run.
    struct PopOne;

    impl Pass for PopOne {
        fn name(&self) -> &'static str {
            "PopOne"
        }

        fn kind(&self) -> PassKind {
            PassKind::Transformation
        }

        fn run(&self, circuit: Circuit, _properties: &mut PropertySet) -> CompileResult<Circuit> {
            let mut ops: Vec<Operation> = circuit.all_operations().cloned().collect();
            ops.pop();
            Ok(Circuit::from_operations(ops)?)
        }
    }

    #[test]
    fn test_empty_pass_manager() {
        let pm = PassManager::new();
        assert!(pm.is_empty());
        assert_eq!(pm.len(), 0);
    }

    #[test]
    fn test_pass_manager_run() {
        let pm = PassManager::new().with_pass(DropEmptyMoments);
        let mut props = PropertySet::new();

        let mut circuit = Circuit::bell().unwrap();
        circuit.push_moment(Moment::new());

        let out = pm.run(circuit, &mut props).unwrap();
        assert_eq!(out.depth(), 3);
        assert_eq!(pm.pass_names(), vec!["DropEmptyMoments"]);
    }

    #[test]
    fn test_fixed_point_converges() {
        let pm = PassManager::new().with_pass(PopOne);
        let mut props = PropertySet::new();
        let mut circuit = Circuit::new();
        circuit.gate(Gate::x(), [Qubit::line(0)]).unwrap();
        circuit.gate(Gate::x(), [Qubit::line(0)]).unwrap();

        let (out, report) = pm.run_to_fixed_point(circuit, &mut props, 10).unwrap();
        assert!(out.is_empty());
        assert!(report.converged);
        assert_eq!(report.rounds, 3);
    }

    #[test]
    fn test_fixed_point_round_limit() {
        let pm = PassManager::new().with_pass(PopOne);
        let mut props = PropertySet::new();
        let circuit = Circuit::ghz(4).unwrap();

        let (out, report) = pm.run_to_fixed_point(circuit, &mut props, 2).unwrap();
        assert!(!report.converged);
        assert_eq!(report.rounds, 2);
        assert_eq!(out.num_operations(), 3);
    }
}
