//! Fixed-point circuit simplification.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use iqm_ir::Circuit;

use crate::error::CompileResult;
use crate::manager::PassManager;
use crate::passes::{
    DropEmptyMoments, DropRzBeforeMeasurement, EjectZ, MergeOneParameterGates,
    MergeSingleQubitGates,
};
use crate::property::PropertySet;

/// Default cap on simplification rounds.
pub const DEFAULT_MAX_ROUNDS: usize = 20;

/// Options for [`simplify_circuit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimplifyOptions {
    /// Maximum number of rounds before giving up on a fixed point.
    pub max_rounds: usize,
    /// Also drop Z rotations that nothing follows.
    pub drop_final_rz: bool,
}

impl Default for SimplifyOptions {
    fn default() -> Self {
        Self {
            max_rounds: DEFAULT_MAX_ROUNDS,
            drop_final_rz: false,
        }
    }
}

impl SimplifyOptions {
    /// Set the round cap.
    #[must_use]
    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    /// Set whether trailing Z rotations are dropped.
    #[must_use]
    pub fn with_drop_final_rz(mut self, drop_final_rz: bool) -> Self {
        self.drop_final_rz = drop_final_rz;
        self
    }
}

/// What a simplification run did, recorded in the [`PropertySet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimplifyStats {
    /// Rounds executed.
    pub rounds: usize,
    /// Whether a fixed point was reached within the round cap.
    pub converged: bool,
    /// Operation count before simplification.
    pub ops_before: usize,
    /// Operation count after simplification.
    pub ops_after: usize,
}

/// The passes of one simplification round, in order.
pub fn round_passes() -> PassManager {
    PassManager::new()
        .with_pass(MergeOneParameterGates::new())
        .with_pass(MergeSingleQubitGates)
        .with_pass(EjectZ)
        .with_pass(DropEmptyMoments)
}

/// Simplify a circuit.
///
/// Runs [`round_passes`] until a round leaves the circuit unchanged or
/// `options.max_rounds` rounds have run, then drops Z rotations before
/// measurements and any empty moments left behind. Measurement statistics
/// are preserved; global phase is not.
#[instrument(skip(circuit, properties))]
pub fn simplify_with_properties(
    circuit: Circuit,
    options: SimplifyOptions,
    properties: &mut PropertySet,
) -> CompileResult<Circuit> {
    let ops_before = circuit.num_operations();
    let depth_before = circuit.depth();

    let (circuit, report) =
        round_passes().run_to_fixed_point(circuit, properties, options.max_rounds)?;
    debug!(
        "Simplification loop ran {} rounds, converged: {}",
        report.rounds, report.converged
    );

    let finish = PassManager::new()
        .with_pass(DropRzBeforeMeasurement::new(options.drop_final_rz))
        .with_pass(DropEmptyMoments);
    let circuit = finish.run(circuit, properties)?;

    info!(
        "Simplified circuit: ops {} -> {}, depth {} -> {}",
        ops_before,
        circuit.num_operations(),
        depth_before,
        circuit.depth()
    );
    properties.insert(SimplifyStats {
        rounds: report.rounds,
        converged: report.converged,
        ops_before,
        ops_after: circuit.num_operations(),
    });
    Ok(circuit)
}

/// Simplify a circuit with a fresh [`PropertySet`].
pub fn simplify_circuit(circuit: Circuit, options: SimplifyOptions) -> CompileResult<Circuit> {
    simplify_with_properties(circuit, options, &mut PropertySet::new())
}
