//! The device façade.
//!
//! A [`Device`] pairs immutable [`DeviceMetadata`] with a
//! [`DecompositionRules`] table and exposes validation, decomposition,
//! routing and simplification against that device.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, instrument};

use iqm_compile::{
    CircuitDecomposer, CouplingMap, GreedyRouter, Layout, NativeGate, RoutingOutcome,
    SimplifyOptions, find_non_terminal_measurement, route_preserving_measurements,
};
use iqm_ir::{Circuit, EPSILON, Gate, GateFamily, Operation, OperationKind, Qubit};

use crate::architecture::ArchitectureDescriptor;
use crate::error::{DeviceError, DeviceResult};
use crate::metadata::DeviceMetadata;
use crate::moves;
use crate::rules::DecompositionRules;

/// Options for [`Device::transpile`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranspileOptions {
    /// Simplifier settings, or `None` to skip simplification.
    pub simplify: Option<SimplifyOptions>,
    /// Partial initial placement, logical qubit name to device qubit name.
    pub initial_mapping: Option<BTreeMap<String, String>>,
}

impl Default for TranspileOptions {
    fn default() -> Self {
        Self {
            simplify: Some(SimplifyOptions::default()),
            initial_mapping: None,
        }
    }
}

impl TranspileOptions {
    /// Set the simplifier settings.
    #[must_use]
    pub fn with_simplify(mut self, simplify: Option<SimplifyOptions>) -> Self {
        self.simplify = simplify;
        self
    }

    /// Set the partial initial placement.
    #[must_use]
    pub fn with_initial_mapping(mut self, mapping: BTreeMap<String, String>) -> Self {
        self.initial_mapping = Some(mapping);
        self
    }
}

/// A quantum device.
#[derive(Debug, Clone)]
pub struct Device {
    name: String,
    metadata: DeviceMetadata,
    rules: DecompositionRules,
}

impl Device {
    /// Create a device.
    ///
    /// Devices whose only native coupler is an iSWAP power get the
    /// iSWAP-based rule table; all others get the CZ-based one.
    pub fn new(name: impl Into<String>, metadata: DeviceMetadata) -> Self {
        let gateset = metadata.gateset();
        let rules = if gateset.contains_family(GateFamily::ISwapPow)
            && !gateset.contains_family(GateFamily::CZPow)
        {
            DecompositionRules::valkmusa()
        } else {
            DecompositionRules::common()
        };
        Self {
            name: name.into(),
            metadata,
            rules,
        }
    }

    /// Create a device from a live architecture descriptor.
    pub fn from_architecture(
        name: impl Into<String>,
        arch: &ArchitectureDescriptor,
    ) -> DeviceResult<Self> {
        Ok(Self::new(name, DeviceMetadata::from_architecture(arch)?))
    }

    /// Replace the decomposition rules.
    #[must_use]
    pub fn with_rules(mut self, rules: DecompositionRules) -> Self {
        self.rules = rules;
        self
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Get the device name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the device metadata.
    pub fn metadata(&self) -> &DeviceMetadata {
        &self.metadata
    }

    /// Get the device qubits, sorted.
    pub fn qubits(&self) -> &[Qubit] {
        self.metadata.qubits()
    }

    /// Get the computational resonators, sorted.
    pub fn resonators(&self) -> &[Qubit] {
        self.metadata.resonators()
    }

    /// Get the decomposition rules.
    pub fn rules(&self) -> &DecompositionRules {
        &self.rules
    }

    /// The device qubit with the given 1-based index.
    pub fn get_qubit(&self, index: usize) -> Option<&Qubit> {
        index.checked_sub(1).and_then(|i| self.qubits().get(i))
    }

    /// The numeric index in a device qubit name.
    pub fn get_qubit_index(qubit: &Qubit) -> Option<u32> {
        qubit.device_index()
    }

    /// Look up a device qubit or resonator by name.
    pub fn component(&self, name: &str) -> Option<&Qubit> {
        self.qubits()
            .iter()
            .chain(self.resonators())
            .find(|q| q.name == name)
    }

    // =========================================================================
    // Native gate catalog
    // =========================================================================

    /// Check if an operation is executed natively.
    ///
    /// A CZ is native only at full turn unless the gateset accepts the whole
    /// CZ family.
    pub fn is_native_operation(&self, op: &Operation) -> bool {
        let gateset = self.metadata.gateset();
        if !gateset.accepts(op) {
            return false;
        }
        match op.as_gate() {
            Some(Gate::CZPow(power)) => {
                gateset
                    .gates()
                    .contains(&NativeGate::Family(GateFamily::CZPow))
                    || (power.exponent - 1.0).abs() < EPSILON
            }
            _ => true,
        }
    }

    /// Check if an operation acts on components its family supports.
    ///
    /// Families without declared loci may act on single device qubits and
    /// coupled pairs.
    pub fn has_valid_operation_targets(&self, op: &Operation) -> bool {
        let Some(family) = op.family() else {
            return false;
        };
        if !self.metadata.loci(family).is_empty() {
            return self.metadata.supports_locus(family, &op.qubits);
        }
        match op.qubits.as_slice() {
            [q] => self.metadata.contains(q),
            [a, b] => self.metadata.connectivity().is_connected(a, b),
            _ => false,
        }
    }

    /// Check that a multi-qubit operation acts on connected components.
    pub fn check_connectivity(&self, op: &Operation) -> DeviceResult<()> {
        if op.num_qubits() >= 2 && !self.has_valid_operation_targets(op) {
            return Err(DeviceError::UnsupportedConnectivity(op.to_string()));
        }
        Ok(())
    }

    // =========================================================================
    // Validation
    // =========================================================================

    /// Check that an operation can run on the device as it is.
    pub fn validate_operation(&self, op: &Operation) -> DeviceResult<()> {
        if !matches!(op.kind, OperationKind::Gate(_) | OperationKind::Measure { .. }) {
            return Err(DeviceError::UnsupportedOperation(op.to_string()));
        }
        if !self.is_native_operation(op) {
            return Err(DeviceError::UnsupportedGateType(op.name().to_string()));
        }
        if let Some(q) = op.qubits.iter().find(|q| !self.metadata.contains(q)) {
            return Err(DeviceError::QubitNotOnDevice(q.clone()));
        }
        if !self.has_valid_operation_targets(op) {
            return Err(DeviceError::UnsupportedConnectivity(op.to_string()));
        }
        moves::validate_move(op, &self.metadata)
    }

    /// Check that a circuit can run on the device as it is.
    ///
    /// Besides every operation, measurement keys must be unique,
    /// measurements terminal and MOVEs correctly paired.
    pub fn validate_circuit(&self, circuit: &Circuit) -> DeviceResult<()> {
        let mut keys = FxHashSet::default();
        for op in circuit.all_operations() {
            self.validate_operation(op)?;
            if let Some(key) = op.measurement_key() {
                if !keys.insert(key) {
                    return Err(DeviceError::DuplicateMeasurementKey(key.to_string()));
                }
            }
        }
        if let Some(qubit) = find_non_terminal_measurement(circuit) {
            return Err(DeviceError::NonTerminalMeasurement { qubit });
        }
        self.validate_moves(circuit)
    }

    /// Check a single MOVE.
    pub fn validate_move(&self, op: &Operation) -> DeviceResult<()> {
        moves::validate_move(op, &self.metadata)
    }

    /// Check every MOVE of a circuit.
    pub fn validate_moves(&self, circuit: &Circuit) -> DeviceResult<()> {
        moves::validate_moves(circuit, &self.metadata)
    }

    // =========================================================================
    // Decomposition
    // =========================================================================

    /// Decompose an operation into native operations.
    ///
    /// Native operations come back unchanged.
    pub fn decompose_operation(&self, op: &Operation) -> DeviceResult<Vec<Operation>> {
        let keep = |op: &Operation| self.is_native_operation(op);
        let decomposer = CircuitDecomposer::new(&self.rules, &keep);
        Ok(decomposer.decompose_operation(op)?)
    }

    /// Decompose a circuit into native operations.
    ///
    /// A circuit that is already native comes back equal.
    #[instrument(skip(self, circuit), fields(device = %self.name))]
    pub fn decompose_circuit(&self, circuit: &Circuit) -> DeviceResult<Circuit> {
        let keep = |op: &Operation| self.is_native_operation(op);
        let decomposer = CircuitDecomposer::new(&self.rules, &keep);
        let out = decomposer.decompose(circuit)?;
        debug!(
            "Decomposed {} operations into {}",
            circuit.num_operations(),
            out.num_operations()
        );
        Ok(out)
    }

    // =========================================================================
    // Routing
    // =========================================================================

    /// Route a circuit onto the device qubits.
    ///
    /// `initial` may fix the placement of some logical qubits. Measurements
    /// must be terminal; they keep their keys and end in the final moment.
    /// On devices with resonators, qubits sharing a resonator count as
    /// coupled, and the routed circuit is decomposed and gets MOVEs
    /// inserted for every interaction through a resonator.
    #[instrument(skip(self, circuit, initial), fields(device = %self.name))]
    pub fn route_circuit(
        &self,
        circuit: &Circuit,
        initial: Option<&Layout>,
    ) -> DeviceResult<RoutingOutcome> {
        self.route_on(circuit, initial, &self.routing_graph())
    }

    /// Route a circuit onto a subset of the device qubits.
    pub fn route_circuit_within(
        &self,
        circuit: &Circuit,
        initial: Option<&Layout>,
        qubits: &[Qubit],
    ) -> DeviceResult<RoutingOutcome> {
        let coupling = self.routing_graph().subgraph(|q| qubits.contains(q));
        self.route_on(circuit, initial, &coupling)
    }

    fn routing_graph(&self) -> CouplingMap {
        let connectivity = self.metadata.connectivity();
        if self.metadata.has_resonators() {
            connectivity.with_resonators_collapsed()
        } else {
            connectivity.clone()
        }
    }

    fn route_on(
        &self,
        circuit: &Circuit,
        initial: Option<&Layout>,
        coupling: &CouplingMap,
    ) -> DeviceResult<RoutingOutcome> {
        let mut outcome = route_preserving_measurements(&GreedyRouter, circuit, coupling, initial)?;
        if self.metadata.has_resonators() {
            let decomposed = self.decompose_circuit(&outcome.circuit)?;
            outcome.circuit = moves::insert_moves(&decomposed, &self.metadata)?;
        }
        debug!(
            "Routed circuit on {} qubits into {} operations",
            outcome.initial_mapping.len(),
            outcome.circuit.num_operations()
        );
        Ok(outcome)
    }

    /// Parse a name-based partial placement.
    ///
    /// Two logical qubits placed on the same physical qubit is an error.
    pub fn layout_from_names(&self, mapping: &BTreeMap<String, String>) -> DeviceResult<Layout> {
        let mut layout = Layout::new();
        for (logical, physical) in mapping {
            let physical = self
                .qubits()
                .iter()
                .find(|q| q.name == *physical)
                .cloned()
                .ok_or_else(|| DeviceError::QubitNotOnDevice(Qubit::named(physical.as_str())))?;
            if let Some(other) = layout.get_logical(&physical) {
                return Err(DeviceError::RoutingImpossible(format!(
                    "initial mapping places both {other} and {logical} on {physical}"
                )));
            }
            layout.add(Qubit::named(logical.as_str()), physical);
        }
        Ok(layout)
    }

    // =========================================================================
    // Simplification and full pipeline
    // =========================================================================

    /// Simplify a circuit, preserving measurement statistics.
    pub fn simplify_circuit(
        &self,
        circuit: Circuit,
        options: SimplifyOptions,
    ) -> DeviceResult<Circuit> {
        Ok(iqm_compile::simplify_circuit(circuit, options)?)
    }

    /// Compile a circuit for the device.
    ///
    /// Runs decompose, route, decompose, the optional simplifier and a
    /// last decompose, then validates the result.
    #[instrument(skip(self, circuit, options), fields(device = %self.name))]
    pub fn transpile(
        &self,
        circuit: &Circuit,
        options: &TranspileOptions,
    ) -> DeviceResult<RoutingOutcome> {
        let initial = options
            .initial_mapping
            .as_ref()
            .map(|m| self.layout_from_names(m))
            .transpose()?;

        let decomposed = self.decompose_circuit(circuit)?;
        let mut outcome = self.route_circuit(&decomposed, initial.as_ref())?;
        let mut compiled = self.decompose_circuit(&outcome.circuit)?;
        if let Some(simplify) = options.simplify {
            compiled = self.simplify_circuit(compiled, simplify)?;
            compiled = self.decompose_circuit(&compiled)?;
        }
        self.validate_circuit(&compiled)?;

        info!(
            "Transpiled for {}: {} ops (depth {}) -> {} ops (depth {})",
            self.name,
            circuit.num_operations(),
            circuit.depth(),
            compiled.num_operations(),
            compiled.depth()
        );
        outcome.circuit = compiled;
        Ok(outcome)
    }
}
