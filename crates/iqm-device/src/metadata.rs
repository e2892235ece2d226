//! Device metadata: qubits, couplings and native operations.
//!
//! [`DeviceMetadata`] is an immutable value describing one device. It is
//! built either from a static topology table ([`DeviceMetadata::from_qubit_indices`])
//! or from an [`ArchitectureDescriptor`] fetched from the execution service
//! ([`DeviceMetadata::from_architecture`]).

use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

use iqm_compile::{CouplingMap, Gateset, NativeGate};
use iqm_ir::{Gate, GateFamily, Qubit};

use crate::architecture::{
    ArchitectureDescriptor, GateInfo, families_for_operation, operation_name,
};
use crate::error::{DeviceError, DeviceResult};

/// An ordered tuple of components an operation may act on.
pub type Locus = Vec<Qubit>;

/// Immutable description of a device.
#[derive(Debug, Clone)]
pub struct DeviceMetadata {
    /// Qubits, sorted.
    qubits: Vec<Qubit>,
    /// Computational resonators, sorted.
    resonators: Vec<Qubit>,
    /// Couplings between qubits and resonators.
    connectivity: CouplingMap,
    /// Native gate matchers.
    gateset: Gateset,
    /// Valid loci of each supported family.
    operations: BTreeMap<GateFamily, Vec<Locus>>,
    /// Calibration set the description belongs to.
    calibration_set_id: Option<String>,
}

impl DeviceMetadata {
    /// Create metadata from its parts.
    ///
    /// Every coupling endpoint and locus component must be one of the
    /// given qubits or resonators, couplings must join two distinct
    /// components, and loci must match the arity of their family.
    pub fn new(
        qubits: impl IntoIterator<Item = Qubit>,
        resonators: impl IntoIterator<Item = Qubit>,
        edges: impl IntoIterator<Item = (Qubit, Qubit)>,
        gateset: Gateset,
        operations: BTreeMap<GateFamily, Vec<Locus>>,
    ) -> DeviceResult<Self> {
        let mut qubits: Vec<Qubit> = qubits.into_iter().collect();
        qubits.sort();
        qubits.dedup();
        let mut resonators: Vec<Qubit> = resonators.into_iter().collect();
        resonators.sort();
        resonators.dedup();

        let on_device =
            |q: &Qubit| qubits.binary_search(q).is_ok() || resonators.binary_search(q).is_ok();

        let edges: Vec<(Qubit, Qubit)> = edges.into_iter().collect();
        for (a, b) in &edges {
            if a == b {
                return Err(DeviceError::InvalidArchitecture(format!(
                    "{a} cannot be coupled to itself"
                )));
            }
            if let Some(q) = [a, b].into_iter().find(|q| !on_device(q)) {
                return Err(DeviceError::InvalidArchitecture(format!(
                    "coupling ({a}, {b}) uses unknown component {q}"
                )));
            }
        }
        for (family, loci) in &operations {
            for locus in loci {
                let arity_ok = match locus_arity(*family) {
                    Some(n) => locus.len() == n,
                    None => !locus.is_empty(),
                };
                if !arity_ok {
                    return Err(DeviceError::InvalidArchitecture(format!(
                        "locus of length {} is invalid for {family}",
                        locus.len()
                    )));
                }
                if let Some(q) = locus.iter().find(|q| !on_device(q)) {
                    return Err(DeviceError::InvalidArchitecture(format!(
                        "{family} locus uses unknown component {q}"
                    )));
                }
            }
        }

        let connectivity =
            CouplingMap::from_edges(qubits.iter().chain(resonators.iter()).cloned(), edges);
        Ok(Self {
            qubits,
            resonators,
            connectivity,
            gateset,
            operations,
            calibration_set_id: None,
        })
    }

    /// Create metadata for qubits `QB1..=QBn` coupled by 1-based index pairs.
    ///
    /// The device gets the default IQM gateset: phased-X rotations and
    /// measurement on every qubit and CZ on every coupling.
    pub fn from_qubit_indices(qubit_count: u32, edges: &[(u32, u32)]) -> DeviceResult<Self> {
        let qubits: Vec<Qubit> = (1..=qubit_count).map(Qubit::device).collect();
        let mut pairs = Vec::with_capacity(edges.len());
        for &(a, b) in edges {
            let in_range = |i: u32| (1..=qubit_count).contains(&i);
            if a == b || !in_range(a) || !in_range(b) {
                return Err(DeviceError::InvalidArchitecture(format!(
                    "coupling ({a}, {b}) is invalid for {qubit_count} qubits"
                )));
            }
            pairs.push((Qubit::device(a), Qubit::device(b)));
        }
        let gateset = Gateset::iqm_default();
        let operations = default_operations(&gateset, &qubits, &pairs);
        Self::new(qubits, [], pairs, gateset, operations)
    }

    /// Replace the native gateset.
    ///
    /// The supported loci are recomputed from the qubit couplings:
    /// single-qubit families and measurement act on every qubit, two-qubit
    /// families on every coupling.
    #[must_use]
    pub fn with_gateset(mut self, gateset: Gateset) -> Self {
        let edges = self.qubit_edges();
        self.operations = default_operations(&gateset, &self.qubits, &edges);
        self.gateset = gateset;
        self
    }

    /// Set the calibration set id.
    #[must_use]
    pub fn with_calibration_set_id(mut self, id: impl Into<String>) -> Self {
        self.calibration_set_id = Some(id.into());
        self
    }

    /// Create metadata from an architecture descriptor.
    ///
    /// Connectivity consists of every arity-2 locus of every operation.
    /// Operations without a gate family are ignored; `cz` is native only at
    /// full turn.
    pub fn from_architecture(arch: &ArchitectureDescriptor) -> DeviceResult<Self> {
        let resolve = |name: &String| {
            if arch.is_resonator(name) {
                Qubit::resonator(name.as_str())
            } else {
                Qubit::named(name.as_str())
            }
        };

        let mut edges = vec![];
        let mut operations: BTreeMap<GateFamily, Vec<Locus>> = BTreeMap::new();
        let mut natives = vec![];
        for (name, info) in &arch.gates {
            let loci: Vec<Locus> = info
                .loci
                .iter()
                .map(|locus| locus.iter().map(resolve).collect())
                .collect();
            for locus in &loci {
                if let [a, b] = locus.as_slice() {
                    edges.push((a.clone(), b.clone()));
                }
            }

            let families = families_for_operation(name);
            if families.is_empty() {
                debug!("Ignoring operation '{}' without a gate family", name);
                continue;
            }
            for family in families {
                operations
                    .entry(*family)
                    .or_default()
                    .extend(loci.iter().cloned());
                natives.push(match family {
                    GateFamily::CZPow => NativeGate::Instance(Gate::cz()),
                    other => NativeGate::Family(*other),
                });
            }
        }

        let mut metadata = Self::new(
            arch.qubits.iter().map(|n| Qubit::named(n.as_str())),
            arch.computational_resonators
                .iter()
                .map(|n| Qubit::resonator(n.as_str())),
            edges,
            Gateset::new(natives),
            operations,
        )?;
        metadata.calibration_set_id = arch.calibration_set_id.clone();
        debug!(
            "Loaded architecture with {} qubits, {} resonators",
            metadata.qubits.len(),
            metadata.resonators.len()
        );
        Ok(metadata)
    }

    /// Describe the device as an architecture descriptor.
    ///
    /// Families without an operation name are left out.
    pub fn to_architecture(&self) -> ArchitectureDescriptor {
        let mut gates: BTreeMap<String, GateInfo> = BTreeMap::new();
        for (family, loci) in &self.operations {
            let Some(name) = operation_name(*family) else {
                continue;
            };
            let info = gates.entry(name.to_string()).or_default();
            for locus in loci {
                let names: Vec<String> = locus.iter().map(|q| q.name.clone()).collect();
                if !info.loci.contains(&names) {
                    info.loci.push(names);
                }
            }
        }
        ArchitectureDescriptor {
            calibration_set_id: self.calibration_set_id.clone(),
            qubits: self.qubits.iter().map(|q| q.name.clone()).collect(),
            computational_resonators: self.resonators.iter().map(|r| r.name.clone()).collect(),
            gates,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Qubits, sorted.
    pub fn qubits(&self) -> &[Qubit] {
        &self.qubits
    }

    /// Computational resonators, sorted.
    pub fn resonators(&self) -> &[Qubit] {
        &self.resonators
    }

    /// Check if the device has computational resonators.
    #[inline]
    pub fn has_resonators(&self) -> bool {
        !self.resonators.is_empty()
    }

    /// Check if a component is a qubit or resonator of the device.
    pub fn contains(&self, component: &Qubit) -> bool {
        self.qubits.binary_search(component).is_ok()
            || self.resonators.binary_search(component).is_ok()
    }

    /// Couplings between qubits and resonators.
    pub fn connectivity(&self) -> &CouplingMap {
        &self.connectivity
    }

    /// Native gate matchers.
    pub fn gateset(&self) -> &Gateset {
        &self.gateset
    }

    /// Valid loci by family.
    pub fn operations(&self) -> &BTreeMap<GateFamily, Vec<Locus>> {
        &self.operations
    }

    /// Valid loci of one family.
    pub fn loci(&self, family: GateFamily) -> &[Locus] {
        self.operations.get(&family).map_or(&[], Vec::as_slice)
    }

    /// Calibration set the description belongs to.
    pub fn calibration_set_id(&self) -> Option<&str> {
        self.calibration_set_id.as_deref()
    }

    /// Couplings between two qubits, resonators excluded.
    pub fn qubit_edges(&self) -> Vec<(Qubit, Qubit)> {
        self.connectivity
            .edges()
            .into_iter()
            .filter(|(a, b)| !a.is_resonator() && !b.is_resonator())
            .collect()
    }

    /// Check if `family` may act on `components`.
    ///
    /// Measurements may act on any combination of measurable qubits.
    /// Families symmetric under qubit exchange match a locus in any order;
    /// all others need the exact order.
    pub fn supports_locus(&self, family: GateFamily, components: &[Qubit]) -> bool {
        let loci = self.loci(family);
        if family == GateFamily::Measure {
            let measurable: BTreeSet<&Qubit> = loci.iter().flatten().collect();
            return components.iter().all(|q| measurable.contains(q));
        }
        if family.is_symmetric() {
            let target: BTreeSet<&Qubit> = components.iter().collect();
            return loci.iter().any(|locus| {
                locus.len() == components.len() && locus.iter().collect::<BTreeSet<_>>() == target
            });
        }
        loci.iter().any(|locus| locus.as_slice() == components)
    }
}

impl PartialEq for DeviceMetadata {
    fn eq(&self, other: &Self) -> bool {
        let same_natives = |a: &Gateset, b: &Gateset| {
            a.gates().iter().all(|g| b.gates().contains(g))
                && b.gates().iter().all(|g| a.gates().contains(g))
        };
        self.qubits == other.qubits
            && self.resonators == other.resonators
            && self.connectivity.edges() == other.connectivity.edges()
            && same_natives(&self.gateset, &other.gateset)
            && self.operations == other.operations
            && self.calibration_set_id == other.calibration_set_id
    }
}

/// Locus length of a family, or `None` if any length is valid.
fn locus_arity(family: GateFamily) -> Option<usize> {
    match family {
        GateFamily::Measure | GateFamily::Identity => None,
        GateFamily::XPow
        | GateFamily::YPow
        | GateFamily::ZPow
        | GateFamily::HPow
        | GateFamily::PhasedXPow
        | GateFamily::PhasedXZ => Some(1),
        GateFamily::CZPow
        | GateFamily::CXPow
        | GateFamily::ZZPow
        | GateFamily::ISwapPow
        | GateFamily::SwapPow
        | GateFamily::Move => Some(2),
        GateFamily::CCZPow | GateFamily::CCXPow => Some(3),
    }
}

/// Loci of every gateset family on a resonator-free device.
fn default_operations(
    gateset: &Gateset,
    qubits: &[Qubit],
    edges: &[(Qubit, Qubit)],
) -> BTreeMap<GateFamily, Vec<Locus>> {
    let mut operations = BTreeMap::new();
    for family in gateset.families() {
        let loci: Vec<Locus> = match (family, locus_arity(family)) {
            // MOVE needs resonators.
            (GateFamily::Move, _) => continue,
            (GateFamily::Measure, _) | (_, Some(1)) => {
                qubits.iter().map(|q| vec![q.clone()]).collect()
            }
            (_, Some(2)) => edges
                .iter()
                .map(|(a, b)| vec![a.clone(), b.clone()])
                .collect(),
            _ => continue,
        };
        operations.insert(family, loci);
    }
    operations
}
