//! Target properties shared by compilation stages.
//!
//! This module provides the device-facing data the compiler works against:
//!
//! - [`CouplingMap`]: which physical qubits may interact in two-qubit gates
//! - [`Layout`]: a bijective logical-to-physical qubit assignment
//! - [`Gateset`]: which operations a device executes natively
//! - [`PropertySet`]: typed scratch storage passes use to report results
//!
//! # Examples
//!
//! ```
//! use iqm_compile::{CouplingMap, Gateset};
//! use iqm_ir::{Gate, Operation, Qubit};
//!
//! let coupling = CouplingMap::star(5);
//! assert!(coupling.is_connected(&Qubit::device(1), &Qubit::device(3)));
//! assert_eq!(coupling.distance(&Qubit::device(1), &Qubit::device(2)), Some(2));
//!
//! let gateset = Gateset::iqm_default();
//! let cz = Operation::gate(Gate::cz(), [Qubit::device(1), Qubit::device(3)]).unwrap();
//! assert!(gateset.accepts(&cz));
//! ```

use petgraph::graph::{NodeIndex, UnGraph};
use rustc_hash::FxHashMap;
use std::any::{Any, TypeId};
use std::collections::{BTreeSet, VecDeque};

use iqm_ir::{EPSILON, Gate, GateFamily, Operation, Qubit};

/// A mapping from logical qubits to physical qubits.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Layout {
    /// Map from logical qubit to physical qubit.
    logical_to_physical: FxHashMap<Qubit, Qubit>,
    /// Map from physical qubit to logical qubit.
    physical_to_logical: FxHashMap<Qubit, Qubit>,
}

impl Layout {
    /// Create a new empty layout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a layout from `(logical, physical)` pairs.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (Qubit, Qubit)>) -> Self {
        let mut layout = Self::new();
        for (logical, physical) in pairs {
            layout.add(logical, physical);
        }
        layout
    }

    /// Add a mapping from logical to physical qubit.
    ///
    /// Conflicting older entries for either qubit are removed so both
    /// directions stay consistent.
    pub fn add(&mut self, logical: Qubit, physical: Qubit) {
        if let Some(old_logical) = self.physical_to_logical.get(&physical) {
            if *old_logical != logical {
                let old_logical = old_logical.clone();
                self.logical_to_physical.remove(&old_logical);
            }
        }
        if let Some(old_physical) = self.logical_to_physical.get(&logical) {
            if *old_physical != physical {
                let old_physical = old_physical.clone();
                self.physical_to_logical.remove(&old_physical);
            }
        }
        self.logical_to_physical
            .insert(logical.clone(), physical.clone());
        self.physical_to_logical.insert(physical, logical);
    }

    /// Get the physical qubit for a logical qubit.
    pub fn get_physical(&self, logical: &Qubit) -> Option<&Qubit> {
        self.logical_to_physical.get(logical)
    }

    /// Get the logical qubit for a physical qubit.
    pub fn get_logical(&self, physical: &Qubit) -> Option<&Qubit> {
        self.physical_to_logical.get(physical)
    }

    /// Swap the contents of two physical qubits.
    pub fn swap(&mut self, p1: &Qubit, p2: &Qubit) {
        let l1 = self.physical_to_logical.remove(p1);
        let l2 = self.physical_to_logical.remove(p2);

        if let Some(l1) = l1 {
            self.logical_to_physical.insert(l1.clone(), p2.clone());
            self.physical_to_logical.insert(p2.clone(), l1);
        }
        if let Some(l2) = l2 {
            self.logical_to_physical.insert(l2.clone(), p1.clone());
            self.physical_to_logical.insert(p1.clone(), l2);
        }
    }

    /// Get the number of mapped qubits.
    pub fn len(&self) -> usize {
        self.logical_to_physical.len()
    }

    /// Check if the layout is empty.
    pub fn is_empty(&self) -> bool {
        self.logical_to_physical.is_empty()
    }

    /// `(logical, physical)` pairs sorted by logical qubit.
    pub fn pairs(&self) -> Vec<(Qubit, Qubit)> {
        let mut pairs: Vec<_> = self
            .logical_to_physical
            .iter()
            .map(|(l, p)| (l.clone(), p.clone()))
            .collect();
        pairs.sort();
        pairs
    }
}

/// Target device coupling map.
///
/// An undirected graph over physical qubits whose edges are the pairs
/// allowed to take part in two-qubit gates.
///
/// ## Performance
///
/// On construction, all-pairs distance and predecessor matrices are
/// precomputed with one BFS per node. This gives O(1) `distance()` lookups
/// and O(distance) path reconstruction during routing.
#[derive(Debug, Clone)]
pub struct CouplingMap {
    graph: UnGraph<Qubit, ()>,
    nodes: FxHashMap<Qubit, NodeIndex>,
    /// `dist_matrix[from][to]`, or `u32::MAX` if unreachable.
    dist_matrix: Vec<Vec<u32>>,
    /// `pred_matrix[from][to]` is the node before `to` on a shortest path.
    pred_matrix: Vec<Vec<usize>>,
}

impl CouplingMap {
    /// Create a coupling map over `qubits` with undirected `edges`.
    ///
    /// Edge endpoints missing from `qubits` are added. Duplicate edges,
    /// including reversed pairs, are ignored.
    pub fn from_edges(
        qubits: impl IntoIterator<Item = Qubit>,
        edges: impl IntoIterator<Item = (Qubit, Qubit)>,
    ) -> Self {
        let mut map = Self {
            graph: UnGraph::default(),
            nodes: FxHashMap::default(),
            dist_matrix: vec![],
            pred_matrix: vec![],
        };
        for q in qubits {
            map.node(q);
        }
        for (a, b) in edges {
            let ia = map.node(a);
            let ib = map.node(b);
            if ia != ib && map.graph.find_edge(ia, ib).is_none() {
                map.graph.add_edge(ia, ib, ());
            }
        }
        map.precompute_distances();
        map
    }

    fn node(&mut self, qubit: Qubit) -> NodeIndex {
        if let Some(&idx) = self.nodes.get(&qubit) {
            return idx;
        }
        let idx = self.graph.add_node(qubit.clone());
        self.nodes.insert(qubit, idx);
        idx
    }

    /// Precompute all-pairs shortest paths using BFS from each node.
    fn precompute_distances(&mut self) {
        let n = self.graph.node_count();
        self.dist_matrix = vec![vec![u32::MAX; n]; n];
        self.pred_matrix = vec![vec![usize::MAX; n]; n];

        for src in 0..n {
            self.dist_matrix[src][src] = 0;
            let mut queue = VecDeque::new();
            queue.push_back(NodeIndex::new(src));

            while let Some(current) = queue.pop_front() {
                let cur = current.index();
                // Visit neighbors in qubit order so paths are reproducible.
                let mut neighbors: Vec<NodeIndex> = self.graph.neighbors(current).collect();
                neighbors.sort_by(|a, b| self.graph[*a].cmp(&self.graph[*b]));
                for neighbor in neighbors {
                    let nb = neighbor.index();
                    if self.dist_matrix[src][nb] == u32::MAX {
                        self.dist_matrix[src][nb] = self.dist_matrix[src][cur] + 1;
                        self.pred_matrix[src][nb] = cur;
                        queue.push_back(neighbor);
                    }
                }
            }
        }
    }

    /// Create a linear coupling map `QB1 - QB2 - ... - QBn`.
    pub fn linear(n: u32) -> Self {
        Self::from_edges(
            (1..=n).map(Qubit::device),
            (1..n).map(|i| (Qubit::device(i), Qubit::device(i + 1))),
        )
    }

    /// Create a star coupling map with the middle qubit at the center.
    ///
    /// `star(5)` is the five-qubit topology centered on `QB3`.
    pub fn star(n: u32) -> Self {
        let center = n.div_ceil(2);
        Self::from_edges(
            (1..=n).map(Qubit::device),
            (1..=n)
                .filter(|&i| i != center)
                .map(|i| (Qubit::device(i), Qubit::device(center))),
        )
    }

    /// Check if a qubit is part of the map.
    #[inline]
    pub fn contains(&self, qubit: &Qubit) -> bool {
        self.nodes.contains_key(qubit)
    }

    /// Check if two qubits are directly connected.
    pub fn is_connected(&self, q1: &Qubit, q2: &Qubit) -> bool {
        match (self.nodes.get(q1), self.nodes.get(q2)) {
            (Some(&a), Some(&b)) => self.graph.find_edge(a, b).is_some(),
            _ => false,
        }
    }

    /// Get the number of physical qubits.
    #[inline]
    pub fn num_qubits(&self) -> usize {
        self.graph.node_count()
    }

    /// Get all qubits, sorted.
    pub fn qubits(&self) -> Vec<Qubit> {
        let mut qubits: Vec<Qubit> = self.graph.node_weights().cloned().collect();
        qubits.sort();
        qubits
    }

    /// Get the coupling edges, each ordered and the list sorted.
    pub fn edges(&self) -> Vec<(Qubit, Qubit)> {
        let mut edges: Vec<(Qubit, Qubit)> = self
            .graph
            .edge_indices()
            .filter_map(|e| self.graph.edge_endpoints(e))
            .map(|(a, b)| {
                let (a, b) = (self.graph[a].clone(), self.graph[b].clone());
                if a <= b { (a, b) } else { (b, a) }
            })
            .collect();
        edges.sort();
        edges
    }

    /// Get neighbors of a qubit, sorted.
    pub fn neighbors(&self, qubit: &Qubit) -> Vec<Qubit> {
        let Some(&idx) = self.nodes.get(qubit) else {
            return vec![];
        };
        let mut neighbors: Vec<Qubit> = self
            .graph
            .neighbors(idx)
            .map(|n| self.graph[n].clone())
            .collect();
        neighbors.sort();
        neighbors
    }

    /// O(1) shortest-path distance lookup.
    pub fn distance(&self, from: &Qubit, to: &Qubit) -> Option<u32> {
        let (f, t) = (self.nodes.get(from)?.index(), self.nodes.get(to)?.index());
        let d = self.dist_matrix[f][t];
        if d == u32::MAX { None } else { Some(d) }
    }

    /// Reconstruct a shortest path `from → to`, both ends included.
    pub fn shortest_path(&self, from: &Qubit, to: &Qubit) -> Option<Vec<Qubit>> {
        let (f, t) = (self.nodes.get(from)?.index(), self.nodes.get(to)?.index());
        if self.dist_matrix[f][t] == u32::MAX {
            return None;
        }

        let mut path = vec![to.clone()];
        let mut current = t;
        while current != f {
            let pred = self.pred_matrix[f][current];
            if pred == usize::MAX {
                return None;
            }
            path.push(self.graph[NodeIndex::new(pred)].clone());
            current = pred;
        }
        path.reverse();
        Some(path)
    }

    /// Restrict the map to a subset of qubits.
    #[must_use]
    pub fn subgraph(&self, keep: impl Fn(&Qubit) -> bool) -> Self {
        Self::from_edges(
            self.qubits().into_iter().filter(|q| keep(q)),
            self.edges()
                .into_iter()
                .filter(|(a, b)| keep(a) && keep(b)),
        )
    }

    /// Derived map in which qubits sharing a resonator neighbor are adjacent.
    ///
    /// Resonators are removed; existing qubit-qubit edges are kept.
    #[must_use]
    pub fn with_resonators_collapsed(&self) -> Self {
        let mut edges: BTreeSet<(Qubit, Qubit)> = self
            .edges()
            .into_iter()
            .filter(|(a, b)| !a.is_resonator() && !b.is_resonator())
            .collect();
        for resonator in self.qubits().iter().filter(|q| q.is_resonator()) {
            let coupled: Vec<Qubit> = self
                .neighbors(resonator)
                .into_iter()
                .filter(|q| !q.is_resonator())
                .collect();
            for (i, a) in coupled.iter().enumerate() {
                for b in &coupled[i + 1..] {
                    edges.insert((a.clone(), b.clone()));
                }
            }
        }
        Self::from_edges(
            self.qubits().into_iter().filter(|q| !q.is_resonator()),
            edges,
        )
    }
}

/// A native-gate matcher.
#[derive(Debug, Clone, PartialEq)]
pub enum NativeGate {
    /// Every gate of a family, any parameters.
    Family(GateFamily),
    /// One exact gate.
    Instance(Gate),
}

impl NativeGate {
    /// Check if an operation matches.
    pub fn matches(&self, op: &Operation) -> bool {
        match self {
            NativeGate::Family(family) => op.family() == Some(*family),
            NativeGate::Instance(gate) => op
                .as_gate()
                .is_some_and(|g| gates_equivalent(g, gate)),
        }
    }

    /// Get the family this matcher belongs to.
    pub fn family(&self) -> GateFamily {
        match self {
            NativeGate::Family(f) => *f,
            NativeGate::Instance(g) => g.family(),
        }
    }
}

/// Check if two gates are equal, comparing exponents modulo the family period.
fn gates_equivalent(a: &Gate, b: &Gate) -> bool {
    if a.family() != b.family() {
        return false;
    }
    match (a.power(), b.power()) {
        (Some(pa), Some(pb)) => {
            let exponent_close = match a.family().period() {
                Some(period) => {
                    let d = (pa.exponent - pb.exponent).rem_euclid(period);
                    d < EPSILON || period - d < EPSILON
                }
                None => (pa.exponent - pb.exponent).abs() < EPSILON,
            };
            let phase_close = match (a, b) {
                (
                    Gate::PhasedXPow {
                        phase_exponent: x, ..
                    },
                    Gate::PhasedXPow {
                        phase_exponent: y, ..
                    },
                ) => (x - y).abs() < EPSILON,
                _ => true,
            };
            exponent_close && phase_close && (pa.global_shift - pb.global_shift).abs() < EPSILON
        }
        _ => a == b,
    }
}

/// The set of operations a device executes natively.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Gateset {
    gates: Vec<NativeGate>,
}

impl Gateset {
    /// Create a gateset from matchers.
    pub fn new(gates: impl IntoIterator<Item = NativeGate>) -> Self {
        Self {
            gates: gates.into_iter().collect(),
        }
    }

    /// Native gates of IQM devices with a CZ coupler: PRX-family single-qubit
    /// rotations, measurement and the full CZ.
    pub fn iqm_default() -> Self {
        Self::new([
            NativeGate::Family(GateFamily::PhasedXPow),
            NativeGate::Family(GateFamily::XPow),
            NativeGate::Family(GateFamily::YPow),
            NativeGate::Family(GateFamily::Measure),
            NativeGate::Instance(Gate::cz()),
        ])
    }

    /// Add a matcher.
    #[must_use]
    pub fn with_gate(mut self, gate: NativeGate) -> Self {
        self.gates.push(gate);
        self
    }

    /// Check if an operation is native.
    pub fn accepts(&self, op: &Operation) -> bool {
        self.gates.iter().any(|g| g.matches(op))
    }

    /// Check if any matcher belongs to a family.
    pub fn contains_family(&self, family: GateFamily) -> bool {
        self.gates.iter().any(|g| g.family() == family)
    }

    /// Families covered by the matchers, sorted and deduplicated.
    pub fn families(&self) -> Vec<GateFamily> {
        self.gates
            .iter()
            .map(NativeGate::family)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Get the matchers.
    pub fn gates(&self) -> &[NativeGate] {
        &self.gates
    }
}

/// Typed storage passes use to report results to their callers.
///
/// Each type can have at most one value stored.
#[derive(Debug, Default)]
pub struct PropertySet {
    custom: FxHashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl PropertySet {
    /// Create a new empty property set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a custom property.
    pub fn insert<T: Any + Send + Sync>(&mut self, value: T) {
        self.custom.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Get a custom property.
    pub fn get<T: Any>(&self) -> Option<&T> {
        self.custom
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref())
    }

    /// Get a mutable custom property.
    pub fn get_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.custom
            .get_mut(&TypeId::of::<T>())
            .and_then(|v| v.downcast_mut())
    }

    /// Remove a custom property.
    pub fn remove<T: Any>(&mut self) -> Option<T> {
        self.custom
            .remove(&TypeId::of::<T>())
            .and_then(|v| v.downcast().ok())
            .map(|v| *v)
    }
}
