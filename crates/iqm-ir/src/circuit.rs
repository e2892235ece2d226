//! Circuits as ordered sequences of moments.

use ndarray::Array2;
use num_complex::Complex64;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::error::{IrError, IrResult};
use crate::gate::Gate;
use crate::moment::Moment;
use crate::operation::{Operation, OperationKind};
use crate::qubit::Qubit;
use crate::unitary::{apply_matrix, gate_matrix};

/// Largest circuit width for which a dense unitary is computed.
pub const MAX_UNITARY_QUBITS: usize = 12;

/// A quantum circuit.
///
/// Circuits are values: transformations build new circuits instead of
/// mutating shared ones, and equality is structural over the moments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Circuit {
    moments: Vec<Moment>,
}

impl Circuit {
    /// Create a new empty circuit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a circuit from moments.
    pub fn from_moments(moments: impl IntoIterator<Item = Moment>) -> Self {
        Self {
            moments: moments.into_iter().collect(),
        }
    }

    /// Create a circuit by appending operations with earliest insertion.
    pub fn from_operations(operations: impl IntoIterator<Item = Operation>) -> IrResult<Self> {
        let mut circuit = Self::new();
        for op in operations {
            circuit.push(op)?;
        }
        Ok(circuit)
    }

    // =========================================================================
    // Building
    // =========================================================================

    /// Append an operation into the earliest moment after the last one
    /// touching any of its qubits.
    pub fn push(&mut self, op: Operation) -> IrResult<&mut Self> {
        let index = self
            .moments
            .iter()
            .rposition(|m| op.qubits.iter().any(|q| m.operates_on(q)))
            .map_or(0, |i| i + 1);
        // An operation without qubits always starts a new moment.
        let index = if op.qubits.is_empty() {
            self.moments.len()
        } else {
            index
        };
        if index == self.moments.len() {
            self.moments.push(Moment::new());
        }
        self.moments[index].add(op)?;
        Ok(self)
    }

    /// Append a whole moment.
    pub fn push_moment(&mut self, moment: Moment) -> &mut Self {
        self.moments.push(moment);
        self
    }

    /// Apply a gate.
    pub fn gate(
        &mut self,
        gate: Gate,
        qubits: impl IntoIterator<Item = Qubit>,
    ) -> IrResult<&mut Self> {
        self.push(Operation::gate(gate, qubits)?)
    }

    /// Apply Hadamard gate.
    pub fn h(&mut self, qubit: Qubit) -> IrResult<&mut Self> {
        self.gate(Gate::h(), [qubit])
    }

    /// Apply Pauli-X gate.
    pub fn x(&mut self, qubit: Qubit) -> IrResult<&mut Self> {
        self.gate(Gate::x(), [qubit])
    }

    /// Apply CNOT gate.
    pub fn cnot(&mut self, control: Qubit, target: Qubit) -> IrResult<&mut Self> {
        self.gate(Gate::cnot(), [control, target])
    }

    /// Apply CZ gate.
    pub fn cz(&mut self, a: Qubit, b: Qubit) -> IrResult<&mut Self> {
        self.gate(Gate::cz(), [a, b])
    }

    /// Measure qubits under a key.
    pub fn measure(
        &mut self,
        key: impl Into<String>,
        qubits: impl IntoIterator<Item = Qubit>,
    ) -> IrResult<&mut Self> {
        self.push(Operation::measure(key, qubits)?)
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    /// Get the moments of this circuit.
    #[inline]
    pub fn moments(&self) -> &[Moment] {
        &self.moments
    }

    /// Consume the circuit, yielding its moments.
    pub fn into_moments(self) -> Vec<Moment> {
        self.moments
    }

    /// Iterate over all operations in moment order.
    pub fn all_operations(&self) -> impl Iterator<Item = &Operation> {
        self.moments.iter().flat_map(|m| m.operations().iter())
    }

    /// Get all qubits touched by the circuit, sorted.
    pub fn all_qubits(&self) -> Vec<Qubit> {
        self.all_operations()
            .flat_map(|op| op.qubits.iter().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Total number of operations.
    pub fn num_operations(&self) -> usize {
        self.moments.iter().map(Moment::len).sum()
    }

    /// Number of moments.
    #[inline]
    pub fn depth(&self) -> usize {
        self.moments.len()
    }

    /// Check if the circuit has no moments.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.moments.is_empty()
    }

    /// Measurement keys in moment order, duplicates included.
    pub fn measurement_keys(&self) -> Vec<&str> {
        self.all_operations()
            .filter_map(Operation::measurement_key)
            .collect()
    }

    /// Find the first operation on `qubit` at or after `from_moment`.
    pub fn next_operation_on(
        &self,
        qubit: &Qubit,
        from_moment: usize,
    ) -> Option<(usize, &Operation)> {
        self.moments
            .iter()
            .enumerate()
            .skip(from_moment)
            .find_map(|(i, m)| m.operation_at(qubit).map(|op| (i, op)))
    }

    /// Collect operations reachable forward from `from_moment` on `qubits`
    /// before a blocking operation is met.
    ///
    /// An operation blocks when `is_blocker` holds for it or when it also
    /// acts on a qubit outside the still-active set; its qubits then stop
    /// being followed.
    pub fn find_operations_until_blocked(
        &self,
        from_moment: usize,
        qubits: &[Qubit],
        is_blocker: impl Fn(&Operation) -> bool,
    ) -> Vec<(usize, &Operation)> {
        let mut active: FxHashSet<&Qubit> = qubits.iter().collect();
        let mut found = vec![];
        for (i, moment) in self.moments.iter().enumerate().skip(from_moment) {
            if active.is_empty() {
                break;
            }
            for op in moment.operations() {
                if !op.qubits.iter().any(|q| active.contains(q)) {
                    continue;
                }
                if is_blocker(op) || !op.qubits.iter().all(|q| active.contains(q)) {
                    for q in &op.qubits {
                        active.remove(q);
                    }
                } else {
                    found.push((i, op));
                }
            }
        }
        found
    }

    /// Check that no operation follows a measurement on the same qubit.
    pub fn are_all_measurements_terminal(&self) -> bool {
        self.moments.iter().enumerate().all(|(i, moment)| {
            moment
                .operations()
                .iter()
                .filter(|op| op.is_measurement())
                .all(|op| {
                    op.qubits
                        .iter()
                        .all(|q| self.next_operation_on(q, i + 1).is_none())
                })
        })
    }

    // =========================================================================
    // Transformation
    // =========================================================================

    /// Substitute every qubit through `f`, keeping the moment structure.
    pub fn map_qubits(&self, mut f: impl FnMut(&Qubit) -> Qubit) -> IrResult<Self> {
        let mut moments = Vec::with_capacity(self.moments.len());
        for moment in &self.moments {
            let ops = moment
                .operations()
                .iter()
                .map(|op| op.map_qubits(&mut f))
                .collect::<IrResult<Vec<_>>>()?;
            moments.push(Moment::from_operations(ops)?);
        }
        Ok(Self { moments })
    }

    /// Drop moments without operations.
    #[must_use]
    pub fn without_empty_moments(&self) -> Self {
        Self {
            moments: self
                .moments
                .iter()
                .filter(|m| !m.is_empty())
                .cloned()
                .collect(),
        }
    }

    // =========================================================================
    // Unitary
    // =========================================================================

    /// Dense unitary over [`Circuit::all_qubits`].
    pub fn unitary(&self) -> IrResult<Array2<Complex64>> {
        self.unitary_on(&self.all_qubits())
    }

    /// Dense unitary with rows indexed by `qubits` in big-endian order.
    ///
    /// Every qubit the circuit touches must appear in `qubits`. Barriers act
    /// as identity; measurements and resets are rejected.
    pub fn unitary_on(&self, qubits: &[Qubit]) -> IrResult<Array2<Complex64>> {
        let n = qubits.len();
        if n > MAX_UNITARY_QUBITS {
            return Err(IrError::TooManyQubits {
                got: n,
                limit: MAX_UNITARY_QUBITS,
            });
        }
        let mut state = Array2::<Complex64>::eye(1 << n);
        for op in self.all_operations() {
            let gate = match &op.kind {
                OperationKind::Gate(g) => g,
                OperationKind::Barrier => continue,
                OperationKind::Measure { .. } | OperationKind::Reset => {
                    return Err(IrError::NonUnitary(op.to_string()));
                }
            };
            let targets = op
                .qubits
                .iter()
                .map(|q| {
                    qubits
                        .iter()
                        .position(|x| x == q)
                        .ok_or_else(|| IrError::UnknownQubit(q.clone()))
                })
                .collect::<IrResult<Vec<_>>>()?;
            apply_matrix(&mut state, &gate_matrix(gate), &targets, n);
        }
        Ok(state)
    }

    // =========================================================================
    // Standard circuits
    // =========================================================================

    /// Bell state preparation and measurement on `q0`, `q1`.
    pub fn bell() -> IrResult<Self> {
        let mut circuit = Self::new();
        circuit
            .h(Qubit::line(0))?
            .cnot(Qubit::line(0), Qubit::line(1))?
            .measure("m", [Qubit::line(0), Qubit::line(1)])?;
        Ok(circuit)
    }

    /// GHZ state preparation and measurement on `n` line qubits.
    pub fn ghz(n: u32) -> IrResult<Self> {
        let mut circuit = Self::new();
        if n == 0 {
            return Ok(circuit);
        }
        circuit.h(Qubit::line(0))?;
        for i in 1..n {
            circuit.cnot(Qubit::line(i - 1), Qubit::line(i))?;
        }
        circuit.measure("m", (0..n).map(Qubit::line))?;
        Ok(circuit)
    }
}

impl fmt::Display for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, moment) in self.moments.iter().enumerate() {
            write!(f, "{i:>3}:")?;
            for op in moment.operations() {
                write!(f, " {op}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
