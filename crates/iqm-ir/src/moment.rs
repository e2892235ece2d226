//! Moments: one time step of a circuit.

use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::operation::Operation;
use crate::qubit::Qubit;

/// A set of operations acting on pairwise-disjoint qubits.
///
/// Operations are kept sorted by their first qubit, so two moments holding
/// the same operations compare equal regardless of insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Operation>", into = "Vec<Operation>")]
pub struct Moment {
    operations: Vec<Operation>,
}

impl Moment {
    /// Create an empty moment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a moment from operations on disjoint qubits.
    pub fn from_operations(operations: impl IntoIterator<Item = Operation>) -> IrResult<Self> {
        let mut moment = Self::new();
        for op in operations {
            moment.add(op)?;
        }
        Ok(moment)
    }

    /// Add an operation, failing if it overlaps an existing one.
    pub fn add(&mut self, op: Operation) -> IrResult<()> {
        if let Some(q) = op.qubits.iter().find(|q| self.operates_on(q)) {
            return Err(IrError::QubitConflict { qubit: q.clone() });
        }
        let pos = self
            .operations
            .partition_point(|existing| existing.qubits.first() <= op.qubits.first());
        self.operations.insert(pos, op);
        Ok(())
    }

    /// Check if an operation could be added without overlap.
    pub fn can_add(&self, op: &Operation) -> bool {
        !op.qubits.iter().any(|q| self.operates_on(q))
    }

    /// Get the operations of this moment.
    #[inline]
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Consume the moment, yielding its operations.
    pub fn into_operations(self) -> Vec<Operation> {
        self.operations
    }

    /// Check if any operation acts on a qubit.
    pub fn operates_on(&self, qubit: &Qubit) -> bool {
        self.operations.iter().any(|op| op.acts_on(qubit))
    }

    /// Get the operation acting on a qubit.
    pub fn operation_at(&self, qubit: &Qubit) -> Option<&Operation> {
        self.operations.iter().find(|op| op.acts_on(qubit))
    }

    /// Iterate over all qubits touched by this moment.
    pub fn qubits(&self) -> impl Iterator<Item = &Qubit> {
        self.operations.iter().flat_map(|op| op.qubits.iter())
    }

    /// Keep only operations matching a predicate.
    #[must_use]
    pub fn filtered(&self, mut keep: impl FnMut(&Operation) -> bool) -> Self {
        Self {
            operations: self
                .operations
                .iter()
                .filter(|op| keep(op))
                .cloned()
                .collect(),
        }
    }

    /// Number of operations.
    #[inline]
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Check if the moment holds no operations.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

impl TryFrom<Vec<Operation>> for Moment {
    type Error = IrError;

    fn try_from(operations: Vec<Operation>) -> IrResult<Self> {
        Self::from_operations(operations)
    }
}

impl From<Moment> for Vec<Operation> {
    fn from(moment: Moment) -> Self {
        moment.operations
    }
}
