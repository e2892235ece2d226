//! Operations: gates and other instructions applied to qubits.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{IrError, IrResult};
use crate::gate::{Gate, GateFamily};
use crate::qubit::Qubit;

/// The kind of an operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OperationKind {
    /// A unitary gate.
    Gate(Gate),
    /// Computational-basis measurement of one or more qubits.
    Measure {
        /// Measurement key, unique within a circuit.
        key: String,
    },
    /// Reset to |0⟩.
    Reset,
    /// Barrier (synchronization point).
    Barrier,
}

/// An operation applied to an ordered tuple of qubits.
///
/// Deserialization goes through the same arity and distinct-qubit checks as
/// the constructors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawOperation")]
pub struct Operation {
    /// What the operation does.
    pub kind: OperationKind,
    /// Qubits the operation acts on, in gate order.
    pub qubits: Vec<Qubit>,
    /// Opaque bookkeeping tags, ignored by all transformations.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// Unchecked wire form of an [`Operation`].
#[derive(Deserialize)]
struct RawOperation {
    kind: OperationKind,
    qubits: Vec<Qubit>,
    #[serde(default)]
    tags: Vec<String>,
}

impl TryFrom<RawOperation> for Operation {
    type Error = IrError;

    fn try_from(raw: RawOperation) -> IrResult<Self> {
        let op = match raw.kind {
            OperationKind::Gate(gate) => Self::gate(gate, raw.qubits)?,
            OperationKind::Measure { key } => Self::measure(key, raw.qubits)?,
            OperationKind::Barrier => Self::barrier(raw.qubits)?,
            OperationKind::Reset => match <[Qubit; 1]>::try_from(raw.qubits) {
                Ok([qubit]) => Self::reset(qubit),
                Err(qubits) => {
                    return Err(IrError::QubitCountMismatch {
                        gate_name: "reset".into(),
                        expected: 1,
                        got: qubits.len(),
                    });
                }
            },
        };
        Ok(Self {
            tags: raw.tags,
            ..op
        })
    }
}

impl Operation {
    /// Apply a gate to qubits.
    pub fn gate(gate: Gate, qubits: impl IntoIterator<Item = Qubit>) -> IrResult<Self> {
        let qubits: Vec<Qubit> = qubits.into_iter().collect();
        if qubits.len() != gate.num_qubits() {
            return Err(IrError::QubitCountMismatch {
                gate_name: gate.name().into(),
                expected: gate.num_qubits(),
                got: qubits.len(),
            });
        }
        check_distinct(&qubits, Some(gate.name()))?;
        Ok(Self {
            kind: OperationKind::Gate(gate),
            qubits,
            tags: vec![],
        })
    }

    /// Measure qubits under a key.
    pub fn measure(
        key: impl Into<String>,
        qubits: impl IntoIterator<Item = Qubit>,
    ) -> IrResult<Self> {
        let qubits: Vec<Qubit> = qubits.into_iter().collect();
        if qubits.is_empty() {
            return Err(IrError::QubitCountMismatch {
                gate_name: "measure".into(),
                expected: 1,
                got: 0,
            });
        }
        check_distinct(&qubits, Some("measure"))?;
        Ok(Self {
            kind: OperationKind::Measure { key: key.into() },
            qubits,
            tags: vec![],
        })
    }

    /// Reset a qubit.
    pub fn reset(qubit: Qubit) -> Self {
        Self {
            kind: OperationKind::Reset,
            qubits: vec![qubit],
            tags: vec![],
        }
    }

    /// Barrier across qubits.
    pub fn barrier(qubits: impl IntoIterator<Item = Qubit>) -> IrResult<Self> {
        let qubits: Vec<Qubit> = qubits.into_iter().collect();
        check_distinct(&qubits, Some("barrier"))?;
        Ok(Self {
            kind: OperationKind::Barrier,
            qubits,
            tags: vec![],
        })
    }

    /// Attach a tag.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Get the gate, if this is a gate operation.
    pub fn as_gate(&self) -> Option<&Gate> {
        match &self.kind {
            OperationKind::Gate(g) => Some(g),
            _ => None,
        }
    }

    /// Get the measurement key, if this is a measurement.
    pub fn measurement_key(&self) -> Option<&str> {
        match &self.kind {
            OperationKind::Measure { key } => Some(key),
            _ => None,
        }
    }

    /// Check if this is a measurement.
    #[inline]
    pub fn is_measurement(&self) -> bool {
        matches!(self.kind, OperationKind::Measure { .. })
    }

    /// Get the gate family, with measurements reported as [`GateFamily::Measure`].
    pub fn family(&self) -> Option<GateFamily> {
        match &self.kind {
            OperationKind::Gate(g) => Some(g.family()),
            OperationKind::Measure { .. } => Some(GateFamily::Measure),
            OperationKind::Reset | OperationKind::Barrier => None,
        }
    }

    /// Get the name of the operation.
    pub fn name(&self) -> &str {
        match &self.kind {
            OperationKind::Gate(g) => g.name(),
            OperationKind::Measure { .. } => "measure",
            OperationKind::Reset => "reset",
            OperationKind::Barrier => "barrier",
        }
    }

    /// Number of qubits the operation acts on.
    #[inline]
    pub fn num_qubits(&self) -> usize {
        self.qubits.len()
    }

    /// Check if the operation acts on a qubit.
    #[inline]
    pub fn acts_on(&self, qubit: &Qubit) -> bool {
        self.qubits.contains(qubit)
    }

    /// Replace the qubits, keeping kind and tags.
    pub fn with_qubits(&self, qubits: impl IntoIterator<Item = Qubit>) -> IrResult<Self> {
        let qubits: Vec<Qubit> = qubits.into_iter().collect();
        if qubits.len() != self.qubits.len() {
            return Err(IrError::QubitCountMismatch {
                gate_name: self.name().into(),
                expected: self.qubits.len(),
                got: qubits.len(),
            });
        }
        check_distinct(&qubits, Some(self.name()))?;
        Ok(Self {
            kind: self.kind.clone(),
            qubits,
            tags: self.tags.clone(),
        })
    }

    /// Substitute every qubit through `f`.
    pub fn map_qubits(&self, f: impl FnMut(&Qubit) -> Qubit) -> IrResult<Self> {
        self.with_qubits(self.qubits.iter().map(f))
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            OperationKind::Gate(g) => write!(f, "{g}")?,
            OperationKind::Measure { key } => write!(f, "measure[{key}]")?,
            OperationKind::Reset => f.write_str("reset")?,
            OperationKind::Barrier => f.write_str("barrier")?,
        }
        f.write_str("(")?;
        for (i, q) in self.qubits.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{q}")?;
        }
        f.write_str(")")
    }
}

fn check_distinct(qubits: &[Qubit], gate_name: Option<&str>) -> IrResult<()> {
    for (i, q) in qubits.iter().enumerate() {
        if qubits[..i].contains(q) {
            return Err(IrError::DuplicateQubit {
                qubit: q.clone(),
                gate_name: gate_name.map(String::from),
            });
        }
    }
    Ok(())
}
