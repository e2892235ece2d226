//! Qubit identifiers.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Name prefix of device qubits, followed by their 1-based index.
pub const QUBIT_NAME_PREFIX: &str = "QB";

/// Distinguishes computational qubits from auxiliary resonators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum QubitKind {
    /// A regular two-level qubit.
    Qubit,
    /// A computational resonator used to mediate interactions.
    Resonator,
}

/// A named qubit.
///
/// Qubits are ordered by natural sort of their names, so `QB2 < QB10`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Qubit {
    /// The name of the qubit.
    pub name: String,
    /// Whether this is a qubit or a resonator.
    #[serde(default = "default_kind")]
    pub kind: QubitKind,
}

fn default_kind() -> QubitKind {
    QubitKind::Qubit
}

impl Qubit {
    /// Create a qubit with an arbitrary name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: QubitKind::Qubit,
        }
    }

    /// Create the device qubit with the given 1-based index, e.g. `QB3`.
    pub fn device(index: u32) -> Self {
        Self::named(format!("{QUBIT_NAME_PREFIX}{index}"))
    }

    /// Create a line qubit `q{index}` for device-independent circuits.
    pub fn line(index: u32) -> Self {
        Self::named(format!("q{index}"))
    }

    /// Create a computational resonator.
    pub fn resonator(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: QubitKind::Resonator,
        }
    }

    /// Check if this is a resonator.
    #[inline]
    pub fn is_resonator(&self) -> bool {
        self.kind == QubitKind::Resonator
    }

    /// Numeric index of a device qubit (`QB5` → 5).
    pub fn device_index(&self) -> Option<u32> {
        self.name.strip_prefix(QUBIT_NAME_PREFIX)?.parse().ok()
    }
}

impl fmt::Display for Qubit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl Ord for Qubit {
    fn cmp(&self, other: &Self) -> Ordering {
        natural_cmp(&self.name, &other.name)
            .then_with(|| self.name.cmp(&other.name))
            .then_with(|| self.kind.cmp(&other.kind))
    }
}

impl PartialOrd for Qubit {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Compare two names, treating runs of digits as numbers.
fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut a = a;
    let mut b = b;
    loop {
        match (a.is_empty(), b.is_empty()) {
            (true, true) => return Ordering::Equal,
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            (false, false) => {}
        }
        let (chunk_a, rest_a) = split_chunk(a);
        let (chunk_b, rest_b) = split_chunk(b);
        let a_digits = chunk_a.starts_with(|c: char| c.is_ascii_digit());
        let b_digits = chunk_b.starts_with(|c: char| c.is_ascii_digit());
        let ord = if a_digits && b_digits {
            let ta = chunk_a.trim_start_matches('0');
            let tb = chunk_b.trim_start_matches('0');
            ta.len().cmp(&tb.len()).then_with(|| ta.cmp(tb))
        } else {
            chunk_a.cmp(chunk_b)
        };
        if ord != Ordering::Equal {
            return ord;
        }
        a = rest_a;
        b = rest_b;
    }
}

/// Split off the leading run of digits or non-digits.
fn split_chunk(s: &str) -> (&str, &str) {
    let digits = s.starts_with(|c: char| c.is_ascii_digit());
    let end = s
        .find(|c: char| c.is_ascii_digit() != digits)
        .unwrap_or(s.len());
    s.split_at(end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qubit_display() {
        assert_eq!(format!("{}", Qubit::device(4)), "QB4");
        assert_eq!(format!("{}", Qubit::line(0)), "q0");
        assert_eq!(format!("{}", Qubit::resonator("COMP_R")), "COMP_R");
    }

    #[test]
    fn test_natural_order() {
        let mut qubits = vec![Qubit::device(10), Qubit::device(2), Qubit::device(1)];
        qubits.sort();
        assert_eq!(
            qubits,
            vec![Qubit::device(1), Qubit::device(2), Qubit::device(10)]
        );
        assert!(Qubit::named("Alice") < Qubit::named("Bob"));
    }

    #[test]
    fn test_resonator_is_distinct() {
        let q = Qubit::named("R");
        let r = Qubit::resonator("R");
        assert_ne!(q, r);
        assert!(r.is_resonator());
        assert!(!q.is_resonator());
    }

    #[test]
    fn test_device_index() {
        assert_eq!(Qubit::device(17).device_index(), Some(17));
        assert_eq!(Qubit::named("Alice").device_index(), None);
    }
}
