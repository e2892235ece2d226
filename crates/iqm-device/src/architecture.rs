//! Architecture descriptors reported by the execution service.
//!
//! A descriptor lists the qubits and computational resonators of a device
//! together with, for every supported operation name, the loci on which the
//! operation may be applied:
//!
//! ```json
//! {
//!   "calibration_set_id": "26c5e70f-bea0-43af-bd37-6212ec7d04cb",
//!   "qubits": ["QB1", "QB2"],
//!   "computational_resonators": [],
//!   "gates": {
//!     "prx": { "loci": [["QB1"], ["QB2"]] },
//!     "cz": { "loci": [["QB1", "QB2"]] },
//!     "measure": { "loci": [["QB1"], ["QB2"]] }
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use iqm_ir::GateFamily;

use crate::error::DeviceResult;

/// Loci of one operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateInfo {
    /// Component tuples the operation may act on.
    #[serde(default)]
    pub loci: Vec<Vec<String>>,
}

/// Description of a device as reported by the execution service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchitectureDescriptor {
    /// Calibration set the description belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calibration_set_id: Option<String>,
    /// Qubit names.
    pub qubits: Vec<String>,
    /// Computational resonator names.
    #[serde(default)]
    pub computational_resonators: Vec<String>,
    /// Supported operations by name.
    #[serde(default)]
    pub gates: BTreeMap<String, GateInfo>,
}

impl ArchitectureDescriptor {
    /// Parse a descriptor from JSON.
    pub fn from_json(json: &str) -> DeviceResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Render the descriptor as pretty-printed JSON.
    pub fn to_json(&self) -> DeviceResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check if a component name is a computational resonator.
    pub fn is_resonator(&self, name: &str) -> bool {
        self.computational_resonators.iter().any(|r| r == name)
    }
}

/// Gate families an operation name stands for.
///
/// `prx` covers the whole phased-X family; the X and Y powers are its
/// special cases with phase 0 and ½.
pub fn families_for_operation(name: &str) -> &'static [GateFamily] {
    match name {
        "prx" => &[GateFamily::PhasedXPow, GateFamily::XPow, GateFamily::YPow],
        "cz" => &[GateFamily::CZPow],
        "move" => &[GateFamily::Move],
        "measure" => &[GateFamily::Measure],
        _ => &[],
    }
}

/// Operation name of a gate family, if it has one.
pub fn operation_name(family: GateFamily) -> Option<&'static str> {
    match family {
        GateFamily::PhasedXPow | GateFamily::XPow | GateFamily::YPow => Some("prx"),
        GateFamily::CZPow => Some("cz"),
        GateFamily::Move => Some("move"),
        GateFamily::Measure => Some("measure"),
        _ => None,
    }
}
