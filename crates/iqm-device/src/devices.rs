//! Static IQM architectures.
//!
//! Qubits are named `QB1..QBn`; couplings are given by 1-based index.

use iqm_compile::{Gateset, NativeGate};
use iqm_ir::GateFamily;

use crate::device::Device;
use crate::error::{DeviceError, DeviceResult};
use crate::metadata::DeviceMetadata;

/// Names accepted by [`by_name`].
pub const DEVICE_NAMES: [&str; 4] = ["adonis", "valkmusa", "apollo", "aphrodite"];

/// Five qubits in a star around QB3.
///
/// ```text
///         QB1
///          |
///   QB2 - QB3 - QB4
///          |
///         QB5
/// ```
pub const ADONIS_EDGES: [(u32, u32); 4] = [(1, 3), (2, 3), (4, 3), (5, 3)];

/// Two qubits with a native iSWAP coupler.
pub const VALKMUSA_EDGES: [(u32, u32); 1] = [(1, 2)];

/// Twenty qubits on a square lattice.
pub const APOLLO_EDGES: [(u32, u32); 30] = [
    (1, 2),
    (1, 4),
    (2, 5),
    (3, 4),
    (3, 8),
    (4, 5),
    (4, 9),
    (5, 6),
    (5, 10),
    (6, 7),
    (6, 11),
    (7, 12),
    (8, 9),
    (8, 13),
    (9, 10),
    (9, 14),
    (10, 11),
    (10, 15),
    (11, 12),
    (11, 16),
    (12, 17),
    (13, 14),
    (14, 15),
    (14, 18),
    (15, 16),
    (15, 19),
    (16, 17),
    (16, 20),
    (18, 19),
    (19, 20),
];

/// Fifty-four qubits on a square lattice.
pub const APHRODITE_EDGES: [(u32, u32); 90] = [
    (1, 2),
    (1, 5),
    (2, 6),
    (3, 4),
    (3, 9),
    (4, 5),
    (4, 10),
    (5, 6),
    (5, 11),
    (6, 7),
    (6, 12),
    (7, 13),
    (8, 9),
    (8, 16),
    (9, 10),
    (9, 17),
    (10, 11),
    (10, 18),
    (11, 12),
    (11, 19),
    (12, 13),
    (12, 20),
    (13, 14),
    (13, 21),
    (14, 22),
    (15, 16),
    (15, 23),
    (16, 17),
    (16, 24),
    (17, 18),
    (17, 25),
    (18, 19),
    (18, 26),
    (19, 20),
    (19, 27),
    (20, 21),
    (20, 28),
    (21, 22),
    (21, 29),
    (22, 30),
    (23, 24),
    (24, 25),
    (24, 32),
    (25, 26),
    (25, 33),
    (26, 27),
    (26, 34),
    (27, 28),
    (27, 35),
    (28, 29),
    (28, 36),
    (29, 30),
    (29, 37),
    (30, 31),
    (30, 38),
    (31, 39),
    (32, 33),
    (32, 40),
    (33, 34),
    (33, 41),
    (34, 35),
    (34, 42),
    (35, 36),
    (35, 43),
    (36, 37),
    (36, 44),
    (37, 38),
    (37, 45),
    (38, 39),
    (38, 46),
    (40, 41),
    (41, 42),
    (41, 47),
    (42, 43),
    (42, 48),
    (43, 44),
    (43, 49),
    (44, 45),
    (44, 50),
    (45, 46),
    (45, 51),
    (47, 48),
    (48, 49),
    (48, 52),
    (49, 50),
    (49, 53),
    (50, 51),
    (50, 54),
    (52, 53),
    (53, 54),
];

/// IQM Adonis.
pub fn adonis() -> DeviceResult<Device> {
    let metadata = DeviceMetadata::from_qubit_indices(5, &ADONIS_EDGES)?;
    Ok(Device::new("Adonis", metadata))
}

/// IQM Valkmusa.
pub fn valkmusa() -> DeviceResult<Device> {
    let gateset = Gateset::new([
        NativeGate::Family(GateFamily::PhasedXPow),
        NativeGate::Family(GateFamily::XPow),
        NativeGate::Family(GateFamily::YPow),
        NativeGate::Family(GateFamily::ISwapPow),
        NativeGate::Family(GateFamily::Measure),
    ]);
    let metadata = DeviceMetadata::from_qubit_indices(2, &VALKMUSA_EDGES)?.with_gateset(gateset);
    Ok(Device::new("Valkmusa", metadata))
}

/// IQM Apollo.
pub fn apollo() -> DeviceResult<Device> {
    let metadata = DeviceMetadata::from_qubit_indices(20, &APOLLO_EDGES)?;
    Ok(Device::new("Apollo", metadata))
}

/// IQM Aphrodite.
pub fn aphrodite() -> DeviceResult<Device> {
    let metadata = DeviceMetadata::from_qubit_indices(54, &APHRODITE_EDGES)?;
    Ok(Device::new("Aphrodite", metadata))
}

/// Look up a static architecture by case-insensitive name.
pub fn by_name(name: &str) -> DeviceResult<Device> {
    match name.to_ascii_lowercase().as_str() {
        "adonis" => adonis(),
        "valkmusa" => valkmusa(),
        "apollo" => apollo(),
        "aphrodite" => aphrodite(),
        _ => Err(DeviceError::UnknownDevice(name.to_string())),
    }
}
