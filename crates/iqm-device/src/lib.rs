//! IQM Device Abstraction
//!
//! This crate describes IQM quantum devices and compiles circuits for them.
//! A device is plain data, a [`DeviceMetadata`] value with qubits,
//! connectivity, native gates and supported loci, wrapped in a [`Device`]
//! that validates, decomposes, routes and simplifies circuits against it.
//!
//! # Supported Devices
//!
//! | Device | Qubits | Native two-qubit gate |
//! |--------|--------|-----------------------|
//! | Adonis | 5 (star) | CZ |
//! | Valkmusa | 2 | iSWAP powers |
//! | Apollo | 20 (square lattice) | CZ |
//! | Aphrodite | 54 (square lattice) | CZ |
//!
//! Devices reported by the execution service are loaded from their
//! [`ArchitectureDescriptor`], including devices whose qubits interact
//! through computational resonators.
//!
//! # Example: Transpiling a Circuit
//!
//! ```rust
//! use iqm_device::{TranspileOptions, devices, serialize_circuit};
//! use iqm_ir::Circuit;
//!
//! let device = devices::adonis().unwrap();
//! let circuit = Circuit::ghz(3).unwrap();
//!
//! let outcome = device.transpile(&circuit, &TranspileOptions::default()).unwrap();
//! device.validate_circuit(&outcome.circuit).unwrap();
//!
//! let wire = serialize_circuit(&outcome.circuit).unwrap();
//! assert_eq!(wire.instructions.last().unwrap().name, "measure");
//! ```
//!
//! # Example: Loading an Architecture
//!
//! ```rust
//! use iqm_device::{ArchitectureDescriptor, Device};
//!
//! let arch = ArchitectureDescriptor::from_json(r#"{
//!     "qubits": ["QB1", "QB2"],
//!     "gates": {
//!         "prx": {"loci": [["QB1"], ["QB2"]]},
//!         "cz": {"loci": [["QB1", "QB2"]]},
//!         "measure": {"loci": [["QB1"], ["QB2"]]}
//!     }
//! }"#).unwrap();
//! let device = Device::from_architecture("Custom", &arch).unwrap();
//! assert_eq!(device.qubits().len(), 2);
//! ```

pub mod architecture;
pub mod device;
pub mod devices;
pub mod error;
pub mod metadata;
pub mod moves;
pub mod rules;
pub mod serialize;

pub use architecture::{ArchitectureDescriptor, GateInfo, families_for_operation, operation_name};
pub use device::{Device, TranspileOptions};
pub use error::{DeviceError, DeviceResult};
pub use metadata::{DeviceMetadata, Locus};
pub use moves::{insert_moves, validate_move, validate_moves};
pub use rules::{DecompositionRules, RuleFn};
pub use serialize::{
    Instruction, SERIALIZED_CIRCUIT_NAME, WireCircuit, deserialize_circuit,
    instruction_to_operation, map_operation, serialize_circuit,
};
