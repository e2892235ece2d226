//! IQM Compilation Framework
//!
//! This crate provides the device-independent compilation machinery used to
//! turn arbitrary circuits into circuits an IQM device accepts. It follows a
//! pass-based architecture: every stage is a function from circuit to
//! circuit, and stages are composed by a [`PassManager`].
//!
//! # Overview
//!
//! 1. **Decomposition**: rewrite non-native gates with a device rule table,
//!    falling back to the generic rules of [`iqm_ir::default_decomposition`]
//! 2. **Routing**: place logical qubits on physical qubits and insert SWAP
//!    gates so every two-qubit gate acts on a coupled pair
//! 3. **Simplification**: merge, commute and drop gates until the circuit
//!    stops changing
//!
//! # Architecture
//!
//! ```text
//! Input Circuit
//!       │
//!       ▼
//! CircuitDecomposer ◄── OperationDecomposer (device rules) + keep predicate
//!       │
//!       ▼
//! route_preserving_measurements ◄── Router + CouplingMap + partial Layout
//!       │
//!       ▼
//! simplify_circuit
//!       ├── MergeOneParameterGates
//!       ├── MergeSingleQubitGates       repeated to a fixed point
//!       ├── EjectZ
//!       ├── DropEmptyMoments
//!       └── DropRzBeforeMeasurement     once, at the end
//!       │
//!       ▼
//! Output Circuit (device-compatible)
//! ```
//!
//! # Example: Routing and Simplification
//!
//! ```rust
//! use iqm_compile::{CouplingMap, GreedyRouter, SimplifyOptions};
//! use iqm_compile::{route_preserving_measurements, simplify_circuit};
//! use iqm_ir::Circuit;
//!
//! let circuit = Circuit::ghz(4).unwrap();
//! let coupling = CouplingMap::star(5);
//!
//! let routed = route_preserving_measurements(&GreedyRouter, &circuit, &coupling, None).unwrap();
//! assert_eq!(routed.circuit.measurement_keys(), vec!["m"]);
//!
//! let simplified = simplify_circuit(routed.circuit, SimplifyOptions::default()).unwrap();
//! println!("Compiled depth: {}", simplified.depth());
//! ```
//!
//! # Custom Passes
//!
//! Implement the [`Pass`] trait to create custom compilation passes:
//!
//! ```rust
//! use iqm_compile::{CompileResult, Pass, PassKind, PropertySet};
//! use iqm_ir::Circuit;
//!
//! struct MyCustomPass;
//!
//! impl Pass for MyCustomPass {
//!     fn name(&self) -> &str { "my_custom_pass" }
//!     fn kind(&self) -> PassKind { PassKind::Transformation }
//!
//!     fn run(&self, circuit: Circuit, props: &mut PropertySet) -> CompileResult<Circuit> {
//!         // Your pass logic here
//!         Ok(circuit)
//!     }
//! }
//! ```

pub mod decompose;
pub mod error;
pub mod manager;
pub mod pass;
pub mod property;
pub mod simplify;

// Built-in passes
pub mod passes;

pub use decompose::{CircuitDecomposer, DEFAULT_MAX_DEPTH, NoRules, OperationDecomposer};
pub use error::{CompileError, CompileResult};
pub use manager::{FixedPointReport, PassManager};
pub use pass::{Pass, PassKind};
pub use passes::{
    DropEmptyMoments, DropRzBeforeMeasurement, EjectZ, GreedyRouter, MergeOneParameterGates,
    MergeSingleQubitGates, Router, RoutingOutcome, find_non_terminal_measurement, greedy_layout,
    route_preserving_measurements,
};
pub use property::{CouplingMap, Gateset, Layout, NativeGate, PropertySet};
pub use simplify::{
    DEFAULT_MAX_ROUNDS, SimplifyOptions, SimplifyStats, simplify_circuit, simplify_with_properties,
};
