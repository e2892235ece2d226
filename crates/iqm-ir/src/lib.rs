//! IQM Circuit Intermediate Representation
//!
//! This crate provides the circuit model the IQM compilation stack operates
//! on: named qubits, parametrized gates, operations, moments and circuits,
//! together with dense unitaries for verification and a set of exact
//! device-independent gate decompositions.
//!
//! # Overview
//!
//! A [`Circuit`] is an ordered sequence of [`Moment`]s. Each moment holds
//! [`Operation`]s acting on pairwise-disjoint [`Qubit`]s. Gates follow the
//! eigen-gate convention, so every power gate carries an exponent in half
//! turns and a global shift that fixes its global phase exactly.
//!
//! # Example: Building a Bell State
//!
//! ```rust
//! use iqm_ir::{Circuit, Qubit};
//!
//! let mut circuit = Circuit::new();
//! circuit
//!     .h(Qubit::line(0))?
//!     .cnot(Qubit::line(0), Qubit::line(1))?
//!     .measure("m", [Qubit::line(0), Qubit::line(1)])?;
//!
//! assert_eq!(circuit.depth(), 3);
//! assert_eq!(circuit.measurement_keys(), vec!["m"]);
//! # Ok::<(), iqm_ir::IrError>(())
//! ```
//!
//! # Supported Gates
//!
//! | Gate | Qubits | Description |
//! |------|--------|-------------|
//! | `XPow`, `YPow`, `ZPow` | 1 | Powers of the Pauli gates |
//! | `HPow` | 1 | Powers of Hadamard |
//! | `PhasedXPow` | 1 | X rotation about an equatorial axis |
//! | `PhasedXZ` | 1 | Phased X rotation followed by a Z rotation |
//! | `CZPow`, `CXPow` | 2 | Powers of controlled-Z and CNOT |
//! | `ZZPow`, `ISwapPow`, `SwapPow` | 2 | Powers of ZZ, iSWAP and SWAP |
//! | `CCZPow`, `CCXPow` | 3 | Powers of CCZ and Toffoli |
//! | `Move` | 2 | Qubit to resonator state transfer |

pub mod circuit;
pub mod decompose;
pub mod error;
pub mod gate;
pub mod moment;
pub mod operation;
pub mod qubit;
pub mod unitary;

pub use circuit::Circuit;
pub use decompose::default_decomposition;
pub use error::{IrError, IrResult};
pub use gate::{Gate, GateFamily, Power};
pub use moment::Moment;
pub use operation::{Operation, OperationKind};
pub use qubit::{QUBIT_NAME_PREFIX, Qubit, QubitKind};
pub use unitary::{EPSILON, Unitary2x2};
