//! Target-agnostic compilation passes.
//!
//! These passes operate purely on the circuit structure without consulting
//! target properties. They are safe to run on any circuit.

pub mod optimization;

pub use optimization::{
    DropEmptyMoments, DropRzBeforeMeasurement, EjectZ, MergeOneParameterGates,
    MergeSingleQubitGates,
};
