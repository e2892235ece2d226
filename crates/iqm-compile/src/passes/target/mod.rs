//! Target-specific compilation stages.
//!
//! These stages need the device coupling map and produce circuits acting
//! on physical qubits.

pub mod layout;
pub mod routing;

pub use layout::greedy_layout;
pub use routing::{
    GreedyRouter, Router, RoutingOutcome, find_non_terminal_measurement,
    route_preserving_measurements,
};
