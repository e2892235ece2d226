//! Built-in compilation passes.
//!
//! Passes are organized into two categories:
//! - [`agnostic`]: passes that operate purely on circuit structure
//! - [`target`]: placement and routing against a device coupling map

pub mod agnostic;
pub mod target;

pub use agnostic::{
    DropEmptyMoments, DropRzBeforeMeasurement, EjectZ, MergeOneParameterGates,
    MergeSingleQubitGates,
};
pub use target::{
    GreedyRouter, Router, RoutingOutcome, find_non_terminal_measurement, greedy_layout,
    route_preserving_measurements,
};
