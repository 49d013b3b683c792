//! Navigation outputs for mowcore
//!
//! Produces what the external motion controller consumes: ordered coverage
//! swaths for a geofence and the canonical return-to-home action.

pub mod coverage;
pub mod return_home;

pub use coverage::{generate_parallel_lines, CoverageLine};
pub use return_home::{make_action, ActionType, ReturnToHomeAction, WaypointType};
