// src/navigation/return_home.rs
// Canonical "go home" action handed to the motion controller, whichever gate
// (charge, weather, operator) asked for it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Kind of waypoint a navigate action targets
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaypointType {
    /// Docking/charging station
    ChargingStation,
    /// Operator-defined home position
    Home,
}

/// Action verb understood by the motion controller
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// Drive to a waypoint
    Navigate,
}

/// Serialized as `{"type": "navigate", "targetWaypointType": "home", "metadata": {}}`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReturnToHomeAction {
    /// Action verb
    #[serde(rename = "type")]
    pub action_type: ActionType,
    /// Waypoint the controller should drive to
    #[serde(rename = "targetWaypointType")]
    pub target_waypoint_type: WaypointType,
    /// Free-form extras for the controller; empty by default
    pub metadata: Map<String, Value>,
}

/// Builds the return-to-home descriptor
pub fn make_action() -> ReturnToHomeAction {
    ReturnToHomeAction {
        action_type: ActionType::Navigate,
        target_waypoint_type: WaypointType::Home,
        metadata: Map::new(),
    }
}
