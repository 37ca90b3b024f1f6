//! Read-only view of the simulator after a completed tick.

use serde::{Deserialize, Serialize};

/// Per-loop values captured in a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControllerSnapshot {
    pub setpoint: f64,
    pub error: f64,
    pub output: f64,
}

/// Simulator state after the most recent `step` (or construction / reset).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub time: f64,
    pub state: Vec<f64>,
    pub inputs: Vec<f64>,
    pub controllers: Vec<ControllerSnapshot>,
}
