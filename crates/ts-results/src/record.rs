//! Flat per-tick record for history and export.

use crate::buffer::Timestamped;
use crate::{ResultsError, ResultsResult};
use serde::{Deserialize, Serialize};
use ts_model::TankModel;
use ts_sim::{ControllerSnapshot, Simulator, Snapshot};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub time_s: f64,
    pub level_m: f64,
    pub inlet_flow: f64,
    pub valve_position: f64,
    pub outlet_flow: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub controllers: Vec<ControllerSnapshot>,
}

impl HistoryRecord {
    pub fn from_snapshot(snapshot: &Snapshot, outlet_flow: f64) -> ResultsResult<Self> {
        let level_m = *snapshot
            .state
            .get(TankModel::LEVEL)
            .ok_or(ResultsError::MalformedSnapshot {
                what: "state",
                len: snapshot.state.len(),
                expected: TankModel::STATE_DIM,
            })?;
        if snapshot.inputs.len() < TankModel::INPUT_DIM {
            return Err(ResultsError::MalformedSnapshot {
                what: "inputs",
                len: snapshot.inputs.len(),
                expected: TankModel::INPUT_DIM,
            });
        }
        Ok(Self {
            time_s: snapshot.time,
            level_m,
            inlet_flow: snapshot.inputs[TankModel::INLET_FLOW],
            valve_position: snapshot.inputs[TankModel::VALVE_POSITION],
            outlet_flow,
            controllers: snapshot.controllers.clone(),
        })
    }

    /// Record the simulator's current tick.
    pub fn capture(sim: &Simulator) -> ResultsResult<Self> {
        Self::from_snapshot(&sim.snapshot(), sim.outlet_flow())
    }
}

impl Timestamped for HistoryRecord {
    fn time_s(&self) -> f64 {
        self.time_s
    }
}
