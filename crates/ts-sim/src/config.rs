//! Configuration bundle consumed by `Simulator::new`.

use crate::clock::DtBounds;
use crate::error::SimResult;
use crate::sim::Simulator;
use serde::{Deserialize, Serialize};
use ts_controls::Gains;
use ts_model::{TankModel, TankParameters};

/// One feedback loop: controller tuning plus its wiring into the state and
/// input vectors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControllerConfig {
    pub gains: Gains,
    #[serde(default)]
    pub bias: f64,
    pub min_output: f64,
    pub max_output: f64,
    pub max_integral: f64,
    /// Index of the measured variable in the state vector.
    pub measured_index: usize,
    /// Index of the manipulated variable in the input vector.
    pub output_index: usize,
    pub initial_setpoint: f64,
    /// Optional first-order filter on the error derivative (seconds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub derivative_filter_s: Option<f64>,
}

impl Default for ControllerConfig {
    /// Reverse-acting level controller driving the outlet valve.
    fn default() -> Self {
        Self {
            gains: Gains::new(-1.0, 10.0, 1.0),
            bias: 0.5,
            min_output: 0.0,
            max_output: 1.0,
            max_integral: 10.0,
            measured_index: TankModel::LEVEL,
            output_index: TankModel::VALVE_POSITION,
            initial_setpoint: 2.5,
            derivative_filter_s: None,
        }
    }
}

/// Everything needed to build a `Simulator`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatorConfig {
    pub model: TankParameters,
    #[serde(default)]
    pub controllers: Vec<ControllerConfig>,
    pub initial_state: Vec<f64>,
    pub initial_inputs: Vec<f64>,
    /// Fixed time step (seconds).
    pub dt: f64,
    #[serde(default)]
    pub dt_bounds: DtBounds,
}

impl Default for SimulatorConfig {
    /// Tank at its nominal level of 2.5 m, balanced by 1.0 m^3/s inflow through
    /// a half-open valve, with one level controller on the valve.
    fn default() -> Self {
        Self {
            model: TankParameters::default(),
            controllers: vec![ControllerConfig::default()],
            initial_state: vec![2.5],
            initial_inputs: vec![1.0, 0.5],
            dt: 1.0,
            dt_bounds: DtBounds::default(),
        }
    }
}

impl SimulatorConfig {
    /// Run every construction check without keeping the simulator.
    pub fn validate(&self) -> SimResult<()> {
        Simulator::new(self.clone()).map(|_| ())
    }
}
