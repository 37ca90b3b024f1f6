//! Gravity-drained tank with a throttling outlet valve.
//!
//! State: `[h]` liquid height (m).
//! Inputs: `[q_in, x]` inlet flow (m^3/s) and valve position in [0, 1].
//!
//! Outlet flow follows the valve equation `q_out = k_v * x * sqrt(h)` and the
//! level obeys the material balance `dh/dt = (q_in - q_out) / A`.

use crate::error::ModelResult;
use crate::model::ProcessModel;
use nalgebra::DVector;
use serde::{Deserialize, Serialize};
use ts_core::units::{Area, Length, LevelRate, Ratio, VolumeRate, m3ps, mps, unitless};
use ts_core::{ensure_positive, m, m2};

/// Tank geometry and valve characterization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TankParameters {
    /// Cross-sectional area (m^2).
    pub area: f64,
    /// Valve flow coefficient (m^2.5/s).
    #[serde(alias = "k_v")]
    pub valve_coefficient: f64,
    /// Height of the tank wall (m).
    pub max_height: f64,
}

impl TankParameters {
    /// Create validated parameters. All three values must be positive and finite.
    pub fn new(area: f64, valve_coefficient: f64, max_height: f64) -> ModelResult<Self> {
        let params = Self {
            area,
            valve_coefficient,
            max_height,
        };
        params.validate()?;
        Ok(params)
    }

    /// Create parameters from unit-checked quantities.
    pub fn from_quantities(
        area: Area,
        valve_coefficient: f64,
        max_height: Length,
    ) -> ModelResult<Self> {
        use uom::si::area::square_meter;
        use uom::si::length::meter;
        Self::new(
            area.get::<square_meter>(),
            valve_coefficient,
            max_height.get::<meter>(),
        )
    }

    /// Check the positivity constraints. Used again when parameters arrive
    /// through deserialization.
    pub fn validate(&self) -> ModelResult<()> {
        ensure_positive(self.area, "area")?;
        ensure_positive(self.valve_coefficient, "valve_coefficient")?;
        ensure_positive(self.max_height, "max_height")?;
        Ok(())
    }

    pub fn area_quantity(&self) -> Area {
        m2(self.area)
    }

    pub fn max_height_quantity(&self) -> Length {
        m(self.max_height)
    }
}

impl Default for TankParameters {
    fn default() -> Self {
        Self {
            area: 120.0,
            valve_coefficient: 1.2649,
            max_height: 5.0,
        }
    }
}

/// Single-tank level process.
#[derive(Debug, Clone)]
pub struct TankModel {
    params: TankParameters,
}

impl TankModel {
    pub const STATE_DIM: usize = 1;
    pub const INPUT_DIM: usize = 2;

    /// State index of the liquid height.
    pub const LEVEL: usize = 0;
    /// Input index of the inlet flow.
    pub const INLET_FLOW: usize = 0;
    /// Input index of the outlet valve position.
    pub const VALVE_POSITION: usize = 1;

    pub fn new(params: TankParameters) -> ModelResult<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &TankParameters {
        &self.params
    }

    /// Outlet flow `k_v * x * sqrt(max(h, 0))`.
    ///
    /// Exactly zero when the tank is empty (or overshot below zero) or the
    /// valve is shut. A negative valve command is treated as shut.
    pub fn outlet_flow(&self, state: &DVector<f64>, input: &DVector<f64>) -> f64 {
        self.outlet_flow_at(state[Self::LEVEL], input[Self::VALVE_POSITION])
    }

    /// Outlet flow as a volume rate quantity.
    pub fn outlet_flow_rate(&self, state: &DVector<f64>, input: &DVector<f64>) -> VolumeRate {
        m3ps(self.outlet_flow(state, input))
    }

    /// Rate of level change as a quantity.
    pub fn level_rate(&self, state: &DVector<f64>, input: &DVector<f64>) -> LevelRate {
        mps(self.derivative(state, input)[Self::LEVEL])
    }

    /// Inlet flow that holds `height` constant at valve position `valve`.
    pub fn steady_inlet_flow(&self, height: f64, valve: f64) -> f64 {
        self.outlet_flow_at(height, valve)
    }

    /// Fill level relative to the tank wall height.
    pub fn level_fraction(&self, height: f64) -> Ratio {
        unitless(height / self.params.max_height)
    }

    fn outlet_flow_at(&self, height: f64, valve: f64) -> f64 {
        if height <= 0.0 || valve <= 0.0 {
            return 0.0;
        }
        self.params.valve_coefficient * valve * height.sqrt()
    }
}

impl ProcessModel for TankModel {
    fn state_dim(&self) -> usize {
        Self::STATE_DIM
    }

    fn input_dim(&self) -> usize {
        Self::INPUT_DIM
    }

    fn derivative(&self, state: &DVector<f64>, input: &DVector<f64>) -> DVector<f64> {
        debug_assert_eq!(state.len(), Self::STATE_DIM, "tank state length");
        debug_assert_eq!(input.len(), Self::INPUT_DIM, "tank input length");

        let q_in = input[Self::INLET_FLOW];
        let q_out = self.outlet_flow(state, input);
        DVector::from_element(1, (q_in - q_out) / self.params.area)
    }
}
