//! Interactive session around one simulator.

use crate::disturbance::InletDisturbance;
use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use ts_controls::Gains;
use ts_model::TankModel;
use ts_project::{HistoryDef, InletDef, Project};
use ts_results::{HistoryBuffer, HistoryRecord};
use ts_sim::{Simulator, SimulatorConfig};

/// Operator command applied between ticks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    SetSetpoint { controller: usize, value: f64 },
    SetGains { controller: usize, gains: Gains },
    SetInletFlow { value: f64 },
    SetInletMode { inlet: InletDef },
    Reset,
}

/// Operator-facing view of the primary level loop.
///
/// Controller fields are `None` when the session runs open loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub time_s: f64,
    pub level_m: f64,
    pub setpoint: Option<f64>,
    pub inlet_flow: f64,
    pub outlet_flow: f64,
    pub valve_position: f64,
    pub error: Option<f64>,
    pub controller_output: Option<f64>,
}

/// Exclusive owner of a simulator, its history and its inlet disturbance.
///
/// All mutation goes through `&mut self`, so a host that shares a session
/// across threads wraps it in a mutex and ticks and commands serialize there.
#[derive(Debug)]
pub struct Session {
    sim: Simulator,
    history: HistoryBuffer<HistoryRecord>,
    inlet: InletDisturbance,
    record_every: usize,
    ticks: usize,
}

impl Session {
    pub fn new(config: SimulatorConfig, history: HistoryDef, inlet: &InletDef) -> AppResult<Self> {
        if history.record_every == 0 {
            return Err(AppError::InvalidInput(
                "history.record_every must be > 0".to_string(),
            ));
        }
        let sim = Simulator::new(config)?;
        let session = Self {
            sim,
            history: HistoryBuffer::with_capacity(history.capacity)?,
            inlet: InletDisturbance::from_def(inlet)?,
            record_every: history.record_every,
            ticks: 0,
        };
        info!(
            controllers = session.sim.controller_count(),
            dt = session.sim.dt(),
            history_capacity = history.capacity,
            "session started"
        );
        Ok(session)
    }

    pub fn from_project(project: &Project) -> AppResult<Self> {
        Self::new(project.simulation.clone(), project.history, &project.inlet)
    }

    /// Advance the disturbance, step once and return the new record.
    ///
    /// The record is also stored in the history every `record_every` ticks.
    pub fn tick(&mut self) -> AppResult<HistoryRecord> {
        let current = self.sim.inputs()[TankModel::INLET_FLOW];
        if let Some(q) = self.inlet.next(current) {
            self.sim.set_input(TankModel::INLET_FLOW, q)?;
        }
        self.sim.step()?;
        self.ticks += 1;

        let record = HistoryRecord::capture(&self.sim)?;
        if self.ticks % self.record_every == 0 {
            self.history.push(record.clone());
        }
        Ok(record)
    }

    /// Apply an operator command. Rejected commands change nothing.
    pub fn apply(&mut self, command: Command) -> AppResult<()> {
        if let Err(err) = self.check(&command) {
            warn!(?command, error = %err, "command rejected");
            return Err(err);
        }
        info!(?command, t = self.sim.time(), "command applied");

        match command {
            Command::SetSetpoint { controller, value } => self.sim.set_setpoint(controller, value)?,
            Command::SetGains { controller, gains } => {
                self.sim.set_controller_gains(controller, gains)?
            }
            Command::SetInletFlow { value } => {
                self.sim.set_input(TankModel::INLET_FLOW, value)?
            }
            Command::SetInletMode { inlet } => self.inlet = InletDisturbance::from_def(&inlet)?,
            Command::Reset => self.reset(),
        }
        Ok(())
    }

    /// Overwrite an arbitrary input entry.
    pub fn set_input(&mut self, index: usize, value: f64) -> AppResult<()> {
        self.sim.set_input(index, value)?;
        Ok(())
    }

    fn check(&self, command: &Command) -> AppResult<()> {
        let invalid = |msg: String| Err(AppError::InvalidInput(msg));
        match command {
            Command::SetSetpoint { controller, value } => {
                self.check_controller(*controller)?;
                let max_height = self.sim.model().params().max_height;
                if !(0.0..=max_height).contains(value) {
                    return invalid(format!(
                        "setpoint must be within [0, {max_height}], got {value}"
                    ));
                }
            }
            Command::SetGains { controller, gains } => {
                self.check_controller(*controller)?;
                if let Err(e) = gains.validate() {
                    return invalid(e.to_string());
                }
            }
            Command::SetInletFlow { value } => {
                if !value.is_finite() || *value < 0.0 {
                    return invalid(format!("inlet flow must be >= 0, got {value}"));
                }
            }
            Command::SetInletMode { inlet } => {
                InletDisturbance::from_def(inlet)?;
            }
            Command::Reset => {}
        }
        Ok(())
    }

    fn check_controller(&self, controller: usize) -> AppResult<()> {
        let count = self.sim.controller_count();
        if controller < count {
            Ok(())
        } else {
            Err(AppError::InvalidInput(format!(
                "no controller at index {controller} (have {count})"
            )))
        }
    }

    /// Back to the initial conditions with an empty history.
    pub fn reset(&mut self) {
        self.sim.reset();
        self.inlet.reset();
        self.history.clear();
        self.ticks = 0;
        info!("session reset");
    }

    pub fn state(&self) -> SessionState {
        let primary = |f: fn(&Simulator, usize) -> ts_sim::SimResult<f64>| f(&self.sim, 0).ok();
        SessionState {
            time_s: self.sim.time(),
            level_m: self.sim.state()[TankModel::LEVEL],
            setpoint: primary(Simulator::setpoint),
            inlet_flow: self.sim.inputs()[TankModel::INLET_FLOW],
            outlet_flow: self.sim.outlet_flow(),
            valve_position: self.sim.inputs()[TankModel::VALVE_POSITION],
            error: primary(Simulator::error),
            controller_output: primary(Simulator::controller_output),
        }
    }

    pub fn simulator(&self) -> &Simulator {
        &self.sim
    }

    pub fn history(&self) -> &HistoryBuffer<HistoryRecord> {
        &self.history
    }

    pub fn inlet(&self) -> &InletDisturbance {
        &self.inlet
    }

    pub fn ticks(&self) -> usize {
        self.ticks
    }
}
