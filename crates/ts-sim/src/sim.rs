//! Closed-loop simulator: tank model, PID loops and RK4 stepping.

use crate::clock::SimulationClock;
use crate::config::{ControllerConfig, SimulatorConfig};
use crate::error::{SimError, SimResult};
use crate::integrator::Rk4Stepper;
use crate::snapshot::{ControllerSnapshot, Snapshot};
use nalgebra::DVector;
use tracing::{debug, trace, warn};
use ts_controls::{ControlError, ErrorDifferentiator, Gains, PidController};
use ts_core::ensure_finite;
use ts_model::{ProcessModel, TankModel};

/// One PID controller wired between a state entry and an input entry.
#[derive(Debug)]
struct ControlLoop {
    controller: PidController,
    differentiator: ErrorDifferentiator,
    measured_index: usize,
    output_index: usize,
    setpoint: f64,
    initial_setpoint: f64,
    /// Error from the most recent tick.
    error: f64,
    /// Output from the most recent tick.
    output: f64,
}

/// Controller memory computed for a tick that has not been integrated yet.
#[derive(Debug)]
struct LoopUpdate {
    controller: PidController,
    differentiator: ErrorDifferentiator,
    error: f64,
    output: f64,
}

impl ControlLoop {
    fn build(
        index: usize,
        config: &ControllerConfig,
        state: &DVector<f64>,
        inputs: &DVector<f64>,
    ) -> SimResult<Self> {
        let wrap = |source: ControlError| SimError::Controller {
            controller: index,
            source,
        };
        ensure_finite(config.initial_setpoint, "initial_setpoint")
            .map_err(|e| wrap(ControlError::from(e)))?;
        let controller = PidController::new(
            config.gains,
            config.bias,
            config.min_output,
            config.max_output,
            config.max_integral,
        )
        .map_err(wrap)?;

        let error = config.initial_setpoint - state[config.measured_index];
        let differentiator = match config.derivative_filter_s {
            Some(tau) => ErrorDifferentiator::filtered(error, tau).map_err(wrap)?,
            None => ErrorDifferentiator::new(error),
        };

        Ok(Self {
            controller,
            differentiator,
            measured_index: config.measured_index,
            output_index: config.output_index,
            setpoint: config.initial_setpoint,
            initial_setpoint: config.initial_setpoint,
            error,
            output: inputs[config.output_index],
        })
    }

    fn commit(&mut self, update: LoopUpdate) {
        self.controller = update.controller;
        self.differentiator = update.differentiator;
        self.error = update.error;
        self.output = update.output;
    }

    fn rearm(&mut self, state: &DVector<f64>, inputs: &DVector<f64>) {
        self.controller.reset();
        self.setpoint = self.initial_setpoint;
        self.error = self.setpoint - state[self.measured_index];
        self.output = inputs[self.output_index];
        self.differentiator.reset(self.error);
    }

    fn snapshot(&self) -> ControllerSnapshot {
        ControllerSnapshot {
            setpoint: self.setpoint,
            error: self.error,
            output: self.output,
        }
    }
}

/// Tank level simulator under PID control.
///
/// Each `step` runs every controller against the current state, writes the
/// outputs into the input vector (in controller order, so a later controller
/// wins when two share an output index), then advances the state by one RK4
/// step of the fixed `dt` with those inputs held constant.
///
/// The simulator is `Send` but not `Clone`. Concurrent use of one instance
/// needs external synchronization; independent instances share nothing.
#[derive(Debug)]
pub struct Simulator {
    model: TankModel,
    stepper: Rk4Stepper,
    clock: SimulationClock,
    loops: Vec<ControlLoop>,
    state: DVector<f64>,
    inputs: DVector<f64>,
    initial_state: DVector<f64>,
    initial_inputs: DVector<f64>,
}

impl Simulator {
    /// Build a simulator from a configuration.
    ///
    /// Checks run in a fixed order and the first failure is reported: model
    /// parameters, state length, input length, time step, then each
    /// controller's indices and parameters.
    pub fn new(config: SimulatorConfig) -> SimResult<Self> {
        let model = TankModel::new(config.model)?;

        if config.initial_state.len() != model.state_dim() {
            return Err(SimError::StateDimension {
                expected: model.state_dim(),
                actual: config.initial_state.len(),
            });
        }
        if config.initial_inputs.len() != model.input_dim() {
            return Err(SimError::InputDimension {
                expected: model.input_dim(),
                actual: config.initial_inputs.len(),
            });
        }
        let clock = SimulationClock::new(config.dt, config.dt_bounds)?;

        for (i, c) in config.controllers.iter().enumerate() {
            if c.measured_index >= config.initial_state.len() {
                return Err(SimError::MeasuredIndexOutOfRange {
                    controller: i,
                    index: c.measured_index,
                    len: config.initial_state.len(),
                });
            }
            if c.output_index >= config.initial_inputs.len() {
                return Err(SimError::OutputIndexOutOfRange {
                    controller: i,
                    index: c.output_index,
                    len: config.initial_inputs.len(),
                });
            }
        }

        for v in &config.initial_state {
            ensure_finite(*v, "initial_state")?;
        }
        for v in &config.initial_inputs {
            ensure_finite(*v, "initial_inputs")?;
        }

        let state = DVector::from_vec(config.initial_state);
        let inputs = DVector::from_vec(config.initial_inputs);

        let loops = config
            .controllers
            .iter()
            .enumerate()
            .map(|(i, c)| ControlLoop::build(i, c, &state, &inputs))
            .collect::<SimResult<Vec<_>>>()?;

        for (i, a) in loops.iter().enumerate() {
            if let Some(j) = loops[..i]
                .iter()
                .position(|b| b.output_index == a.output_index)
            {
                warn!(
                    first = j,
                    second = i,
                    output_index = a.output_index,
                    "controllers share an output index; the later one wins each step"
                );
            }
        }

        let stepper = Rk4Stepper::new(model.state_dim(), model.input_dim())?;

        debug!(
            dt = clock.dt(),
            controllers = loops.len(),
            level = state[TankModel::LEVEL],
            "simulator constructed"
        );

        Ok(Self {
            model,
            stepper,
            clock,
            loops,
            initial_state: state.clone(),
            initial_inputs: inputs.clone(),
            state,
            inputs,
        })
    }

    /// Advance one control interval.
    ///
    /// A failed step changes nothing: controller memory, inputs, state and
    /// time are only committed once integration succeeds.
    pub fn step(&mut self) -> SimResult<()> {
        let dt = self.clock.dt();

        let mut inputs = self.inputs.clone();
        let mut pending = Vec::with_capacity(self.loops.len());
        for lp in &self.loops {
            let mut controller = lp.controller.clone();
            let mut differentiator = lp.differentiator.clone();
            let error = lp.setpoint - self.state[lp.measured_index];
            let error_rate = differentiator.update(error, dt);
            let output = controller.compute(error, error_rate, dt);
            inputs[lp.output_index] = output;
            pending.push(LoopUpdate {
                controller,
                differentiator,
                error,
                output,
            });
        }

        let model = &self.model;
        let next = self.stepper.step(
            self.clock.time(),
            dt,
            &self.state,
            &inputs,
            |_, x, u| model.derivative(x, u),
        )?;

        for (lp, update) in self.loops.iter_mut().zip(pending) {
            lp.commit(update);
        }
        self.inputs = inputs;
        self.state = next;
        self.clock.advance();

        trace!(
            t = self.clock.time(),
            level = self.state[TankModel::LEVEL],
            valve = self.inputs[TankModel::VALVE_POSITION],
            "step"
        );
        Ok(())
    }

    /// Step `steps` times, stopping at the first error.
    pub fn run_for(&mut self, steps: usize) -> SimResult<()> {
        for _ in 0..steps {
            self.step()?;
        }
        Ok(())
    }

    /// Restore the state captured at construction.
    ///
    /// Time, state, inputs, setpoints and controller memory return to their
    /// initial values. Gains and output limits changed at runtime are kept.
    pub fn reset(&mut self) {
        self.state.copy_from(&self.initial_state);
        self.inputs.copy_from(&self.initial_inputs);
        self.clock.reset();
        for lp in &mut self.loops {
            lp.rearm(&self.state, &self.inputs);
        }
        debug!(controllers = self.loops.len(), "simulator reset");
    }

    pub fn time(&self) -> f64 {
        self.clock.time()
    }

    pub fn dt(&self) -> f64 {
        self.clock.dt()
    }

    pub fn step_count(&self) -> u64 {
        self.clock.steps()
    }

    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    pub fn model(&self) -> &TankModel {
        &self.model
    }

    pub fn state(&self) -> &DVector<f64> {
        &self.state
    }

    pub fn inputs(&self) -> &DVector<f64> {
        &self.inputs
    }

    pub fn controller_count(&self) -> usize {
        self.loops.len()
    }

    /// Current outlet flow for the present state and inputs.
    pub fn outlet_flow(&self) -> f64 {
        self.model.outlet_flow(&self.state, &self.inputs)
    }

    pub fn setpoint(&self, controller: usize) -> SimResult<f64> {
        Ok(self.control_loop(controller)?.setpoint)
    }

    /// Error computed on the most recent tick, or `setpoint - measured` before
    /// the first one.
    pub fn error(&self, controller: usize) -> SimResult<f64> {
        Ok(self.control_loop(controller)?.error)
    }

    /// Output computed on the most recent tick, or the initial input at the
    /// controller's output index before the first one.
    pub fn controller_output(&self, controller: usize) -> SimResult<f64> {
        Ok(self.control_loop(controller)?.output)
    }

    pub fn integral_state(&self, controller: usize) -> SimResult<f64> {
        Ok(self.control_loop(controller)?.controller.integral_state())
    }

    pub fn controller(&self, controller: usize) -> SimResult<&PidController> {
        Ok(&self.control_loop(controller)?.controller)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            time: self.clock.time(),
            state: self.state.iter().copied().collect(),
            inputs: self.inputs.iter().copied().collect(),
            controllers: self.loops.iter().map(ControlLoop::snapshot).collect(),
        }
    }

    /// Overwrite an input entry. A controller bound to the same index
    /// overwrites it again on the next step.
    pub fn set_input(&mut self, index: usize, value: f64) -> SimResult<()> {
        let len = self.inputs.len();
        if index >= len {
            return Err(SimError::UnknownInput { index, len });
        }
        ensure_finite(value, "input")?;
        self.inputs[index] = value;
        Ok(())
    }

    /// Change a setpoint. Takes effect on the next step; integral memory is kept.
    pub fn set_setpoint(&mut self, controller: usize, value: f64) -> SimResult<()> {
        ensure_finite(value, "setpoint")?;
        self.control_loop_mut(controller)?.setpoint = value;
        Ok(())
    }

    /// Retune a controller in place. Invalid gains leave the old ones active.
    pub fn set_controller_gains(&mut self, controller: usize, gains: Gains) -> SimResult<()> {
        self.control_loop_mut(controller)?
            .controller
            .set_gains(gains)
            .map_err(|source| SimError::Controller { controller, source })
    }

    pub fn set_output_limits(
        &mut self,
        controller: usize,
        min_output: f64,
        max_output: f64,
    ) -> SimResult<()> {
        self.control_loop_mut(controller)?
            .controller
            .set_output_limits(min_output, max_output)
            .map_err(|source| SimError::Controller { controller, source })
    }

    fn control_loop(&self, index: usize) -> SimResult<&ControlLoop> {
        let count = self.loops.len();
        self.loops
            .get(index)
            .ok_or(SimError::UnknownController { index, count })
    }

    fn control_loop_mut(&mut self, index: usize) -> SimResult<&mut ControlLoop> {
        let count = self.loops.len();
        self.loops
            .get_mut(index)
            .ok_or(SimError::UnknownController { index, count })
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn outputs_respect_limits_for_any_tuning(
            kc in -10.0_f64..-0.01,
            tau_i in 0.0_f64..50.0,
            tau_d in 0.0_f64..5.0,
            setpoint in 0.0_f64..5.0,
            inlet in 0.0_f64..2.0,
        ) {
            let mut sim = Simulator::new(SimulatorConfig::default()).unwrap();
            sim.set_controller_gains(0, Gains::new(kc, tau_i, tau_d)).unwrap();
            sim.set_setpoint(0, setpoint).unwrap();
            sim.set_input(TankModel::INLET_FLOW, inlet).unwrap();
            for _ in 0..200 {
                sim.step().unwrap();
                let out = sim.controller_output(0).unwrap();
                prop_assert!((0.0..=1.0).contains(&out));
                prop_assert!(sim.integral_state(0).unwrap().abs() <= 10.0);
                prop_assert!(sim.state()[0].is_finite());
            }
        }
    }
}
