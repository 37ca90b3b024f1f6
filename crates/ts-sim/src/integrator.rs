//! Fixed-step time integrator.

use crate::error::{IntegratorError, IntegratorResult};
use nalgebra::DVector;

/// Classical RK4 (Runge-Kutta 4th order) integrator.
///
/// Each `step` evaluates the derivative exactly four times, at `t`, twice at
/// `t + dt/2` and at `t + dt`, and combines the slopes with weights
/// `(k1 + 2*k2 + 2*k3 + k4) / 6`. Local error is O(dt^5), global O(dt^4).
///
/// The stepper owns a scratch buffer for the intermediate stage states. It is
/// deliberately not `Clone`: one stepper belongs to one simulator, and the
/// buffer is dropped with it.
#[derive(Debug)]
pub struct Rk4Stepper {
    state_dim: usize,
    input_dim: usize,
    stage: DVector<f64>,
}

impl Rk4Stepper {
    /// Create a stepper for systems with the given state and input lengths.
    ///
    /// `input_dim` may be zero for autonomous systems; `state_dim` may not.
    pub fn new(state_dim: usize, input_dim: usize) -> IntegratorResult<Self> {
        if state_dim == 0 {
            return Err(IntegratorError::ZeroDimension);
        }
        Ok(Self {
            state_dim,
            input_dim,
            stage: DVector::zeros(state_dim),
        })
    }

    pub fn state_dim(&self) -> usize {
        self.state_dim
    }

    pub fn input_dim(&self) -> usize {
        self.input_dim
    }

    /// Advance `state` by one step of size `dt`.
    ///
    /// `state` and `input` are left untouched; the next state is returned.
    /// `deriv` receives `(t, state, input)` and must return a vector of
    /// `state_dim` entries.
    pub fn step<F>(
        &mut self,
        t: f64,
        dt: f64,
        state: &DVector<f64>,
        input: &DVector<f64>,
        mut deriv: F,
    ) -> IntegratorResult<DVector<f64>>
    where
        F: FnMut(f64, &DVector<f64>, &DVector<f64>) -> DVector<f64>,
    {
        if state.len() != self.state_dim {
            return Err(IntegratorError::StateDimension {
                expected: self.state_dim,
                actual: state.len(),
            });
        }
        if input.len() != self.input_dim {
            return Err(IntegratorError::InputDimension {
                expected: self.input_dim,
                actual: input.len(),
            });
        }

        let half = 0.5 * dt;

        let k1 = self.checked(deriv(t, state, input))?;

        self.stage.copy_from(state);
        self.stage.axpy(half, &k1, 1.0);
        let k2 = self.checked(deriv(t + half, &self.stage, input))?;

        self.stage.copy_from(state);
        self.stage.axpy(half, &k2, 1.0);
        let k3 = self.checked(deriv(t + half, &self.stage, input))?;

        self.stage.copy_from(state);
        self.stage.axpy(dt, &k3, 1.0);
        let k4 = self.checked(deriv(t + dt, &self.stage, input))?;

        // x_new = x + (dt/6) * (k1 + 2*k2 + 2*k3 + k4)
        let slope = k1 + k2 * 2.0 + k3 * 2.0 + k4;
        let next = state + slope * (dt / 6.0);

        if next.iter().all(|v| v.is_finite()) {
            Ok(next)
        } else {
            Err(IntegratorError::NonFinite { time: t })
        }
    }

    fn checked(&self, k: DVector<f64>) -> IntegratorResult<DVector<f64>> {
        if k.len() == self.state_dim {
            Ok(k)
        } else {
            Err(IntegratorError::DerivativeDimension {
                expected: self.state_dim,
                actual: k.len(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(values: &[f64]) -> DVector<f64> {
        DVector::from_row_slice(values)
    }

    #[test]
    fn constant_derivative_is_exact() {
        let mut rk4 = Rk4Stepper::new(1, 0).unwrap();
        let next = rk4
            .step(0.0, 0.5, &v(&[1.0]), &v(&[]), |_, _, _| v(&[2.0]))
            .unwrap();
        assert!((next[0] - 2.0).abs() < 1e-15);
    }

    #[test]
    fn polynomial_in_time_is_exact() {
        // dy/dt = 3 t^2 -> y = t^3, integrated exactly by RK4
        let mut rk4 = Rk4Stepper::new(1, 0).unwrap();
        let mut y = v(&[0.0]);
        let dt = 0.25;
        for i in 0..8 {
            let t = i as f64 * dt;
            y = rk4.step(t, dt, &y, &v(&[]), |t, _, _| v(&[3.0 * t * t])).unwrap();
        }
        assert!((y[0] - 8.0).abs() < 1e-12);
    }

    #[test]
    fn evaluates_derivative_four_times_at_stage_points() {
        let mut rk4 = Rk4Stepper::new(1, 1).unwrap();
        let mut times = Vec::new();
        rk4.step(1.0, 0.2, &v(&[0.0]), &v(&[0.0]), |t, _, _| {
            times.push(t);
            v(&[1.0])
        })
        .unwrap();
        assert_eq!(times.len(), 4);
        assert_eq!(times[0], 1.0);
        assert!((times[1] - 1.1).abs() < 1e-15);
        assert!((times[2] - 1.1).abs() < 1e-15);
        assert!((times[3] - 1.2).abs() < 1e-15);
    }

    #[test]
    fn inputs_are_passed_through_unchanged() {
        let mut rk4 = Rk4Stepper::new(1, 2).unwrap();
        let state = v(&[1.0]);
        let input = v(&[3.0, -1.0]);
        let next = rk4
            .step(0.0, 1.0, &state, &input, |_, _, u| v(&[u[0] + u[1]]))
            .unwrap();
        assert!((next[0] - 3.0).abs() < 1e-15);
        assert_eq!(state, v(&[1.0]));
        assert_eq!(input, v(&[3.0, -1.0]));
    }

    #[test]
    fn dimension_mismatches_are_caller_errors() {
        let mut rk4 = Rk4Stepper::new(1, 2).unwrap();
        let zero = |_: f64, x: &DVector<f64>, _: &DVector<f64>| DVector::<f64>::zeros(x.len());
        assert_eq!(
            rk4.step(0.0, 1.0, &v(&[1.0, 2.0]), &v(&[0.0, 0.0]), zero),
            Err(IntegratorError::StateDimension {
                expected: 1,
                actual: 2
            })
        );
        assert_eq!(
            rk4.step(0.0, 1.0, &v(&[1.0]), &v(&[0.0]), zero),
            Err(IntegratorError::InputDimension {
                expected: 2,
                actual: 1
            })
        );
        assert_eq!(
            rk4.step(0.0, 1.0, &v(&[1.0]), &v(&[0.0, 0.0]), |_, _, _| v(&[1.0, 1.0])),
            Err(IntegratorError::DerivativeDimension {
                expected: 1,
                actual: 2
            })
        );
        assert_eq!(Rk4Stepper::new(0, 2).unwrap_err(), IntegratorError::ZeroDimension);
    }

    #[test]
    fn non_finite_result_is_numerical_failure() {
        let mut rk4 = Rk4Stepper::new(1, 0).unwrap();
        let err = rk4
            .step(2.0, 1.0, &v(&[1.0]), &v(&[]), |_, _, _| v(&[f64::NAN]))
            .unwrap_err();
        assert_eq!(err, IntegratorError::NonFinite { time: 2.0 });
    }
}
