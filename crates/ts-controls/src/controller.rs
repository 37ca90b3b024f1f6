//! PID controller with output saturation and anti-windup.
//!
//! The integral accumulator is protected twice:
//! - it only advances while the unsaturated output lies inside the limits
//! - after advancing it is clamped to `[-max_integral, max_integral]`

use crate::error::{ControlError, ControlResult};
use serde::{Deserialize, Serialize};
use ts_core::{ensure_finite, ensure_non_negative};

/// PID tuning in ideal form.
///
/// `tau_i == 0` disables integral action, `tau_d == 0` disables derivative action.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Gains {
    /// Controller gain. Negative for reverse-acting loops.
    #[serde(rename = "Kc")]
    pub kc: f64,
    /// Integral time constant (seconds).
    #[serde(rename = "tau_I")]
    pub tau_i: f64,
    /// Derivative time constant (seconds).
    #[serde(rename = "tau_D")]
    pub tau_d: f64,
}

impl Gains {
    pub fn new(kc: f64, tau_i: f64, tau_d: f64) -> Self {
        Self { kc, tau_i, tau_d }
    }

    /// Proportional-only tuning.
    pub fn proportional(kc: f64) -> Self {
        Self::new(kc, 0.0, 0.0)
    }

    /// Reject non-finite gains and negative time constants.
    pub fn validate(&self) -> ControlResult<()> {
        ensure_finite(self.kc, "Kc")?;
        ensure_non_negative(self.tau_i, "tau_I")?;
        ensure_non_negative(self.tau_d, "tau_D")?;
        Ok(())
    }
}

/// Discrete PID controller.
///
/// One instance per control loop. The integral accumulator is the only state
/// that evolves on its own; gains and limits change only through setters.
#[derive(Debug, Clone, PartialEq)]
pub struct PidController {
    gains: Gains,
    bias: f64,
    min_output: f64,
    max_output: f64,
    max_integral: f64,
    integral: f64,
}

impl PidController {
    /// Create a new PID controller.
    ///
    /// # Arguments
    ///
    /// * `gains` - Tuning (`tau_I`, `tau_D` must be non-negative)
    /// * `bias` - Output when every term is zero
    /// * `min_output` - Lower saturation limit
    /// * `max_output` - Upper saturation limit (`>= min_output`)
    /// * `max_integral` - Magnitude bound on the integral accumulator (`>= 0`)
    pub fn new(
        gains: Gains,
        bias: f64,
        min_output: f64,
        max_output: f64,
        max_integral: f64,
    ) -> ControlResult<Self> {
        gains.validate()?;
        ensure_finite(bias, "bias")?;
        check_limits(min_output, max_output)?;
        ensure_non_negative(max_integral, "max_integral")?;
        Ok(Self {
            gains,
            bias,
            min_output,
            max_output,
            max_integral,
            integral: 0.0,
        })
    }

    /// Compute the controller output.
    ///
    /// # Arguments
    ///
    /// * `error` - Setpoint minus measurement
    /// * `error_derivative` - Rate of change of the error
    /// * `dt` - Time since the previous call (seconds)
    ///
    /// The integral term uses the accumulator as it stood before this call;
    /// the accumulator is then advanced by `error * dt` unless the output saturated.
    pub fn compute(&mut self, error: f64, error_derivative: f64, dt: f64) -> f64 {
        let p_term = error;
        let i_term = if self.gains.tau_i != 0.0 {
            self.integral / self.gains.tau_i
        } else {
            0.0
        };
        let d_term = self.gains.tau_d * error_derivative;

        let unsaturated = self.bias + self.gains.kc * (p_term + i_term + d_term);
        let output = unsaturated.clamp(self.min_output, self.max_output);

        if output == unsaturated {
            self.integral =
                (self.integral + error * dt).clamp(-self.max_integral, self.max_integral);
        }

        output
    }

    /// Replace the gains without touching the accumulator (bumpless transfer).
    ///
    /// Invalid gains are rejected and the previous tuning stays in force.
    pub fn set_gains(&mut self, gains: Gains) -> ControlResult<()> {
        gains.validate()?;
        self.gains = gains;
        Ok(())
    }

    /// Replace the saturation limits. The accumulator is not reset or re-clamped.
    pub fn set_output_limits(&mut self, min_output: f64, max_output: f64) -> ControlResult<()> {
        check_limits(min_output, max_output)?;
        self.min_output = min_output;
        self.max_output = max_output;
        Ok(())
    }

    /// Clear the integral accumulator.
    pub fn reset(&mut self) {
        self.integral = 0.0;
    }

    pub fn integral_state(&self) -> f64 {
        self.integral
    }

    pub fn gains(&self) -> Gains {
        self.gains
    }

    pub fn bias(&self) -> f64 {
        self.bias
    }

    pub fn output_limits(&self) -> (f64, f64) {
        (self.min_output, self.max_output)
    }

    pub fn max_integral(&self) -> f64 {
        self.max_integral
    }
}

fn check_limits(min_output: f64, max_output: f64) -> ControlResult<()> {
    ensure_finite(min_output, "min_output")?;
    ensure_finite(max_output, "max_output")?;
    if min_output > max_output {
        return Err(ControlError::InvalidLimits {
            min: min_output,
            max: max_output,
        });
    }
    Ok(())
}
