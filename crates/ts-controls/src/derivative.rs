//! Error derivative estimation.
//!
//! The controller takes `de/dt` as an input. This estimator produces it from
//! consecutive error samples with a backward difference, optionally smoothed by
//! a first-order lag:
//!
//! ```text
//! raw  = (e[k] - e[k-1]) / dt
//! d[k] = a * d[k-1] + (1 - a) * raw,   a = tau / (tau + dt)
//! ```

use crate::error::ControlResult;
use ts_core::ensure_positive;

/// Backward-difference error differentiator with an optional low-pass filter.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorDifferentiator {
    filter_tau: Option<f64>,
    prev_error: f64,
    filtered: f64,
}

impl ErrorDifferentiator {
    /// Unfiltered differentiator primed with `initial_error`.
    pub fn new(initial_error: f64) -> Self {
        Self {
            filter_tau: None,
            prev_error: initial_error,
            filtered: 0.0,
        }
    }

    /// Differentiator with a first-order filter of time constant `tau` (seconds).
    pub fn filtered(initial_error: f64, tau: f64) -> ControlResult<Self> {
        ensure_positive(tau, "derivative_filter_s")?;
        Ok(Self {
            filter_tau: Some(tau),
            ..Self::new(initial_error)
        })
    }

    pub fn filter_tau(&self) -> Option<f64> {
        self.filter_tau
    }

    /// Feed the next error sample and return the derivative estimate.
    pub fn update(&mut self, error: f64, dt: f64) -> f64 {
        let raw = (error - self.prev_error) / dt;
        self.prev_error = error;
        self.filtered = match self.filter_tau {
            Some(tau) => {
                let alpha = tau / (tau + dt);
                alpha * self.filtered + (1.0 - alpha) * raw
            }
            None => raw,
        };
        self.filtered
    }

    /// Re-prime so the next derivative is measured from `initial_error`.
    pub fn reset(&mut self, initial_error: f64) {
        self.prev_error = initial_error;
        self.filtered = 0.0;
    }
}
