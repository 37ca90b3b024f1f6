//! Simulation time keeping.

use crate::error::{SimError, SimResult};
use serde::{Deserialize, Serialize};
use ts_core::units::{Time, s};

/// Admissible range for the fixed time step (seconds).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DtBounds {
    pub min: f64,
    pub max: f64,
}

impl Default for DtBounds {
    fn default() -> Self {
        Self {
            min: 0.001,
            max: 10.0,
        }
    }
}

impl DtBounds {
    /// Check `0 < dt` and `min <= dt <= max`. NaN never passes.
    pub fn check(&self, dt: f64) -> SimResult<f64> {
        let in_range = dt > 0.0 && dt >= self.min && dt <= self.max;
        if in_range {
            Ok(dt)
        } else {
            Err(SimError::InvalidTimestep {
                dt,
                min: self.min,
                max: self.max,
            })
        }
    }
}

/// Elapsed simulation time with a step size fixed at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationClock {
    time: f64,
    dt: f64,
    steps: u64,
    bounds: DtBounds,
}

impl SimulationClock {
    pub fn new(dt: f64, bounds: DtBounds) -> SimResult<Self> {
        let dt = bounds.check(dt)?;
        Ok(Self {
            time: 0.0,
            dt,
            steps: 0,
            bounds,
        })
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn elapsed(&self) -> Time {
        s(self.time)
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn bounds(&self) -> DtBounds {
        self.bounds
    }

    pub fn advance(&mut self) {
        self.time += self.dt;
        self.steps += 1;
    }

    pub fn reset(&mut self) {
        self.time = 0.0;
        self.steps = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range_dt() {
        let bounds = DtBounds::default();
        assert!(SimulationClock::new(0.0, bounds).is_err());
        assert!(SimulationClock::new(-1.0, bounds).is_err());
        assert!(SimulationClock::new(0.0005, bounds).is_err());
        assert!(SimulationClock::new(10.5, bounds).is_err());
        assert!(SimulationClock::new(f64::NAN, bounds).is_err());
        assert!(SimulationClock::new(0.001, bounds).is_ok());
        assert!(SimulationClock::new(10.0, bounds).is_ok());
    }

    #[test]
    fn error_message_names_bounds() {
        let err = SimulationClock::new(20.0, DtBounds::default()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "dt must be positive and between 0.001 and 10 seconds, got 20"
        );
    }

    #[test]
    fn advance_and_reset() {
        use uom::si::time::second;

        let mut clock = SimulationClock::new(0.5, DtBounds::default()).unwrap();
        for _ in 0..4 {
            clock.advance();
        }
        assert_eq!(clock.time(), 2.0);
        assert_eq!(clock.steps(), 4);
        assert_eq!(clock.elapsed().get::<second>(), 2.0);
        clock.reset();
        assert_eq!(clock.time(), 0.0);
        assert_eq!(clock.steps(), 0);
        assert_eq!(clock.dt(), 0.5);
    }
}
