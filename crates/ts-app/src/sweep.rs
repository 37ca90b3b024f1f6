//! Parallel controller gain sweeps.

use rayon::prelude::*;
use tracing::info;
use ts_sim::{Simulator, SimulatorConfig};

use crate::error::{AppError, AppResult};

/// Integral absolute error of the first controller for one candidate gain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepPoint {
    pub kc: f64,
    pub iae: f64,
}

/// Run one independent simulator per candidate `Kc` for the first controller
/// and score each by its integral absolute error over `steps` ticks.
///
/// Results are in the order of `kcs`.
pub fn sweep_gains(
    config: &SimulatorConfig,
    kcs: &[f64],
    steps: usize,
) -> AppResult<Vec<SweepPoint>> {
    if config.controllers.is_empty() {
        return Err(AppError::InvalidInput(
            "gain sweep needs at least one controller".to_string(),
        ));
    }
    ts_project::validate_operating_point(config)
        .map_err(|e| AppError::InvalidInput(e.to_string()))?;
    info!(candidates = kcs.len(), steps, "gain sweep started");

    kcs.par_iter()
        .map(|&kc| -> AppResult<SweepPoint> {
            let mut candidate = config.clone();
            candidate.controllers[0].gains.kc = kc;
            let mut sim = Simulator::new(candidate)?;
            let dt = sim.dt();
            let mut iae = 0.0;
            for _ in 0..steps {
                sim.step()?;
                iae += sim.error(0)?.abs() * dt;
            }
            Ok(SweepPoint { kc, iae })
        })
        .collect()
}
