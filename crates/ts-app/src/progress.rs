//! Run progress events.

use serde::{Deserialize, Serialize};

/// Progress of a scripted run, reported to an optional callback.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunProgress {
    pub step: usize,
    pub total_steps: usize,
    pub sim_time_s: f64,
    pub fraction_complete: f64,
    pub elapsed_wall_s: f64,
}
