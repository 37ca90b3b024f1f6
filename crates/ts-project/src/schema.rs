//! Project schema definitions.

use serde::{Deserialize, Serialize};
use ts_controls::Gains;
use ts_results::DEFAULT_HISTORY_CAPACITY;
use ts_sim::SimulatorConfig;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub version: u32,
    pub name: String,
    pub simulation: SimulatorConfig,
    #[serde(default)]
    pub history: HistoryDef,
    #[serde(default)]
    pub inlet: InletDef,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<EventDef>,
}

impl Project {
    /// Project at the latest version around the nominal operating point.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            version: crate::migrate::LATEST_VERSION,
            name: name.into(),
            simulation: SimulatorConfig::default(),
            history: HistoryDef::default(),
            inlet: InletDef::default(),
            events: Vec::new(),
        }
    }

    /// Events ordered by firing time; ties keep file order.
    pub fn scheduled_events(&self) -> Vec<EventDef> {
        let mut events = self.events.clone();
        events.sort_by(|a, b| a.at_s.total_cmp(&b.at_s));
        events
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct HistoryDef {
    #[serde(default = "default_capacity")]
    pub capacity: usize,
    /// Record one entry every N ticks.
    #[serde(default = "default_record_every")]
    pub record_every: usize,
}

fn default_capacity() -> usize {
    DEFAULT_HISTORY_CAPACITY
}

fn default_record_every() -> usize {
    1
}

impl Default for HistoryDef {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            record_every: default_record_every(),
        }
    }
}

/// How the inlet flow evolves between operator changes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum InletDef {
    /// Inlet stays at the configured initial input.
    #[default]
    Constant,
    /// Bounded random walk with per-tick increments drawn from N(0, variance).
    Brownian {
        min: f64,
        max: f64,
        variance: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        seed: Option<u64>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EventDef {
    /// Simulation time at which the action fires (seconds).
    pub at_s: f64,
    pub action: EventAction,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventAction {
    SetSetpoint { controller: usize, value: f64 },
    SetInletFlow { value: f64 },
    SetGains { controller: usize, gains: Gains },
    SetInput { index: usize, value: f64 },
    Reset,
}
