//! Closed-loop simulation kernel for tanksim.
//!
//! Provides:
//! - Fixed-step classical RK4 integrator with an exclusively owned workspace
//! - Simulation clock with validated, fixed time step
//! - Configuration bundle consumed at construction
//! - `Simulator`: model + controllers + integrator, advanced one tick at a time
//! - Snapshots of the latest completed tick for history and reporting
//!
//! The kernel is synchronous and single-owner: a `Simulator` is `Send` but is
//! never shared; hosts serialize access to it.

pub mod clock;
pub mod config;
pub mod error;
pub mod integrator;
pub mod sim;
pub mod snapshot;

pub use clock::{DtBounds, SimulationClock};
pub use config::{ControllerConfig, SimulatorConfig};
pub use error::{IntegratorError, IntegratorResult, SimError, SimResult};
pub use integrator::Rk4Stepper;
pub use sim::Simulator;
pub use snapshot::{ControllerSnapshot, Snapshot};
