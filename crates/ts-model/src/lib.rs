//! Process models for tanksim.
//!
//! A process model is a pure map from `(state, input)` to the state derivative.
//! Models carry only immutable parameters, so one instance can be evaluated from
//! several threads at once.
//!
//! Provides:
//! - `ProcessModel` trait used by the integrator and the simulator
//! - Single gravity-drained tank with a valve on the outlet

pub mod error;
pub mod model;
pub mod tank;

pub use error::{ModelError, ModelResult};
pub use model::ProcessModel;
pub use tank::{TankModel, TankParameters};
