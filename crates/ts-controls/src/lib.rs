//! Feedback control primitives for tanksim.
//!
//! The controller is a discrete PID in ideal (ISA) form with a bias term:
//!
//! ```text
//! u = bias + Kc * (e + (1/tau_I) * integral(e) + tau_D * de/dt)
//! ```
//!
//! # Architecture
//!
//! - `PidController` owns its gains, limits and the integral accumulator
//! - The error derivative is supplied by the caller; `ErrorDifferentiator`
//!   is the standard way to produce it from consecutive error samples
//! - Anti-windup: conditional integration plus a hard clamp on the accumulator
//! - Retuning keeps the accumulator (bumpless transfer)

pub mod controller;
pub mod derivative;
pub mod error;

pub use controller::{Gains, PidController};
pub use derivative::ErrorDifferentiator;
pub use error::{ControlError, ControlResult};
