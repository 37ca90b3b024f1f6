//! Shared application service layer for tanksim.
//!
//! Hosts (the CLI, tests, anything interactive) go through this crate rather
//! than driving the kernel directly: it owns the single-writer session around
//! a simulator, the inlet disturbance, scripted project runs and gain sweeps.

pub mod disturbance;
pub mod error;
pub mod progress;
pub mod project_service;
pub mod run_service;
pub mod session;
pub mod sweep;

pub use disturbance::InletDisturbance;
pub use error::{AppError, AppResult};
pub use progress::RunProgress;
pub use project_service::{ProjectSummary, init_project, load_project, save_project, summarize};
pub use run_service::{RunLength, RunOutput, RunRequest, RunSummary, run_project};
pub use session::{Command, Session, SessionState};
pub use sweep::{SweepPoint, sweep_gains};
