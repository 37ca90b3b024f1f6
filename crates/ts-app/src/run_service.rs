//! Scripted runs of a project.

use std::time::Instant;
use tracing::info;
use ts_project::{EventAction, Project, validate_project};
use ts_results::HistoryRecord;

use crate::error::{AppError, AppResult};
use crate::progress::RunProgress;
use crate::session::{Command, Session};

/// How long to run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RunLength {
    Steps(usize),
    /// Simulated seconds, rounded up to whole steps.
    Duration(f64),
}

impl RunLength {
    fn steps(self, dt: f64) -> AppResult<usize> {
        match self {
            RunLength::Steps(n) => Ok(n),
            RunLength::Duration(d) if d.is_finite() && d >= 0.0 => {
                Ok(((d / dt) - 1e-9).ceil().max(0.0) as usize)
            }
            RunLength::Duration(d) => Err(AppError::InvalidInput(format!(
                "run duration must be finite and >= 0, got {d}"
            ))),
        }
    }
}

/// Request to execute a run.
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub length: RunLength,
}

/// Concise outcome of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub steps: usize,
    pub final_time_s: f64,
    pub final_state: Vec<f64>,
    /// Integral of |error| dt per controller.
    pub iae: Vec<f64>,
    pub events_fired: usize,
    pub wall_time_s: f64,
}

#[derive(Debug, Clone)]
pub struct RunOutput {
    pub summary: RunSummary,
    /// Recorded history, oldest first.
    pub history: Vec<HistoryRecord>,
}

fn emit_progress(
    progress_cb: &mut Option<&mut dyn FnMut(RunProgress)>,
    step: usize,
    total_steps: usize,
    sim_time_s: f64,
    started: Instant,
) {
    if let Some(cb) = progress_cb.as_deref_mut() {
        cb(RunProgress {
            step,
            total_steps,
            sim_time_s,
            fraction_complete: if total_steps == 0 {
                1.0
            } else {
                step as f64 / total_steps as f64
            },
            elapsed_wall_s: started.elapsed().as_secs_f64(),
        });
    }
}

/// Run a project from its initial conditions.
///
/// The project is validated first, so events that would drive an input out of
/// its physical range are refused before any step.
///
/// Scheduled events fire before the first tick whose start time has reached
/// their `at_s`. Event times are compared with simulation time, which restarts
/// at zero after a `reset` event; each event fires at most once.
pub fn run_project(
    project: &Project,
    request: &RunRequest,
    mut progress: Option<&mut dyn FnMut(RunProgress)>,
) -> AppResult<RunOutput> {
    validate_project(project).map_err(|e| AppError::Project(e.to_string()))?;
    let started = Instant::now();
    let mut session = Session::from_project(project)?;
    let dt = session.simulator().dt();
    let total_steps = request.length.steps(dt)?;
    let events = project.scheduled_events();
    let controllers = session.simulator().controller_count();
    let report_every = (total_steps / 100).max(1);

    info!(name = %project.name, steps = total_steps, dt, "run started");

    let mut next_event = 0;
    let mut iae = vec![0.0; controllers];
    for step in 0..total_steps {
        let now = session.simulator().time();
        while let Some(event) = events.get(next_event) {
            if event.at_s > now + 1e-9 * dt {
                break;
            }
            fire(&mut session, &event.action)?;
            next_event += 1;
        }

        let record = session.tick()?;
        for (acc, c) in iae.iter_mut().zip(&record.controllers) {
            *acc += c.error.abs() * dt;
        }

        if (step + 1) % report_every == 0 {
            emit_progress(&mut progress, step + 1, total_steps, record.time_s, started);
        }
    }
    if total_steps == 0 {
        emit_progress(&mut progress, 0, 0, 0.0, started);
    }

    let sim = session.simulator();
    let summary = RunSummary {
        steps: total_steps,
        final_time_s: sim.time(),
        final_state: sim.state().iter().copied().collect(),
        iae,
        events_fired: next_event,
        wall_time_s: started.elapsed().as_secs_f64(),
    };
    info!(
        steps = summary.steps,
        final_time_s = summary.final_time_s,
        wall_time_s = summary.wall_time_s,
        "run completed"
    );

    Ok(RunOutput {
        summary,
        history: session.history().to_vec(),
    })
}

fn fire(session: &mut Session, action: &EventAction) -> AppResult<()> {
    match *action {
        EventAction::SetSetpoint { controller, value } => {
            session.apply(Command::SetSetpoint { controller, value })
        }
        EventAction::SetInletFlow { value } => session.apply(Command::SetInletFlow { value }),
        EventAction::SetGains { controller, gains } => {
            session.apply(Command::SetGains { controller, gains })
        }
        EventAction::SetInput { index, value } => session.set_input(index, value),
        EventAction::Reset => session.apply(Command::Reset),
    }
}
