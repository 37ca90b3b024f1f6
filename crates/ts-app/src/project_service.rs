//! Project loading, saving and introspection.

use std::path::Path;
use tracing::info;
use ts_model::TankModel;
use ts_project::{EventAction, EventDef, InletDef, Project};

use crate::error::{AppError, AppResult};

/// Summary of a project for listing.
#[derive(Debug, Clone)]
pub struct ProjectSummary {
    pub name: String,
    pub version: u32,
    pub dt_s: f64,
    pub controller_count: usize,
    pub initial_level_m: f64,
    pub initial_setpoint: Option<f64>,
    /// Inlet flow that holds the initial level at the initial valve position.
    pub balancing_inlet_flow: f64,
    pub inlet_mode: &'static str,
    pub event_count: usize,
    pub history_capacity: usize,
    pub record_every: usize,
}

/// Load a project file (YAML, or JSON by extension), migrated and validated.
pub fn load_project(path: &Path) -> AppResult<Project> {
    let project = ts_project::load(path)?;
    info!(path = %path.display(), name = %project.name, "project loaded");
    Ok(project)
}

pub fn save_project(path: &Path, project: &Project) -> AppResult<()> {
    ts_project::save(path, project)?;
    info!(path = %path.display(), "project saved");
    Ok(())
}

/// Write a starter project with a setpoint step one minute in.
pub fn init_project(path: &Path, name: &str, overwrite: bool) -> AppResult<Project> {
    if path.exists() && !overwrite {
        return Err(AppError::ProjectExists(path.to_path_buf()));
    }
    let mut project = Project::new(name);
    project.events.push(EventDef {
        at_s: 60.0,
        action: EventAction::SetSetpoint {
            controller: 0,
            value: 3.0,
        },
    });
    ts_project::save(path, &project).map_err(|e| match e {
        ts_project::ProjectError::Io(source) => AppError::ProjectFileWrite {
            path: path.to_path_buf(),
            source,
        },
        other => other.into(),
    })?;
    info!(path = %path.display(), "project initialized");
    Ok(project)
}

pub fn summarize(project: &Project) -> AppResult<ProjectSummary> {
    let sim = &project.simulation;
    let tank = TankModel::new(sim.model).map_err(|e| AppError::Project(e.to_string()))?;
    let level = sim.initial_state.get(TankModel::LEVEL).copied().ok_or_else(|| {
        AppError::Project("initial_state is empty".to_string())
    })?;
    let valve = sim
        .initial_inputs
        .get(TankModel::VALVE_POSITION)
        .copied()
        .ok_or_else(|| AppError::Project("initial_inputs has no valve entry".to_string()))?;

    Ok(ProjectSummary {
        name: project.name.clone(),
        version: project.version,
        dt_s: sim.dt,
        controller_count: sim.controllers.len(),
        initial_level_m: level,
        initial_setpoint: sim.controllers.first().map(|c| c.initial_setpoint),
        balancing_inlet_flow: tank.steady_inlet_flow(level, valve),
        inlet_mode: match project.inlet {
            InletDef::Constant => "constant",
            InletDef::Brownian { .. } => "brownian",
        },
        event_count: project.events.len(),
        history_capacity: project.history.capacity,
        record_every: project.history.record_every,
    })
}
