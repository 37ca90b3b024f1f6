//! Project validation logic.

use crate::schema::{EventAction, EventDef, HistoryDef, InletDef, Project};
use ts_model::TankModel;
use ts_sim::{SimError, Simulator, SimulatorConfig};

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },

    #[error("Invalid simulation: {0}")]
    Simulation(#[from] SimError),

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing reference: {id} in {context}")]
    MissingReference { id: String, context: String },
}

pub fn validate_project(project: &Project) -> Result<(), ValidationError> {
    if project.version == 0 || project.version > crate::migrate::LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: project.version,
        });
    }

    // Same checks the simulator runs at construction.
    Simulator::new(project.simulation.clone())?;
    validate_operating_point(&project.simulation)?;

    validate_history(&project.history)?;
    validate_inlet(&project.inlet)?;
    for (i, event) in project.events.iter().enumerate() {
        validate_event(project, i, event)?;
    }
    Ok(())
}

fn invalid(field: impl Into<String>, value: impl ToString, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.into(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Physical range checks on the starting point of a kernel config: setpoints
/// within `[0, max_height]`, inlet flow `>= 0`, valve position in `[0, 1]`.
///
/// Dimensions and indices are left to `Simulator::new`.
pub fn validate_operating_point(config: &SimulatorConfig) -> Result<(), ValidationError> {
    let max_height = config.model.max_height;
    for (i, controller) in config.controllers.iter().enumerate() {
        check_setpoint(
            format!("simulation.controllers[{i}].initial_setpoint"),
            controller.initial_setpoint,
            max_height,
        )?;
    }
    for (index, value) in config.initial_inputs.iter().enumerate() {
        check_input(format!("simulation.initial_inputs[{index}]"), index, *value)?;
    }
    Ok(())
}

fn check_setpoint(field: String, value: f64, max_height: f64) -> Result<(), ValidationError> {
    if (0.0..=max_height).contains(&value) {
        Ok(())
    } else {
        Err(invalid(
            field,
            value,
            &format!("setpoint must be within [0, {max_height}]"),
        ))
    }
}

fn check_input(field: String, index: usize, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(invalid(field, value, "must be finite"));
    }
    match index {
        TankModel::INLET_FLOW if value < 0.0 => {
            Err(invalid(field, value, "inlet flow must be finite and >= 0"))
        }
        TankModel::VALVE_POSITION if !(0.0..=1.0).contains(&value) => {
            Err(invalid(field, value, "valve position must be within [0, 1]"))
        }
        _ => Ok(()),
    }
}

fn validate_history(history: &HistoryDef) -> Result<(), ValidationError> {
    if history.capacity == 0 {
        return Err(invalid("history.capacity", 0, "must be > 0"));
    }
    if history.record_every == 0 {
        return Err(invalid("history.record_every", 0, "must be > 0"));
    }
    Ok(())
}

fn validate_inlet(inlet: &InletDef) -> Result<(), ValidationError> {
    if let InletDef::Brownian { min, max, variance, .. } = *inlet {
        if !min.is_finite() || min < 0.0 {
            return Err(invalid("inlet.min", min, "must be finite and >= 0"));
        }
        if !max.is_finite() || max < min {
            return Err(invalid("inlet.max", max, "must be finite and >= inlet.min"));
        }
        if !variance.is_finite() || variance < 0.0 {
            return Err(invalid("inlet.variance", variance, "must be finite and >= 0"));
        }
    }
    Ok(())
}

fn validate_event(project: &Project, i: usize, event: &EventDef) -> Result<(), ValidationError> {
    let field = |name: &str| format!("events[{i}].{name}");
    let sim = &project.simulation;

    if !event.at_s.is_finite() || event.at_s < 0.0 {
        return Err(invalid(field("at_s"), event.at_s, "must be finite and >= 0"));
    }

    let check_controller = |controller: usize| {
        if controller < sim.controllers.len() {
            Ok(())
        } else {
            Err(ValidationError::MissingReference {
                id: format!("controller {controller}"),
                context: format!("events[{i}]"),
            })
        }
    };

    match &event.action {
        EventAction::SetSetpoint { controller, value } => {
            check_controller(*controller)?;
            check_setpoint(field("value"), *value, sim.model.max_height)?;
        }
        EventAction::SetInletFlow { value } => {
            if !value.is_finite() || *value < 0.0 {
                return Err(invalid(field("value"), value, "inlet flow must be finite and >= 0"));
            }
        }
        EventAction::SetGains { controller, gains } => {
            check_controller(*controller)?;
            gains
                .validate()
                .map_err(|e| invalid(field("gains"), e, "gains rejected"))?;
        }
        EventAction::SetInput { index, value } => {
            if *index >= sim.initial_inputs.len() {
                return Err(ValidationError::MissingReference {
                    id: format!("input {index}"),
                    context: format!("events[{i}]"),
                });
            }
            check_input(field("value"), *index, *value)?;
        }
        EventAction::Reset => {}
    }
    Ok(())
}
