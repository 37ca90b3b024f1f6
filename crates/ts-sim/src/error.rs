//! Error types for simulation operations.

use thiserror::Error;
use ts_controls::ControlError;
use ts_core::TsError;
use ts_model::ModelError;

/// Caller-contract and numerical failures of a single integration step.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IntegratorError {
    #[error("Integrator state dimension must be positive")]
    ZeroDimension,

    #[error("State length {actual} does not match integrator dimension {expected}")]
    StateDimension { expected: usize, actual: usize },

    #[error("Input length {actual} does not match integrator dimension {expected}")]
    InputDimension { expected: usize, actual: usize },

    #[error("Derivative length {actual} does not match state dimension {expected}")]
    DerivativeDimension { expected: usize, actual: usize },

    #[error("Integration produced a non-finite state at t={time}")]
    NonFinite { time: f64 },
}

pub type IntegratorResult<T> = Result<T, IntegratorError>;

/// Errors encountered while building or driving a simulator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("Initial state size {actual} does not match model expectation of {expected}")]
    StateDimension { expected: usize, actual: usize },

    #[error("Initial inputs size {actual} does not match model expectation of {expected}")]
    InputDimension { expected: usize, actual: usize },

    #[error("dt must be positive and between {min} and {max} seconds, got {dt}")]
    InvalidTimestep { dt: f64, min: f64, max: f64 },

    #[error(
        "Controller {controller} measured_index {index} is out of bounds for state vector of size {len}"
    )]
    MeasuredIndexOutOfRange {
        controller: usize,
        index: usize,
        len: usize,
    },

    #[error(
        "Controller {controller} output_index {index} is out of bounds for input vector of size {len}"
    )]
    OutputIndexOutOfRange {
        controller: usize,
        index: usize,
        len: usize,
    },

    #[error("Controller {controller}: {source}")]
    Controller {
        controller: usize,
        #[source]
        source: ControlError,
    },

    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Invalid value: {0}")]
    InvalidValue(#[from] TsError),

    #[error("No controller at index {index} (have {count})")]
    UnknownController { index: usize, count: usize },

    #[error("No input at index {index} (have {len})")]
    UnknownInput { index: usize, len: usize },

    #[error("Integrator error: {0}")]
    Integrator(#[from] IntegratorError),
}

impl SimError {
    /// True for errors that can only arise while building a simulator.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            SimError::StateDimension { .. }
                | SimError::InputDimension { .. }
                | SimError::InvalidTimestep { .. }
                | SimError::MeasuredIndexOutOfRange { .. }
                | SimError::OutputIndexOutOfRange { .. }
                | SimError::Controller { .. }
                | SimError::Model(_)
        )
    }
}

pub type SimResult<T> = Result<T, SimError>;
