//! Error types for the ts-app service layer.

use std::path::PathBuf;

/// Application error type wrapping backend crate errors behind one interface.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Project error: {0}")]
    Project(String),

    #[error("Failed to write project file: {path}")]
    ProjectFileWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Project file already exists: {0}")]
    ProjectExists(PathBuf),

    #[error("Simulation error: {0}")]
    Simulation(String),

    #[error("Results error: {0}")]
    Results(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for ts-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl From<ts_project::ProjectError> for AppError {
    fn from(err: ts_project::ProjectError) -> Self {
        AppError::Project(err.to_string())
    }
}

impl From<ts_sim::SimError> for AppError {
    fn from(err: ts_sim::SimError) -> Self {
        AppError::Simulation(err.to_string())
    }
}

impl From<ts_results::ResultsError> for AppError {
    fn from(err: ts_results::ResultsError) -> Self {
        AppError::Results(err.to_string())
    }
}
