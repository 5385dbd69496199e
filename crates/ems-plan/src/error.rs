use ems_spatial::SpatialError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("plan parse error: {0}")]
    Parse(String),

    #[error("station table entry for {hospital} is inconsistent: {msg}")]
    InconsistentAssignment { hospital: String, msg: String },

    #[error(transparent)]
    Spatial(#[from] SpatialError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type PlanResult<T> = Result<T, PlanError>;
