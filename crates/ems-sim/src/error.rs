use ems_core::{NodeId, PatientId};
use ems_dispatch::DispatchError;
use ems_fleet::FleetError;
use ems_plan::PlanError;
use ems_spatial::SpatialError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(String),

    #[error("patient {0} appears in more than one call")]
    DuplicatePatient(PatientId),

    #[error("no hospital is assigned to emergency site {site} (needed by {patient})")]
    MissingHospital { patient: PatientId, site: NodeId },

    #[error("invalid node: {0}")]
    Spatial(#[from] SpatialError),

    #[error("fleet error: {0}")]
    Fleet(#[from] FleetError),

    #[error("station table error: {0}")]
    Plan(#[from] PlanError),

    #[error("dispatch error: {0}")]
    Dispatch(#[from] DispatchError),
}

pub type SimResult<T> = Result<T, SimError>;
