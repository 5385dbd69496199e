use ems_core::PatientId;
use ems_spatial::SpatialError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("invalid call for {patient}: {source}")]
    InvalidCall {
        patient: PatientId,
        #[source]
        source:  SpatialError,
    },
}

pub type DispatchResult<T> = Result<T, DispatchError>;
