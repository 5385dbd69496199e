use ems_core::{AmbulanceId, NodeId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FleetError {
    #[error("ambulance {0} is not part of the fleet")]
    UnknownAmbulance(AmbulanceId),

    #[error("ambulance {0} is already in the fleet")]
    DuplicateAmbulance(AmbulanceId),

    #[error("ambulance {0} is already committed to a patient")]
    AlreadyCommitted(AmbulanceId),

    #[error("route for ambulance {ambulance} starts at {start}, but the ambulance is at {at}")]
    RouteMismatch { ambulance: AmbulanceId, at: NodeId, start: NodeId },
}

pub type FleetResult<T> = Result<T, FleetError>;
