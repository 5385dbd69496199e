//! Completion records and fleet events.

use std::fmt;

use ems_core::{AmbulanceId, NodeId, PatientId, Tick};

/// One served patient, emitted when the ambulance reaches the hospital.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRecord {
    pub patient:     PatientId,
    pub ambulance:   AmbulanceId,
    pub hospital:    NodeId,
    pub call_tick:   Tick,
    pub assigned_at: Tick,
    pub hospital_at: Tick,
}

impl ResultRecord {
    /// Ticks between the call and the assignment.
    pub fn wait_ticks(&self) -> u64 {
        self.assigned_at.since(self.call_tick)
    }

    /// Ticks between the call and the hospital arrival.
    pub fn response_ticks(&self) -> u64 {
        self.hospital_at.since(self.call_tick)
    }
}

impl fmt::Display for ResultRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Patient {} called at time {}, received an assignment at {}, reached a hospital at {}",
            self.patient.0, self.call_tick.0, self.assigned_at.0, self.hospital_at.0,
        )
    }
}

/// What [`Fleet::advance_positions`][crate::Fleet::advance_positions] reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FleetEvent {
    /// Patient delivered; the ambulance is free again.  `return_to` is the
    /// station it drives back to, or `None` if the hospital has no station
    /// and the ambulance parks there.
    Released { record: ResultRecord, return_to: Option<NodeId> },

    /// A returning ambulance reached its station.
    ArrivedAtStation { ambulance: AmbulanceId, station: NodeId, tick: Tick },
}
