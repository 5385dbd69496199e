//! Plain data row types written by output backends.

use ems_dispatch::Abandoned;
use ems_fleet::ResultRecord;
use ems_sim::TickSummary;

/// One completion log entry: a patient delivered to a hospital.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionRow {
    pub patient_id:     u32,
    pub ambulance_id:   u32,
    pub hospital_node:  u32,
    pub call_tick:      u64,
    pub assigned_tick:  u64,
    pub hospital_tick:  u64,
    /// `assigned_tick - call_tick`.
    pub wait_ticks:     u64,
    /// `hospital_tick - call_tick`.
    pub response_ticks: u64,
}

impl From<&ResultRecord> for CompletionRow {
    fn from(r: &ResultRecord) -> Self {
        Self {
            patient_id:     r.patient.0,
            ambulance_id:   r.ambulance.0,
            hospital_node:  r.hospital.0,
            call_tick:      r.call_tick.0,
            assigned_tick:  r.assigned_at.0,
            hospital_tick:  r.hospital_at.0,
            wait_ticks:     r.wait_ticks(),
            response_ticks: r.response_ticks(),
        }
    }
}

/// A queued call dropped after too many failed attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AbandonedRow {
    pub patient_id:     u32,
    pub call_tick:      u64,
    pub abandoned_tick: u64,
    pub attempts:       u32,
    pub reason:         &'static str,
}

impl From<&Abandoned> for AbandonedRow {
    fn from(a: &Abandoned) -> Self {
        Self {
            patient_id:     a.request.call.patient.0,
            call_tick:      a.request.call.call_tick.0,
            abandoned_tick: a.tick.0,
            attempts:       a.request.attempts,
            reason:         a.reason.as_str(),
        }
    }
}

/// Summary statistics for one simulation tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSummaryRow {
    pub tick:         u64,
    pub elapsed_secs: u64,
    pub calls:        u64,
    pub assigned:     u64,
    pub completed:    u64,
    pub queued:       u64,
    pub committed:    u64,
    pub returning:    u64,
    pub idle:         u64,
}

impl TickSummaryRow {
    pub fn new(s: &TickSummary, tick_duration_secs: u32) -> Self {
        Self {
            tick:         s.tick.0,
            elapsed_secs: s.tick.0 * u64::from(tick_duration_secs),
            calls:        s.calls as u64,
            assigned:     s.assigned as u64,
            completed:    s.completed as u64,
            queued:       s.queued as u64,
            committed:    s.committed as u64,
            returning:    s.returning as u64,
            idle:         s.idle as u64,
        }
    }
}
