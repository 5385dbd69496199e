//! The dispatch engine: picks an ambulance for each call or queues it.

use ems_core::{AmbulanceId, NodeId, NodeKind, SimConfig, Tick};
use ems_fleet::{Fleet, FleetEvent, ResultRecord};
use ems_plan::{PatientCall, StationTable};
use ems_spatial::{RoadNetwork, Router};

use crate::{AdmissionQueue, DispatchError, DispatchResult, PendingRequest};

// ── Outcomes ──────────────────────────────────────────────────────────────────

/// Why a call could not be assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueReason {
    /// Every ambulance is committed.
    NoAmbulanceAvailable,
    /// No available ambulance can reach the emergency site.
    NoReachableAmbulance,
    /// The site has no route to its hospital.
    HospitalUnreachable,
}

impl QueueReason {
    pub fn as_str(self) -> &'static str {
        match self {
            QueueReason::NoAmbulanceAvailable => "no_ambulance_available",
            QueueReason::NoReachableAmbulance => "no_reachable_ambulance",
            QueueReason::HospitalUnreachable  => "hospital_unreachable",
        }
    }
}

/// Result of [`DispatchEngine::dispatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Assigned { ambulance: AmbulanceId, available_at: Tick },
    Queued(QueueReason),
    /// Failed and out of attempts (only with `max_attempts` set).
    Abandoned(QueueReason),
}

/// A request dropped after `max_attempts` failures.
#[derive(Debug, Clone)]
pub struct Abandoned {
    pub request: PendingRequest,
    pub reason:  QueueReason,
    pub tick:    Tick,
}

// ── DispatchEngine ────────────────────────────────────────────────────────────

/// Owns the fleet, the admission queue, and the station table for one run.
///
/// # Type parameter
///
/// `R` must implement [`Router`] (e.g. [`ems_spatial::DijkstraRouter`]).
/// Routes are assumed deterministic: the site → hospital leg is computed
/// once per attempt and shared by every candidate.
pub struct DispatchEngine<R: Router> {
    pub router:   R,
    pub fleet:    Fleet,
    pub queue:    AdmissionQueue,
    pub stations: StationTable,

    /// Candidate radius in ticks; `None` = unbounded.
    pub search_radius: Option<u64>,

    /// Failed attempts after which a queued call is dropped; `None` = never.
    pub max_attempts: Option<u32>,

    completions: Vec<ResultRecord>,
    abandoned:   Vec<Abandoned>,
}

impl<R: Router> DispatchEngine<R> {
    pub fn new(router: R, fleet: Fleet, stations: StationTable) -> Self {
        Self {
            router,
            fleet,
            queue: AdmissionQueue::new(),
            stations,
            search_radius: None,
            max_attempts: None,
            completions: Vec::new(),
            abandoned: Vec::new(),
        }
    }

    /// Take `search_radius` and `max_attempts` from `config`.
    pub fn with_config(mut self, config: &SimConfig) -> Self {
        self.search_radius = config.search_radius;
        self.max_attempts = config.max_attempts;
        self
    }

    /// `true` when nothing is queued and every ambulance is at a station.
    pub fn is_idle(&self) -> bool {
        self.queue.is_empty() && self.fleet.all_at_station()
    }

    /// Move the fleet to `now`.  Idempotent within a tick.
    ///
    /// Completion records are kept until [`take_completions`][Self::take_completions].
    pub fn advance(&mut self, now: Tick) -> Vec<FleetEvent> {
        let events = self.fleet.advance_positions(now, &self.stations);
        self.completions.extend(events.iter().filter_map(|e| match e {
            FleetEvent::Released { record, .. } => Some(record.clone()),
            FleetEvent::ArrivedAtStation { .. } => None,
        }));
        events
    }

    /// Completion records produced since the last call, in release order.
    pub fn take_completions(&mut self) -> Vec<ResultRecord> {
        std::mem::take(&mut self.completions)
    }

    /// Requests dropped since the last call.
    pub fn take_abandoned(&mut self) -> Vec<Abandoned> {
        std::mem::take(&mut self.abandoned)
    }

    /// Assign an ambulance to `call` now, or queue it.
    ///
    /// Only a malformed call (site not an emergency site, hospital not a
    /// hospital) is an error; routing and resource failures queue the call.
    pub fn dispatch(
        &mut self,
        network:  &RoadNetwork,
        call:     PatientCall,
        hospital: NodeId,
        now:      Tick,
    ) -> DispatchResult<DispatchOutcome> {
        network
            .expect_kind(call.site, NodeKind::EmergencySite)
            .and_then(|()| network.expect_kind(hospital, NodeKind::Hospital))
            .map_err(|source| DispatchError::InvalidCall { patient: call.patient, source })?;

        self.advance(now);
        match self.try_assign(network, &call, hospital, now) {
            Ok((ambulance, available_at)) => {
                Ok(DispatchOutcome::Assigned { ambulance, available_at })
            }
            Err(reason) => {
                let mut request = self.queue.new_request(call, hospital, now);
                request.attempts = 1;
                if self.max_attempts.is_some_and(|max| request.attempts >= max) {
                    self.abandon(request, reason, now);
                    return Ok(DispatchOutcome::Abandoned(reason));
                }
                tracing::info!(
                    patient = %request.call.patient,
                    %now,
                    reason = reason.as_str(),
                    "call queued"
                );
                self.queue.requeue(request);
                Ok(DispatchOutcome::Queued(reason))
            }
        }
    }

    /// Retry queued calls in priority order while an ambulance is free.
    ///
    /// Each request is tried at most once per call; those that fail again
    /// go back in the queue after the pass with their original sequence
    /// number.  Returns the number of calls assigned.
    pub fn drain(&mut self, network: &RoadNetwork, now: Tick) -> usize {
        self.advance(now);

        let mut assigned = 0;
        let mut deferred = Vec::new();
        while self.fleet.has_available() {
            let Some(mut request) = self.queue.pop() else { break };
            match self.try_assign(network, &request.call, request.hospital, now) {
                Ok(_) => assigned += 1,
                Err(reason) => {
                    request.attempts += 1;
                    if self.max_attempts.is_some_and(|max| request.attempts >= max) {
                        self.abandon(request, reason, now);
                    } else {
                        deferred.push(request);
                    }
                }
            }
        }
        for request in deferred {
            self.queue.requeue(request);
        }

        if assigned > 0 {
            tracing::debug!(%now, assigned, still_queued = self.queue.len(), "queue drained");
        }
        assigned
    }

    // ── Internals ─────────────────────────────────────────────────────────

    /// Pick the ambulance with the lowest (to-site + site-to-hospital) cost,
    /// ties by lowest id, and commit it.
    fn try_assign(
        &mut self,
        network:  &RoadNetwork,
        call:     &PatientCall,
        hospital: NodeId,
        now:      Tick,
    ) -> Result<(AmbulanceId, Tick), QueueReason> {
        if !self.fleet.has_available() {
            return Err(QueueReason::NoAmbulanceAvailable);
        }
        let candidates =
            self.fleet.find_candidates(network, &self.router, call.site, self.search_radius);
        if candidates.is_empty() {
            return Err(QueueReason::NoReachableAmbulance);
        }
        let to_hospital = self
            .router
            .route(network, call.site, hospital)
            .map_err(|_| QueueReason::HospitalUnreachable)?;

        let Some(best) = candidates
            .into_values()
            .min_by_key(|c| (c.cost() + to_hospital.total_cost, c.ambulance))
        else {
            return Err(QueueReason::NoReachableAmbulance);
        };
        let route = best
            .route
            .join(&to_hospital)
            .map_err(|_| QueueReason::HospitalUnreachable)?;

        match self.fleet.commit(best.ambulance, call.clone(), hospital, route, now) {
            Ok(available_at) => Ok((best.ambulance, available_at)),
            Err(e) => {
                tracing::warn!(patient = %call.patient, error = %e, "commit failed");
                Err(QueueReason::NoAmbulanceAvailable)
            }
        }
    }

    fn abandon(&mut self, request: PendingRequest, reason: QueueReason, now: Tick) {
        tracing::warn!(
            patient = %request.call.patient,
            attempts = request.attempts,
            reason = reason.as_str(),
            %now,
            "call abandoned"
        );
        self.abandoned.push(Abandoned { request, reason, tick: now });
    }
}
