//! The `Fleet`: every ambulance, its status, and its walk along the road
//! network.

use std::collections::BTreeMap;

use ems_core::{AmbulanceId, NodeId, Tick};
use ems_plan::{PatientCall, StationTable};
use ems_spatial::{RoadNetwork, Route, Router, SpatialError};

use crate::state::{Ambulance, AmbulanceStatus, Mission, ReturnLeg, RouteCursor};
use crate::{FleetError, FleetEvent, FleetResult, ResultRecord};

/// An available ambulance that can reach a patient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub ambulance: AmbulanceId,

    /// Node the ambulance would depart from.
    pub node: NodeId,

    /// Route from `node` to the patient.
    pub route: Route,
}

impl Candidate {
    /// Travel time to the patient, in ticks.
    #[inline]
    pub fn cost(&self) -> u64 {
        self.route.total_cost
    }
}

/// All ambulances of a run, keyed (and iterated) in ascending id order.
///
/// The fleet is fixed once built: ambulances change status, never
/// membership.  "Available" means `AtStation` or `Returning`; "committed"
/// means `Committed`.  Because the status is one enum value, every id is in
/// exactly one of the two pools at all times.
#[derive(Debug, Clone, Default)]
pub struct Fleet {
    ambulances: BTreeMap<AmbulanceId, Ambulance>,
}

impl Fleet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a fleet of idle ambulances from `(id, station)` pairs.
    pub fn from_stations(
        placements: impl IntoIterator<Item = (AmbulanceId, NodeId)>,
    ) -> FleetResult<Self> {
        let mut fleet = Self::new();
        for (id, station) in placements {
            fleet.insert(id, station)?;
        }
        Ok(fleet)
    }

    /// Add an idle ambulance at `station`.
    pub fn insert(&mut self, id: AmbulanceId, station: NodeId) -> FleetResult<()> {
        if self.ambulances.contains_key(&id) {
            return Err(FleetError::DuplicateAmbulance(id));
        }
        self.ambulances.insert(id, Ambulance::at_station(id, station));
        Ok(())
    }

    // ── Queries ───────────────────────────────────────────────────────────

    pub fn get(&self, id: AmbulanceId) -> Option<&Ambulance> {
        self.ambulances.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Ambulance> {
        self.ambulances.values()
    }

    pub fn len(&self) -> usize {
        self.ambulances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ambulances.is_empty()
    }

    /// Ambulances that may take a new call.
    pub fn available(&self) -> impl Iterator<Item = &Ambulance> {
        self.ambulances.values().filter(|a| a.is_available())
    }

    pub fn committed(&self) -> impl Iterator<Item = &Ambulance> {
        self.ambulances.values().filter(|a| !a.is_available())
    }

    pub fn has_available(&self) -> bool {
        self.available().next().is_some()
    }

    pub fn available_count(&self) -> usize {
        self.available().count()
    }

    pub fn committed_count(&self) -> usize {
        self.committed().count()
    }

    pub fn returning_count(&self) -> usize {
        self.count_where(|s| matches!(s, AmbulanceStatus::Returning(_)))
    }

    pub fn idle_count(&self) -> usize {
        self.count_where(|s| matches!(s, AmbulanceStatus::AtStation))
    }

    /// `true` when every ambulance is idle at a station.
    pub fn all_at_station(&self) -> bool {
        self.ambulances
            .values()
            .all(|a| matches!(a.status, AmbulanceStatus::AtStation))
    }

    fn count_where(&self, pred: impl Fn(&AmbulanceStatus) -> bool) -> usize {
        self.ambulances.values().filter(|a| pred(&a.status)).count()
    }

    // ── Candidate search ──────────────────────────────────────────────────

    /// Route every available ambulance to `patient` and keep those within
    /// `radius` ticks (`None` = unbounded).
    ///
    /// If nobody is within the radius but somebody can reach the patient at
    /// all, the single nearest ambulance is returned instead (ties: lower
    /// id).  An empty map means no available ambulance can reach `patient`.
    pub fn find_candidates<R: Router>(
        &self,
        network: &RoadNetwork,
        router:  &R,
        patient: NodeId,
        radius:  Option<u64>,
    ) -> BTreeMap<AmbulanceId, Candidate> {
        let origins: Vec<(AmbulanceId, NodeId)> =
            self.available().map(|a| (a.id, a.node)).collect();
        let reachable = route_all(network, router, &origins, patient);

        let (within, outside): (Vec<Candidate>, Vec<Candidate>) = reachable
            .into_iter()
            .partition(|c| radius.is_none_or(|r| c.cost() <= r));

        if !within.is_empty() {
            return within.into_iter().map(|c| (c.ambulance, c)).collect();
        }
        outside
            .into_iter()
            .min_by_key(|c| (c.cost(), c.ambulance))
            .map(|c| (c.ambulance, c))
            .into_iter()
            .collect()
    }

    // ── Mutation ──────────────────────────────────────────────────────────

    /// Commit `id` to `call`, driving `route` (current node → site →
    /// `hospital`) from `now`.
    ///
    /// Returns the availability tick `now + route.total_cost`.  On error the
    /// ambulance is left untouched.
    pub fn commit(
        &mut self,
        id:       AmbulanceId,
        call:     PatientCall,
        hospital: NodeId,
        route:    Route,
        now:      Tick,
    ) -> FleetResult<Tick> {
        let amb = self.ambulances.get_mut(&id).ok_or(FleetError::UnknownAmbulance(id))?;
        if !amb.is_available() {
            return Err(FleetError::AlreadyCommitted(id));
        }
        if route.origin() != amb.node {
            return Err(FleetError::RouteMismatch { ambulance: id, at: amb.node, start: route.origin() });
        }

        let available_at = now + route.total_cost;
        tracing::info!(
            ambulance = %id,
            patient = %call.patient,
            %hospital,
            %now,
            %available_at,
            "ambulance committed"
        );
        amb.status = AmbulanceStatus::Committed(Box::new(Mission {
            call,
            hospital,
            assigned_at: now,
            available_at,
            cursor: RouteCursor::new(route, now),
        }));
        Ok(available_at)
    }

    /// Move every ambulance forward to `now`.
    ///
    /// Committed and returning ambulances take at most one hop each (when
    /// the hop's cost has elapsed since the previous one).  A committed
    /// ambulance whose availability tick has come is released at its
    /// hospital and starts back along the hospital's station route; if
    /// `stations` has no entry for the hospital it parks there instead.
    /// A returning ambulance on its last node becomes idle at the station.
    ///
    /// Calling this twice with the same `now` changes nothing the second
    /// time.  Events are in ascending ambulance order.
    pub fn advance_positions(&mut self, now: Tick, stations: &StationTable) -> Vec<FleetEvent> {
        let mut events = Vec::new();

        for amb in self.ambulances.values_mut() {
            match &mut amb.status {
                AmbulanceStatus::AtStation => {}

                AmbulanceStatus::Committed(mission) => {
                    if let Some(node) = mission.cursor.advance(now) {
                        tracing::debug!(ambulance = %amb.id, %node, %now, "hop toward hospital");
                        amb.node = node;
                    }
                    if mission.available_at > now {
                        continue;
                    }

                    let record = ResultRecord {
                        patient:     mission.call.patient,
                        ambulance:   amb.id,
                        hospital:    mission.hospital,
                        call_tick:   mission.call.call_tick,
                        assigned_at: mission.assigned_at,
                        hospital_at: now,
                    };
                    let hospital = mission.hospital;
                    amb.node = hospital;
                    let return_to = match stations.get(hospital) {
                        Some(assignment) => {
                            amb.status = AmbulanceStatus::Returning(ReturnLeg {
                                hospital,
                                station: assignment.station,
                                cursor:  RouteCursor::new(assignment.route.clone(), now),
                            });
                            Some(assignment.station)
                        }
                        None => {
                            tracing::warn!(
                                ambulance = %amb.id,
                                %hospital,
                                "no station assigned to hospital; parking ambulance there"
                            );
                            amb.status = AmbulanceStatus::AtStation;
                            None
                        }
                    };
                    tracing::info!(ambulance = %amb.id, patient = %record.patient, %now, "patient delivered");
                    events.push(FleetEvent::Released { record, return_to });
                }

                AmbulanceStatus::Returning(leg) => {
                    if let Some(node) = leg.cursor.advance(now) {
                        tracing::debug!(ambulance = %amb.id, %node, %now, "hop toward station");
                        amb.node = node;
                    }
                    if leg.cursor.at_end() {
                        let station = leg.station;
                        amb.node = station;
                        amb.status = AmbulanceStatus::AtStation;
                        tracing::debug!(ambulance = %amb.id, %station, %now, "back at station");
                        events.push(FleetEvent::ArrivedAtStation { ambulance: amb.id, station, tick: now });
                    }
                }
            }
        }

        events
    }
}

// ── Routing fan-out ───────────────────────────────────────────────────────────

fn route_one<R: Router>(
    network:   &RoadNetwork,
    router:    &R,
    ambulance: AmbulanceId,
    from:      NodeId,
    to:        NodeId,
) -> Option<Candidate> {
    match router.route(network, from, to) {
        Ok(route) => Some(Candidate { ambulance, node: from, route }),
        Err(SpatialError::NoRoute { .. }) => None,
        Err(e) => {
            tracing::debug!(%ambulance, error = %e, "candidate routing failed");
            None
        }
    }
}

#[cfg(not(feature = "parallel"))]
fn route_all<R: Router>(
    network: &RoadNetwork,
    router:  &R,
    origins: &[(AmbulanceId, NodeId)],
    to:      NodeId,
) -> Vec<Candidate> {
    origins
        .iter()
        .filter_map(|&(id, from)| route_one(network, router, id, from, to))
        .collect()
}

/// Order-preserving, so the result matches the sequential version.
#[cfg(feature = "parallel")]
fn route_all<R: Router>(
    network: &RoadNetwork,
    router:  &R,
    origins: &[(AmbulanceId, NodeId)],
    to:      NodeId,
) -> Vec<Candidate> {
    use rayon::prelude::*;

    origins
        .par_iter()
        .filter_map(|&(id, from)| route_one(network, router, id, from, to))
        .collect()
}
