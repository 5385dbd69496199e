//! Station Assignment Table: every hospital's nearest ambulance station.
//!
//! After delivering a patient, an ambulance drives back to the station
//! assigned to the hospital it delivered to.  The table stores the whole
//! hospital→station [`Route`] so the fleet can walk it hop by hop and the
//! stored travel time is, by construction, the route's cumulative weight.

use std::collections::BTreeMap;

use ems_core::{NodeId, NodeKind};
use ems_spatial::{RoadNetwork, Route, Router, SpatialError};

use crate::{PlanError, PlanResult};

/// One table entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StationAssignment {
    pub hospital: NodeId,
    pub station: NodeId,
    /// Travel time hospital → station, in ticks.  Always equals
    /// `route.total_cost`.
    pub travel_time: u64,
    /// Route from the hospital to the station.
    pub route: Route,
}

/// Immutable hospital → nearest-station mapping.
///
/// Hospitals that no station can reach are absent; the dispatcher treats a
/// missing entry as "no return route" and parks the ambulance at the
/// hospital.
#[derive(Clone, Debug, Default)]
pub struct StationTable {
    entries: BTreeMap<NodeId, StationAssignment>,
}

impl StationTable {
    /// An empty table (every hospital unassigned).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Precompute the nearest station for every hospital in `network`.
    ///
    /// Stations are compared by their station→hospital cost; ties go to the
    /// lower `NodeId`.  The stored route runs hospital→station and its own
    /// cost becomes the travel time.
    pub fn build<R: Router>(network: &RoadNetwork, router: &R) -> Self {
        let stations: Vec<NodeId> = network.nodes_of_kind(NodeKind::Station).collect();
        let mut entries = BTreeMap::new();

        for hospital in network.nodes_of_kind(NodeKind::Hospital) {
            let mut best: Option<(u64, NodeId)> = None;
            for &station in &stations {
                match router.cost(network, station, hospital) {
                    Ok(cost) if best.is_none_or(|(c, _)| cost < c) => best = Some((cost, station)),
                    Ok(_) | Err(SpatialError::NoRoute { .. }) => {}
                    Err(e) => tracing::warn!(%hospital, %station, error = %e, "station lookup failed"),
                }
            }

            let Some((_, station)) = best else {
                tracing::warn!(hospital = network.label(hospital), "no station can reach hospital");
                continue;
            };
            match router.route(network, hospital, station) {
                Ok(route) => {
                    entries.insert(hospital, StationAssignment {
                        hospital,
                        station,
                        travel_time: route.total_cost,
                        route,
                    });
                }
                Err(e) => tracing::warn!(
                    hospital = network.label(hospital),
                    error = %e,
                    "hospital cannot reach its nearest station"
                ),
            }
        }

        tracing::info!(
            assigned = entries.len(),
            hospitals = network.nodes_of_kind(NodeKind::Hospital).count(),
            "station assignment table built"
        );
        Self { entries }
    }

    /// Assemble a table from existing entries (e.g. loaded from disk),
    /// validating each against `network`.
    pub fn from_assignments(
        network:     &RoadNetwork,
        assignments: impl IntoIterator<Item = StationAssignment>,
    ) -> PlanResult<Self> {
        let mut entries = BTreeMap::new();
        for a in assignments {
            validate(network, &a)?;
            if entries.insert(a.hospital, a).is_some() {
                return Err(PlanError::Parse("duplicate hospital in station table".into()));
            }
        }
        Ok(Self { entries })
    }

    pub fn get(&self, hospital: NodeId) -> Option<&StationAssignment> {
        self.entries.get(&hospital)
    }

    /// Entries in ascending hospital order.
    pub fn iter(&self) -> impl Iterator<Item = &StationAssignment> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Hospitals in `network` with no entry.
    pub fn unassigned_hospitals<'a>(
        &'a self,
        network: &'a RoadNetwork,
    ) -> impl Iterator<Item = NodeId> + 'a {
        network
            .nodes_of_kind(NodeKind::Hospital)
            .filter(|h| !self.entries.contains_key(h))
    }

    /// Re-check every entry against `network`.
    pub fn verify(&self, network: &RoadNetwork) -> PlanResult<()> {
        self.entries.values().try_for_each(|a| validate(network, a))
    }
}

fn validate(network: &RoadNetwork, a: &StationAssignment) -> PlanResult<()> {
    let fail = |msg: String| PlanError::InconsistentAssignment {
        hospital: network.label(a.hospital).to_owned(),
        msg,
    };
    network.expect_kind(a.hospital, NodeKind::Hospital)?;
    network.expect_kind(a.station, NodeKind::Station)?;
    if a.route.origin() != a.hospital || a.route.destination() != a.station {
        return Err(fail("route does not run from the hospital to the station".into()));
    }
    match network.path_cost(&a.route.nodes) {
        Some(cost) if cost == a.travel_time && cost == a.route.total_cost => Ok(()),
        Some(cost) => Err(fail(format!(
            "travel time {} but route weighs {cost}",
            a.travel_time
        ))),
        None => Err(fail("route uses a missing road".into())),
    }
}
