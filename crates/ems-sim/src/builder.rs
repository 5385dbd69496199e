//! Fluent builder for constructing a [`Sim`].

use std::collections::BTreeSet;

use ems_core::{AmbulanceId, NodeId, NodeKind, SimConfig, Tick};
use ems_dispatch::DispatchEngine;
use ems_fleet::Fleet;
use ems_plan::{CallSchedule, HospitalLookup, PatientCall, StationTable};
use ems_spatial::{RoadNetwork, Router};

use crate::{Sim, SimError, SimResult};

/// Fluent builder for [`Sim<R>`].
///
/// # Required inputs
///
/// - [`SimConfig`]: grace ticks, stop rule, search radius, …
/// - [`RoadNetwork`]: the typed road graph
/// - `R: Router`: the routing algorithm (e.g. [`ems_spatial::DijkstraRouter`])
///
/// # Optional inputs (have defaults)
///
/// | Method                 | Default                                     |
/// |------------------------|---------------------------------------------|
/// | `.ambulances(v)`       | none (`build` fails on an empty fleet)      |
/// | `.calls(v)`            | no calls                                    |
/// | `.hospital_lookup(l)`  | nearest hospital by road cost for each site |
/// | `.station_table(t)`    | built with `StationTable::build`            |
///
/// The default lookup leaves out sites that reach no hospital; a call at
/// such a site fails `build` with [`SimError::MissingHospital`].
///
/// # Example
///
/// ```rust,ignore
/// let mut sim = SimBuilder::new(config, network, DijkstraRouter)
///     .ambulances([(AmbulanceId(0), a1)])
///     .calls(calls)
///     .hospital_lookup(lookup)
///     .build()?;
/// sim.run(&mut NoopObserver)?;
/// ```
pub struct SimBuilder<R: Router> {
    config:     SimConfig,
    network:    RoadNetwork,
    router:     R,
    ambulances: Vec<(AmbulanceId, NodeId)>,
    calls:      Vec<PatientCall>,
    lookup:     Option<HospitalLookup>,
    stations:   Option<StationTable>,
}

impl<R: Router> SimBuilder<R> {
    /// Create a builder with all required inputs.
    pub fn new(config: SimConfig, network: RoadNetwork, router: R) -> Self {
        Self {
            config,
            network,
            router,
            ambulances: Vec::new(),
            calls:      Vec::new(),
            lookup:     None,
            stations:   None,
        }
    }

    /// Ambulances and the station each starts at.
    pub fn ambulances(mut self, placements: impl IntoIterator<Item = (AmbulanceId, NodeId)>) -> Self {
        self.ambulances.extend(placements);
        self
    }

    /// The run's full call set.  Order does not matter.
    pub fn calls(mut self, calls: impl IntoIterator<Item = PatientCall>) -> Self {
        self.calls.extend(calls);
        self
    }

    /// Emergency site → hospital mapping.  Every call's site needs an entry.
    pub fn hospital_lookup(mut self, lookup: HospitalLookup) -> Self {
        self.lookup = Some(lookup);
        self
    }

    /// A precomputed (or reloaded) station table.  Re-verified on build.
    pub fn station_table(mut self, table: StationTable) -> Self {
        self.stations = Some(table);
        self
    }

    /// Validate inputs, build the station table and dispatch engine, and
    /// return a ready-to-run [`Sim`].
    pub fn build(self) -> SimResult<Sim<R>> {
        let network = self.network;

        // ── Fleet ─────────────────────────────────────────────────────────
        if self.ambulances.is_empty() {
            return Err(SimError::Config("the fleet has no ambulances".into()));
        }
        for &(_, station) in &self.ambulances {
            network.expect_kind(station, NodeKind::Station)?;
        }
        let fleet = Fleet::from_stations(self.ambulances)?;

        // ── Hospital lookup ───────────────────────────────────────────────
        let lookup = match self.lookup {
            Some(l) => l,
            None => HospitalLookup::nearest_by_cost(&network, &self.router),
        };
        for (site, hospital) in lookup.iter() {
            network.expect_kind(site, NodeKind::EmergencySite)?;
            network.expect_kind(hospital, NodeKind::Hospital)?;
        }

        // ── Calls ─────────────────────────────────────────────────────────
        let mut patients = BTreeSet::new();
        for call in &self.calls {
            if !patients.insert(call.patient) {
                return Err(SimError::DuplicatePatient(call.patient));
            }
            network.expect_kind(call.site, NodeKind::EmergencySite)?;
            if lookup.get(call.site).is_none() {
                return Err(SimError::MissingHospital { patient: call.patient, site: call.site });
            }
        }
        let schedule = CallSchedule::build_from_calls(self.calls);
        let horizon = self.config.horizon(schedule.last_tick().unwrap_or(Tick::ZERO));

        // ── Station table ─────────────────────────────────────────────────
        let stations = match self.stations {
            Some(t) => {
                t.verify(&network)?;
                t
            }
            None => StationTable::build(&network, &self.router),
        };
        for hospital in stations.unassigned_hospitals(&network) {
            tracing::warn!(
                hospital = network.label(hospital),
                "hospital has no station; ambulances delivering there will stay"
            );
        }

        tracing::info!(
            ambulances = fleet.len(),
            calls = schedule.len(),
            %horizon,
            "simulation built"
        );

        let engine = DispatchEngine::new(self.router, fleet, stations).with_config(&self.config);
        Ok(Sim {
            clock: self.config.make_clock(),
            config: self.config,
            network,
            engine,
            schedule,
            hospitals: lookup,
            horizon,
        })
    }
}
