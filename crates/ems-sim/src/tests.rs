//! Unit tests for ems-sim.

use ems_core::{AmbulanceId, NodeId, NodeKind, PatientId, Point, SimConfig, Tick};
use ems_dispatch::{Abandoned, DispatchOutcome, QueueReason};
use ems_fleet::ResultRecord;
use ems_plan::{HospitalLookup, PatientCall};
use ems_spatial::{DijkstraRouter, RoadNetwork, RoadNetworkBuilder};

use crate::{NoopObserver, Sim, SimBuilder, SimError, SimObserver, TickSummary};

// ── Helpers ───────────────────────────────────────────────────────────────────

/// `A1 ──10── H1`, `E1 ──5── H1`, `A1 ──5── E1`; E2 and H9 are islands
/// joined only to each other.
///
/// Node ids: A1 = 0, E1 = 1, H1 = 2, E2 = 3, H9 = 4.
fn city() -> RoadNetwork {
    let mut b = RoadNetworkBuilder::new();
    let a1 = b.add_labeled_node("A1", NodeKind::Station, Point::default()).unwrap();
    let e1 = b.add_labeled_node("E1", NodeKind::EmergencySite, Point::default()).unwrap();
    let h1 = b.add_labeled_node("H1", NodeKind::Hospital, Point::default()).unwrap();
    let e2 = b.add_labeled_node("E2", NodeKind::EmergencySite, Point::default()).unwrap();
    let h9 = b.add_labeled_node("H9", NodeKind::Hospital, Point::default()).unwrap();
    b.add_road(a1, h1, 10);
    b.add_road(e1, h1, 5);
    b.add_road(a1, e1, 5);
    b.add_road(e2, h9, 3);
    b.build()
}

const A1: NodeId = NodeId(0);
const E1: NodeId = NodeId(1);
const H1: NodeId = NodeId(2);
const E2: NodeId = NodeId(3);
const H9: NodeId = NodeId(4);

fn call(patient: u32, site: NodeId, tick: u64) -> PatientCall {
    PatientCall { patient: PatientId(patient), site, category: 1, call_tick: Tick(tick) }
}

fn lookup() -> HospitalLookup {
    [(E1, H1), (E2, H9)].into_iter().collect()
}

fn sim_with(config: SimConfig, calls: Vec<PatientCall>) -> Sim<DijkstraRouter> {
    SimBuilder::new(config, city(), DijkstraRouter)
        .ambulances([(AmbulanceId(0), A1)])
        .calls(calls)
        .hospital_lookup(lookup())
        .build()
        .unwrap()
}

/// Records every observer callback.
#[derive(Default)]
struct Recorder {
    calls:       Vec<(Tick, PatientId, DispatchOutcome)>,
    completions: Vec<ResultRecord>,
    abandoned:   Vec<Abandoned>,
    summaries:   Vec<TickSummary>,
    started:     Vec<Tick>,
    ended:       Option<Tick>,
}

impl SimObserver for Recorder {
    fn on_tick_start(&mut self, tick: Tick) {
        self.started.push(tick);
    }
    fn on_call(&mut self, tick: Tick, call: &PatientCall, outcome: &DispatchOutcome) {
        self.calls.push((tick, call.patient, *outcome));
    }
    fn on_completion(&mut self, record: &ResultRecord) {
        self.completions.push(record.clone());
    }
    fn on_abandoned(&mut self, abandoned: &Abandoned) {
        self.abandoned.push(abandoned.clone());
    }
    fn on_tick_end(&mut self, summary: &TickSummary) {
        self.summaries.push(*summary);
    }
    fn on_sim_end(&mut self, final_tick: Tick) {
        self.ended = Some(final_tick);
    }
}

// ── Builder validation ────────────────────────────────────────────────────────

#[cfg(test)]
mod builder {
    use super::*;

    fn base() -> SimBuilder<DijkstraRouter> {
        SimBuilder::new(SimConfig::default(), city(), DijkstraRouter)
    }

    #[test]
    fn empty_fleet_rejected() {
        let err = base().calls([call(1, E1, 0)]).build().err().unwrap();
        assert!(matches!(err, SimError::Config(_)), "{err}");
    }

    #[test]
    fn ambulance_must_start_at_station() {
        let err = base().ambulances([(AmbulanceId(0), H1)]).build().err().unwrap();
        assert!(matches!(err, SimError::Spatial(_)), "{err}");
    }

    #[test]
    fn duplicate_ambulance_rejected() {
        let err = base()
            .ambulances([(AmbulanceId(0), A1), (AmbulanceId(0), A1)])
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, SimError::Fleet(_)), "{err}");
    }

    #[test]
    fn site_reaching_no_hospital_fails_with_default_lookup() {
        // E1 is isolated, so the derived lookup has no entry for it.
        let mut b = RoadNetworkBuilder::new();
        let a1 = b.add_node(NodeKind::Station, Point::default());
        let h1 = b.add_node(NodeKind::Hospital, Point::default());
        let e1 = b.add_node(NodeKind::EmergencySite, Point::default());
        b.add_road(a1, h1, 4);

        let err = SimBuilder::new(SimConfig::default(), b.build(), DijkstraRouter)
            .ambulances([(AmbulanceId(0), a1)])
            .calls([call(1, e1, 0)])
            .build()
            .err()
            .unwrap();
        assert!(
            matches!(err, SimError::MissingHospital { patient: PatientId(1), site } if site == e1),
            "{err}"
        );
    }

    #[test]
    fn duplicate_patient_rejected() {
        let err = base()
            .ambulances([(AmbulanceId(0), A1)])
            .calls([call(1, E1, 0), call(1, E1, 4)])
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, SimError::DuplicatePatient(PatientId(1))), "{err}");
    }

    #[test]
    fn call_site_must_be_emergency_site() {
        let err = base()
            .ambulances([(AmbulanceId(0), A1)])
            .calls([call(1, H1, 0)])
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, SimError::Spatial(_)), "{err}");
    }

    #[test]
    fn missing_lookup_entry_rejected() {
        let err = base()
            .ambulances([(AmbulanceId(0), A1)])
            .calls([call(1, E2, 0)])
            .hospital_lookup([(E1, H1)].into_iter().collect())
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, SimError::MissingHospital { site: E2, .. }), "{err}");
    }

    #[test]
    fn default_lookup_is_nearest_hospital() {
        let sim = base().ambulances([(AmbulanceId(0), A1)]).build().unwrap();
        assert_eq!(sim.hospitals.get(E1), Some(H1));
        assert_eq!(sim.hospitals.get(E2), Some(H9));
    }

    #[test]
    fn horizon_is_last_call_plus_grace() {
        let config = SimConfig { grace_ticks: 7, ..SimConfig::default() };
        let sim = sim_with(config, vec![call(1, E1, 3), call(2, E1, 12)]);
        assert_eq!(sim.horizon, Tick(19));
        assert_eq!(sim.schedule.len(), 2);
    }
}

// ── Tick loop ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod run {
    use super::*;

    #[test]
    fn single_call_round_trip() {
        let mut sim = sim_with(SimConfig::default(), vec![call(1, E1, 0)]);
        let mut rec = Recorder::default();
        sim.run(&mut rec).unwrap();

        assert_eq!(
            rec.calls,
            [(Tick(0), PatientId(1), DispatchOutcome::Assigned {
                ambulance:    AmbulanceId(0),
                available_at: Tick(10),
            })]
        );
        assert_eq!(rec.completions.len(), 1);
        assert_eq!(
            rec.completions[0].to_string(),
            "Patient 1 called at time 0, received an assignment at 0, reached a hospital at 10"
        );

        // Back at A1 at tick 20; the run stops after that tick.
        assert_eq!(rec.ended, Some(Tick(21)));
        let last = rec.summaries.last().unwrap();
        assert_eq!((last.tick, last.idle, last.returning), (Tick(20), 1, 0));
        let at_19 = rec.summaries[19];
        assert_eq!((at_19.returning, at_19.idle), (1, 0));
        assert!(sim.engine.is_idle());
    }

    #[test]
    fn queued_call_served_before_later_call() {
        let calls = vec![call(1, E1, 0), call(2, E1, 0), call(3, E1, 1)];
        let mut sim = sim_with(SimConfig::default(), calls);
        let mut rec = Recorder::default();
        sim.run(&mut rec).unwrap();

        assert_eq!(rec.calls[1].2, DispatchOutcome::Queued(QueueReason::NoAmbulanceAvailable));
        let served: Vec<_> = rec
            .completions
            .iter()
            .map(|r| (r.patient.0, r.call_tick.0, r.assigned_at.0, r.hospital_at.0))
            .collect();
        assert_eq!(served, [(1, 0, 0, 10), (2, 0, 10, 20), (3, 1, 20, 30)]);
        assert!(rec.abandoned.is_empty());
    }

    #[test]
    fn unreachable_hospital_stays_queued_and_run_terminates() {
        // E1 is reachable, but its assigned hospital H9 is not.
        let config = SimConfig { grace_ticks: 25, ..SimConfig::default() };
        let mut sim = SimBuilder::new(config, city(), DijkstraRouter)
            .ambulances([(AmbulanceId(0), A1)])
            .calls([call(1, E1, 2)])
            .hospital_lookup([(E1, H9)].into_iter().collect())
            .build()
            .unwrap();
        let mut rec = Recorder::default();
        sim.run(&mut rec).unwrap();

        assert_eq!(rec.calls[0].2, DispatchOutcome::Queued(QueueReason::HospitalUnreachable));
        assert_eq!(rec.ended, Some(Tick(28)));
        assert_eq!(rec.started.last(), Some(&Tick(27)));
        assert_eq!(sim.engine.queue.len(), 1);
        assert!(rec.completions.is_empty());
        assert!(rec.summaries.iter().skip(2).all(|s| s.queued == 1 && s.idle == 1));
    }

    #[test]
    fn max_attempts_abandons_unservable_call() {
        // No ambulance can reach E2.
        let config = SimConfig { max_attempts: Some(4), ..SimConfig::default() };
        let mut sim = sim_with(config, vec![call(1, E2, 0)]);
        let mut rec = Recorder::default();
        sim.run(&mut rec).unwrap();

        assert_eq!(rec.abandoned.len(), 1);
        assert_eq!(rec.abandoned[0].request.call.patient, PatientId(1));
        assert!(sim.engine.queue.is_empty());
        // Idle with nothing queued: stops well before the horizon.
        assert!(rec.ended.unwrap() < sim.horizon);
    }

    #[test]
    fn keeps_running_past_idle_without_stop_rule() {
        let config = SimConfig { grace_ticks: 30, stop_when_idle: false, ..SimConfig::default() };
        let mut sim = sim_with(config, vec![call(1, E1, 0)]);
        let mut rec = Recorder::default();
        sim.run(&mut rec).unwrap();
        assert_eq!(rec.started.len(), 31);
        assert_eq!(rec.ended, Some(Tick(31)));
    }

    #[test]
    fn waits_for_late_calls() {
        let mut sim = sim_with(SimConfig::default(), vec![call(1, E1, 40)]);
        let mut rec = Recorder::default();
        sim.run(&mut rec).unwrap();
        assert_eq!(rec.completions[0].hospital_at, Tick(50));
        assert!(rec.summaries[..40].iter().all(|s| s.calls == 0 && s.idle == 1));
    }

    #[test]
    fn no_calls_finishes_immediately() {
        let mut sim = sim_with(SimConfig::default(), vec![]);
        let mut rec = Recorder::default();
        sim.run(&mut rec).unwrap();
        assert!(rec.started.is_empty());
        assert_eq!(rec.ended, Some(Tick(0)));
    }

    #[test]
    fn run_ticks_steps_exactly() {
        let mut sim = sim_with(SimConfig::default(), vec![call(1, E1, 0)]);
        sim.run_ticks(6, &mut NoopObserver).unwrap();
        assert_eq!(sim.clock.current_tick, Tick(6));
        assert_eq!(sim.engine.fleet.get(AmbulanceId(0)).unwrap().node, E1);
    }

    #[test]
    fn every_ambulance_in_one_pool_each_tick() {
        let calls: Vec<_> = (1..=6).map(|p| call(p, E1, u64::from(p) * 3)).collect();
        let mut sim = SimBuilder::new(SimConfig::default(), city(), DijkstraRouter)
            .ambulances([(AmbulanceId(0), A1), (AmbulanceId(1), A1)])
            .calls(calls)
            .hospital_lookup(lookup())
            .build()
            .unwrap();
        let mut rec = Recorder::default();
        sim.run(&mut rec).unwrap();

        for s in &rec.summaries {
            assert_eq!(s.committed + s.returning + s.idle, 2, "tick {}", s.tick);
        }
        assert_eq!(rec.completions.len(), 6);
        assert!(rec.completions.windows(2).all(|w| w[0].hospital_at <= w[1].hospital_at));
    }
}
