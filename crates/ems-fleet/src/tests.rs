//! Unit tests for ems-fleet.

use ems_core::{AmbulanceId, NodeId, NodeKind, PatientId, Point, Tick};
use ems_plan::{PatientCall, StationTable};
use ems_spatial::{DijkstraRouter, RoadNetwork, RoadNetworkBuilder, Route, Router};

use crate::{AmbulanceStatus, Fleet, FleetError, FleetEvent};

// ── Helpers ───────────────────────────────────────────────────────────────────

/// `A1 ──5── E1 ──5── H1`, plus `A1 ──10── H1`.
///
/// Node ids: A1 = 0, E1 = 1, H1 = 2.
fn triangle() -> RoadNetwork {
    let mut b = RoadNetworkBuilder::new();
    let a1 = b.add_labeled_node("A1", NodeKind::Station, Point::new(0.0, 0.0)).unwrap();
    let e1 = b.add_labeled_node("E1", NodeKind::EmergencySite, Point::new(5.0, 2.0)).unwrap();
    let h1 = b.add_labeled_node("H1", NodeKind::Hospital, Point::new(10.0, 0.0)).unwrap();
    b.add_road(a1, h1, 10);
    b.add_road(e1, h1, 5);
    b.add_road(a1, e1, 5);
    b.build()
}

const A1: NodeId = NodeId(0);
const E1: NodeId = NodeId(1);
const H1: NodeId = NodeId(2);

fn call_at(site: NodeId, tick: u64) -> PatientCall {
    PatientCall { patient: PatientId(1), site, category: 1, call_tick: Tick(tick) }
}

/// Station → site → hospital route, as the dispatcher builds it.
fn mission_route(net: &RoadNetwork, from: NodeId, site: NodeId, hospital: NodeId) -> Route {
    let to_site = DijkstraRouter.route(net, from, site).unwrap();
    let to_hospital = DijkstraRouter.route(net, site, hospital).unwrap();
    to_site.join(&to_hospital).unwrap()
}

fn one_ambulance() -> Fleet {
    Fleet::from_stations([(AmbulanceId(0), A1)]).unwrap()
}

// ── RouteCursor ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod cursor {
    use super::*;
    use crate::RouteCursor;

    #[test]
    fn steps_when_hop_cost_elapsed() {
        let net = triangle();
        let mut c = RouteCursor::new(mission_route(&net, A1, E1, H1), Tick(0));
        assert_eq!(c.node(), A1);
        assert_eq!(c.remaining_cost(), 10);

        assert_eq!(c.advance(Tick(4)), None);
        assert_eq!(c.advance(Tick(5)), Some(E1));
        assert_eq!(c.leg_start, Tick(5));
        assert_eq!(c.remaining_cost(), 5);
        assert_eq!(c.advance(Tick(9)), None);
        assert_eq!(c.advance(Tick(12)), Some(H1));
        assert!(c.at_end());
        assert_eq!(c.advance(Tick(100)), None);
    }

    #[test]
    fn one_hop_per_tick_on_zero_cost_edges() {
        let mut b = RoadNetworkBuilder::new();
        let n0 = b.add_node(NodeKind::Station, Point::default());
        let n1 = b.add_node(NodeKind::EmergencySite, Point::default());
        let n2 = b.add_node(NodeKind::Hospital, Point::default());
        b.add_road(n0, n1, 0);
        b.add_road(n1, n2, 0);
        let net = b.build();

        let route = Route::from_path(&net, vec![n0, n1, n2]).unwrap();
        let mut c = RouteCursor::new(route, Tick(3));
        assert_eq!(c.advance(Tick(3)), None);
        assert_eq!(c.advance(Tick(4)), Some(n1));
        assert_eq!(c.advance(Tick(4)), None);
        assert_eq!(c.advance(Tick(5)), Some(n2));
    }

    #[test]
    fn trivial_route_is_at_end() {
        let c = RouteCursor::new(Route::trivial(A1), Tick(0));
        assert!(c.at_end());
        assert_eq!(c.next_hop_cost(), None);
    }
}

// ── Fleet membership ──────────────────────────────────────────────────────────

#[cfg(test)]
mod membership {
    use super::*;

    #[test]
    fn duplicate_id_rejected() {
        let err = Fleet::from_stations([(AmbulanceId(3), A1), (AmbulanceId(3), A1)]).unwrap_err();
        assert!(matches!(err, FleetError::DuplicateAmbulance(AmbulanceId(3))));
    }

    #[test]
    fn starts_idle_at_station() {
        let fleet = Fleet::from_stations([(AmbulanceId(1), A1), (AmbulanceId(0), A1)]).unwrap();
        assert_eq!(fleet.len(), 2);
        assert_eq!(fleet.available_count(), 2);
        assert_eq!(fleet.idle_count(), 2);
        assert!(fleet.all_at_station());
        let ids: Vec<_> = fleet.iter().map(|a| a.id).collect();
        assert_eq!(ids, [AmbulanceId(0), AmbulanceId(1)]);
        assert_eq!(fleet.get(AmbulanceId(1)).unwrap().home_station, A1);
    }
}

// ── Candidate search ──────────────────────────────────────────────────────────

#[cfg(test)]
mod candidates {
    use super::*;

    /// A1 ──3── E1 ──9── A2, H1 off A2; A3 on an island.
    fn line() -> (RoadNetwork, [NodeId; 5]) {
        let mut b = RoadNetworkBuilder::new();
        let a1 = b.add_node(NodeKind::Station, Point::default());
        let e1 = b.add_node(NodeKind::EmergencySite, Point::default());
        let a2 = b.add_node(NodeKind::Station, Point::default());
        let h1 = b.add_node(NodeKind::Hospital, Point::default());
        let a3 = b.add_node(NodeKind::Station, Point::default());
        b.add_road(a1, e1, 3);
        b.add_road(e1, a2, 9);
        b.add_road(a2, h1, 1);
        (b.build(), [a1, e1, a2, h1, a3])
    }

    #[test]
    fn unbounded_radius_returns_all_reachable() {
        let (net, [a1, e1, a2, _, a3]) = line();
        let fleet = Fleet::from_stations([
            (AmbulanceId(0), a1),
            (AmbulanceId(1), a2),
            (AmbulanceId(2), a3),
        ])
        .unwrap();
        let found = fleet.find_candidates(&net, &DijkstraRouter, e1, None);
        assert_eq!(found.len(), 2);
        assert_eq!(found[&AmbulanceId(0)].cost(), 3);
        assert_eq!(found[&AmbulanceId(1)].cost(), 9);
        assert_eq!(found[&AmbulanceId(1)].node, a2);
        assert!(!found.contains_key(&AmbulanceId(2)));
    }

    #[test]
    fn radius_filters() {
        let (net, [a1, e1, a2, ..]) = line();
        let fleet = Fleet::from_stations([(AmbulanceId(0), a1), (AmbulanceId(1), a2)]).unwrap();
        let found = fleet.find_candidates(&net, &DijkstraRouter, e1, Some(5));
        assert_eq!(found.keys().copied().collect::<Vec<_>>(), [AmbulanceId(0)]);
    }

    #[test]
    fn falls_back_to_nearest_outside_radius() {
        let (net, [a1, e1, a2, ..]) = line();
        let fleet = Fleet::from_stations([(AmbulanceId(0), a2), (AmbulanceId(1), a1)]).unwrap();
        let found = fleet.find_candidates(&net, &DijkstraRouter, e1, Some(1));
        assert_eq!(found.len(), 1);
        assert_eq!(found[&AmbulanceId(1)].cost(), 3);
    }

    #[test]
    fn nobody_reachable_is_empty() {
        let (net, [_, e1, _, _, a3]) = line();
        let fleet = Fleet::from_stations([(AmbulanceId(0), a3)]).unwrap();
        assert!(fleet.find_candidates(&net, &DijkstraRouter, e1, None).is_empty());
    }

    #[test]
    fn committed_ambulances_are_skipped() {
        let net = triangle();
        let mut fleet = one_ambulance();
        fleet
            .commit(AmbulanceId(0), call_at(E1, 0), H1, mission_route(&net, A1, E1, H1), Tick(0))
            .unwrap();
        assert!(!fleet.has_available());
        assert!(fleet.find_candidates(&net, &DijkstraRouter, E1, None).is_empty());
    }
}

// ── Commit ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod commit {
    use super::*;

    #[test]
    fn availability_is_assignment_plus_route_cost() {
        let net = triangle();
        let mut fleet = one_ambulance();
        let route = mission_route(&net, A1, E1, H1);
        let available_at = fleet.commit(AmbulanceId(0), call_at(E1, 0), H1, route, Tick(2)).unwrap();
        assert_eq!(available_at, Tick(12));

        let m = fleet.get(AmbulanceId(0)).unwrap().mission().unwrap();
        assert_eq!(m.assigned_at, Tick(2));
        assert_eq!(m.available_at, m.assigned_at + m.cursor.route.total_cost);
        assert_eq!(net.path_cost(&m.cursor.route.nodes), Some(m.cursor.route.total_cost));
        assert_eq!(fleet.committed_count(), 1);
        assert_eq!(fleet.available_count(), 0);
    }

    #[test]
    fn double_commit_rejected_without_change() {
        let net = triangle();
        let mut fleet = one_ambulance();
        let route = mission_route(&net, A1, E1, H1);
        fleet.commit(AmbulanceId(0), call_at(E1, 0), H1, route.clone(), Tick(0)).unwrap();
        let before = fleet.get(AmbulanceId(0)).cloned();

        let err = fleet.commit(AmbulanceId(0), call_at(E1, 1), H1, route, Tick(1)).unwrap_err();
        assert!(matches!(err, FleetError::AlreadyCommitted(_)));
        assert_eq!(fleet.get(AmbulanceId(0)).cloned(), before);
    }

    #[test]
    fn unknown_ambulance_rejected() {
        let net = triangle();
        let mut fleet = one_ambulance();
        let err = fleet
            .commit(AmbulanceId(9), call_at(E1, 0), H1, mission_route(&net, A1, E1, H1), Tick(0))
            .unwrap_err();
        assert!(matches!(err, FleetError::UnknownAmbulance(AmbulanceId(9))));
    }

    #[test]
    fn route_must_start_at_ambulance() {
        let net = triangle();
        let mut fleet = one_ambulance();
        let route = DijkstraRouter.route(&net, E1, H1).unwrap();
        let err = fleet.commit(AmbulanceId(0), call_at(E1, 0), H1, route, Tick(0)).unwrap_err();
        assert!(matches!(err, FleetError::RouteMismatch { .. }));
        assert!(fleet.all_at_station());
    }
}

// ── advance_positions ─────────────────────────────────────────────────────────

#[cfg(test)]
mod advance {
    use super::*;

    fn committed_fleet(net: &RoadNetwork) -> Fleet {
        let mut fleet = one_ambulance();
        fleet
            .commit(AmbulanceId(0), call_at(E1, 0), H1, mission_route(net, A1, E1, H1), Tick(0))
            .unwrap();
        fleet
    }

    #[test]
    fn full_cycle_station_hospital_station() {
        let net = triangle();
        let stations = StationTable::build(&net, &DijkstraRouter);
        let mut fleet = committed_fleet(&net);
        let id = AmbulanceId(0);

        for t in 0..5 {
            assert!(fleet.advance_positions(Tick(t), &stations).is_empty());
        }
        assert_eq!(fleet.get(id).unwrap().node, A1);
        fleet.advance_positions(Tick(5), &stations);
        assert_eq!(fleet.get(id).unwrap().node, E1);

        let events = fleet.advance_positions(Tick(10), &stations);
        let [FleetEvent::Released { record, return_to }] = &events[..] else {
            panic!("expected a release, got {events:?}");
        };
        assert_eq!(*return_to, Some(A1));
        assert_eq!((record.call_tick, record.assigned_at, record.hospital_at), (Tick(0), Tick(0), Tick(10)));
        assert_eq!(
            record.to_string(),
            "Patient 1 called at time 0, received an assignment at 0, reached a hospital at 10"
        );

        let amb = fleet.get(id).unwrap();
        assert_eq!(amb.node, H1);
        let AmbulanceStatus::Returning(leg) = &amb.status else { panic!("not returning") };
        assert_eq!(leg.cursor.route.total_cost, 10);
        assert!(amb.is_available());

        for t in 11..20 {
            assert!(fleet.advance_positions(Tick(t), &stations).is_empty());
        }
        let events = fleet.advance_positions(Tick(20), &stations);
        assert_eq!(
            events,
            [FleetEvent::ArrivedAtStation { ambulance: id, station: A1, tick: Tick(20) }]
        );
        assert!(fleet.all_at_station());
        assert_eq!(fleet.get(id).unwrap().node, A1);
    }

    #[test]
    fn second_call_same_tick_is_noop() {
        let net = triangle();
        let stations = StationTable::build(&net, &DijkstraRouter);
        let mut fleet = committed_fleet(&net);

        fleet.advance_positions(Tick(5), &stations);
        let snapshot: Vec<_> = fleet.iter().cloned().collect();
        assert!(fleet.advance_positions(Tick(5), &stations).is_empty());
        assert_eq!(fleet.iter().cloned().collect::<Vec<_>>(), snapshot);

        assert_eq!(fleet.advance_positions(Tick(10), &stations).len(), 1);
        let snapshot: Vec<_> = fleet.iter().cloned().collect();
        assert!(fleet.advance_positions(Tick(10), &stations).is_empty());
        assert_eq!(fleet.iter().cloned().collect::<Vec<_>>(), snapshot);
    }

    #[test]
    fn zero_cost_return_hop_waits_for_next_tick() {
        // S ──0── H ──3── E: the return leg's only hop is free.
        let mut b = RoadNetworkBuilder::new();
        let s = b.add_node(NodeKind::Station, Point::default());
        let h = b.add_node(NodeKind::Hospital, Point::default());
        let e = b.add_node(NodeKind::EmergencySite, Point::default());
        b.add_road(s, h, 0);
        b.add_road(h, e, 3);
        let net = b.build();
        let stations = StationTable::build(&net, &DijkstraRouter);

        let mut fleet = Fleet::from_stations([(AmbulanceId(0), s)]).unwrap();
        let route = mission_route(&net, s, e, h);
        assert_eq!(fleet.commit(AmbulanceId(0), call_at(e, 0), h, route, Tick(0)).unwrap(), Tick(6));
        for t in 0..6 {
            fleet.advance_positions(Tick(t), &stations);
        }

        let events = fleet.advance_positions(Tick(6), &stations);
        assert!(matches!(&events[..], [FleetEvent::Released { return_to: Some(st), .. }] if *st == s));
        let snapshot: Vec<_> = fleet.iter().cloned().collect();
        assert!(fleet.advance_positions(Tick(6), &stations).is_empty());
        assert_eq!(fleet.iter().cloned().collect::<Vec<_>>(), snapshot);

        let events = fleet.advance_positions(Tick(7), &stations);
        assert!(matches!(&events[..], [FleetEvent::ArrivedAtStation { tick: Tick(7), .. }]));
        assert_eq!(fleet.get(AmbulanceId(0)).unwrap().status, AmbulanceStatus::AtStation);
    }

    #[test]
    fn missing_station_entry_parks_at_hospital() {
        let net = triangle();
        let mut fleet = committed_fleet(&net);
        let events = fleet.advance_positions(Tick(10), &StationTable::empty());
        assert!(matches!(&events[..], [FleetEvent::Released { return_to: None, .. }]));
        let amb = fleet.get(AmbulanceId(0)).unwrap();
        assert_eq!(amb.status, AmbulanceStatus::AtStation);
        assert_eq!(amb.node, H1);
    }

    #[test]
    fn returning_ambulance_redispatched_from_current_node() {
        // A1 ──5── E1 ──5── H1 only, so the return leg passes E1.
        let mut b = RoadNetworkBuilder::new();
        let a1 = b.add_node(NodeKind::Station, Point::default());
        let e1 = b.add_node(NodeKind::EmergencySite, Point::default());
        let h1 = b.add_node(NodeKind::Hospital, Point::default());
        b.add_road(a1, e1, 5);
        b.add_road(e1, h1, 5);
        let net = b.build();
        let stations = StationTable::build(&net, &DijkstraRouter);

        let mut fleet = Fleet::from_stations([(AmbulanceId(0), a1)]).unwrap();
        fleet
            .commit(AmbulanceId(0), call_at(e1, 0), h1, mission_route(&net, a1, e1, h1), Tick(0))
            .unwrap();
        for t in 0..=15 {
            fleet.advance_positions(Tick(t), &stations);
        }
        assert_eq!(fleet.returning_count(), 1);
        assert_eq!(fleet.get(AmbulanceId(0)).unwrap().node, e1);

        let found = fleet.find_candidates(&net, &DijkstraRouter, e1, None);
        assert_eq!(found[&AmbulanceId(0)].cost(), 0);

        let route = mission_route(&net, e1, e1, h1);
        let available_at = fleet.commit(AmbulanceId(0), call_at(e1, 15), h1, route, Tick(15)).unwrap();
        assert_eq!(available_at, Tick(20));
        assert_eq!(fleet.returning_count(), 0);
    }

    #[test]
    fn every_ambulance_in_exactly_one_pool() {
        let net = triangle();
        let stations = StationTable::build(&net, &DijkstraRouter);
        let mut fleet = Fleet::from_stations([(AmbulanceId(0), A1), (AmbulanceId(1), A1)]).unwrap();
        fleet
            .commit(AmbulanceId(1), call_at(E1, 0), H1, mission_route(&net, A1, E1, H1), Tick(0))
            .unwrap();
        for t in 0..25 {
            fleet.advance_positions(Tick(t), &stations);
            assert_eq!(fleet.available_count() + fleet.committed_count(), fleet.len());
            assert_eq!(fleet.idle_count() + fleet.returning_count(), fleet.available_count());
        }
    }
}

// ── ResultRecord ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod record {
    use super::*;
    use crate::ResultRecord;

    #[test]
    fn durations() {
        let r = ResultRecord {
            patient:     PatientId(4),
            ambulance:   AmbulanceId(0),
            hospital:    H1,
            call_tick:   Tick(3),
            assigned_at: Tick(7),
            hospital_at: Tick(19),
        };
        assert_eq!(r.wait_ticks(), 4);
        assert_eq!(r.response_ticks(), 16);
    }
}
