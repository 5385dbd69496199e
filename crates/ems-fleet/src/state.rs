//! Per-ambulance state.

use ems_core::{AmbulanceId, NodeId, Tick};
use ems_plan::PatientCall;
use ems_spatial::Route;

// ── RouteCursor ───────────────────────────────────────────────────────────────

/// Position along a stored [`Route`].
///
/// The cursor never re-queries the graph: hop costs come from the route
/// itself, so the walk and the route's `total_cost` cannot disagree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteCursor {
    pub route: Route,

    /// Index into `route.nodes` of the node the ambulance is at.
    pub index: usize,

    /// Tick the current hop began (the anchor the next hop is timed from).
    pub leg_start: Tick,

    /// Last tick a hop was taken; limits the walk to one hop per tick.
    stepped_at: Option<Tick>,
}

impl RouteCursor {
    /// A cursor at the route's origin, with the first hop starting at `now`.
    ///
    /// The tick a leg is created counts as that tick's step, so even a
    /// zero-cost first hop waits for the next tick.
    pub fn new(route: Route, now: Tick) -> Self {
        Self { route, index: 0, leg_start: now, stepped_at: Some(now) }
    }

    /// Node the cursor is at.
    #[inline]
    pub fn node(&self) -> NodeId {
        self.route.nodes[self.index]
    }

    /// `true` once the cursor sits on the route's last node.
    #[inline]
    pub fn at_end(&self) -> bool {
        self.index >= self.route.hop_count()
    }

    /// Cost of the hop leaving the current node, `None` at the end.
    pub fn next_hop_cost(&self) -> Option<u32> {
        self.route.hop_costs.get(self.index).copied()
    }

    /// Cost of the hops not yet taken.
    pub fn remaining_cost(&self) -> u64 {
        self.route.hop_costs[self.index..].iter().map(|&c| u64::from(c)).sum()
    }

    /// Take the next hop if its cost has elapsed since `leg_start`.
    ///
    /// At most one hop per tick: a second call with the same `now` is a
    /// no-op.  Returns the node stepped onto.
    pub fn advance(&mut self, now: Tick) -> Option<NodeId> {
        if self.stepped_at == Some(now) {
            return None;
        }
        let cost = self.next_hop_cost()?;
        if now.since(self.leg_start) < u64::from(cost) {
            return None;
        }
        self.index += 1;
        self.leg_start = now;
        self.stepped_at = Some(now);
        Some(self.node())
    }
}

// ── Status ────────────────────────────────────────────────────────────────────

/// An ambulance serving a call: site first, then the hospital.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mission {
    pub call: PatientCall,

    /// Hospital the patient is delivered to (the route's last node).
    pub hospital: NodeId,

    pub assigned_at: Tick,

    /// `assigned_at + route.total_cost`; the ambulance is released at this
    /// tick.
    pub available_at: Tick,

    /// Walk along current node → site → hospital.
    pub cursor: RouteCursor,
}

/// An ambulance driving back to a station after a delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnLeg {
    /// Hospital the leg started from.
    pub hospital: NodeId,
    pub station: NodeId,
    pub cursor: RouteCursor,
}

/// Exactly one of these holds for every ambulance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AmbulanceStatus {
    /// Idle at a station.
    AtStation,
    Committed(Box<Mission>),
    /// Free for dispatch from wherever it is along the leg.
    Returning(ReturnLeg),
}

impl AmbulanceStatus {
    /// `AtStation` or `Returning`.
    #[inline]
    pub fn is_available(&self) -> bool {
        !matches!(self, AmbulanceStatus::Committed(_))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AmbulanceStatus::AtStation    => "at_station",
            AmbulanceStatus::Committed(_) => "committed",
            AmbulanceStatus::Returning(_) => "returning",
        }
    }
}

// ── Ambulance ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ambulance {
    pub id: AmbulanceId,

    /// Station the ambulance starts the run at.
    pub home_station: NodeId,

    /// Node the ambulance is at now.  Updated hop by hop while moving.
    pub node: NodeId,

    pub status: AmbulanceStatus,
}

impl Ambulance {
    /// An idle ambulance at `station`.
    pub fn at_station(id: AmbulanceId, station: NodeId) -> Self {
        Self { id, home_station: station, node: station, status: AmbulanceStatus::AtStation }
    }

    #[inline]
    pub fn is_available(&self) -> bool {
        self.status.is_available()
    }

    /// The mission, if committed.
    pub fn mission(&self) -> Option<&Mission> {
        match &self.status {
            AmbulanceStatus::Committed(m) => Some(m),
            _ => None,
        }
    }
}
