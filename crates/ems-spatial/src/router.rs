//! Routing oracle: trait, route value, and default Dijkstra implementation.
//!
//! # Pluggability
//!
//! The fleet and dispatcher call routing via the [`Router`] trait, so
//! applications can swap in custom implementations (A*, precomputed
//! all-pairs tables) without touching the engine.
//!
//! # Determinism
//!
//! A router must always return the same path for the same graph and
//! endpoints.  The dispatcher schedules an ambulance's availability from a
//! route's `total_cost` and walks its position along the same route's
//! `hop_costs`; both views stay consistent only if routing is repeatable.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use ems_core::NodeId;

use crate::network::RoadNetwork;
use crate::{SpatialError, SpatialResult};

// ── Route ─────────────────────────────────────────────────────────────────────

/// One routed leg: the node sequence, the cost of every hop, and the total.
///
/// Invariants: `nodes` is non-empty, `hop_costs.len() == nodes.len() - 1`,
/// and `total_cost == hop_costs.iter().sum()`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Route {
    /// Nodes to visit in order, from origin to destination (both included).
    pub nodes: Vec<NodeId>,
    /// `hop_costs[i]` is the travel time from `nodes[i]` to `nodes[i + 1]`.
    pub hop_costs: Vec<u32>,
    /// Sum of `hop_costs`, in ticks.
    pub total_cost: u64,
}

impl Route {
    /// A zero-cost route that stays at `node`.
    pub fn trivial(node: NodeId) -> Route {
        Route { nodes: vec![node], hop_costs: vec![], total_cost: 0 }
    }

    /// Build a route from a node sequence by reading each hop's weight from
    /// `network`.  Fails if two consecutive nodes are not adjacent.
    pub fn from_path(network: &RoadNetwork, nodes: Vec<NodeId>) -> SpatialResult<Route> {
        let Some(&first) = nodes.first() else {
            return Err(SpatialError::NodeNotFound(NodeId::INVALID));
        };
        if !network.contains(first) {
            return Err(SpatialError::NodeNotFound(first));
        }
        let hop_costs = nodes
            .windows(2)
            .map(|w| {
                network
                    .edge_weight(w[0], w[1])
                    .ok_or(SpatialError::NoRoute { from: w[0], to: w[1] })
            })
            .collect::<SpatialResult<Vec<u32>>>()?;
        let total_cost = hop_costs.iter().map(|&c| u64::from(c)).sum();
        Ok(Route { nodes, hop_costs, total_cost })
    }

    #[inline]
    pub fn origin(&self) -> NodeId {
        self.nodes[0]
    }

    #[inline]
    pub fn destination(&self) -> NodeId {
        self.nodes[self.nodes.len() - 1]
    }

    /// Number of edges along the route.
    #[inline]
    pub fn hop_count(&self) -> usize {
        self.hop_costs.len()
    }

    /// `true` if the origin and destination are the same node.
    pub fn is_trivial(&self) -> bool {
        self.hop_costs.is_empty()
    }

    /// Concatenate `next` onto `self`.  `next` must start where `self` ends;
    /// the shared node appears once in the result.
    pub fn join(&self, next: &Route) -> SpatialResult<Route> {
        if self.destination() != next.origin() {
            return Err(SpatialError::DisjointRoutes {
                end:   self.destination(),
                start: next.origin(),
            });
        }
        let mut nodes = Vec::with_capacity(self.nodes.len() + next.nodes.len() - 1);
        nodes.extend_from_slice(&self.nodes);
        nodes.extend_from_slice(&next.nodes[1..]);

        let mut hop_costs = Vec::with_capacity(self.hop_costs.len() + next.hop_costs.len());
        hop_costs.extend_from_slice(&self.hop_costs);
        hop_costs.extend_from_slice(&next.hop_costs);

        Ok(Route { nodes, hop_costs, total_cost: self.total_cost + next.total_cost })
    }
}

// ── Router trait ──────────────────────────────────────────────────────────────

/// Pluggable, deterministic shortest-path oracle.
///
/// # Thread safety
///
/// Implementations must be `Send + Sync` so candidate lookups can be spread
/// across Rayon workers (fleet feature `parallel`).
pub trait Router: Send + Sync {
    /// Compute the shortest route from `from` to `to`.
    ///
    /// `from == to` yields a trivial route, not an error.  Unconnected
    /// endpoints yield [`SpatialError::NoRoute`].
    fn route(&self, network: &RoadNetwork, from: NodeId, to: NodeId) -> SpatialResult<Route>;

    /// Shortest-path cost only.  Override when the cost is cheaper to obtain
    /// than the full path.
    fn cost(&self, network: &RoadNetwork, from: NodeId, to: NodeId) -> SpatialResult<u64> {
        self.route(network, from, to).map(|r| r.total_cost)
    }
}

impl<R: Router + ?Sized> Router for &R {
    fn route(&self, network: &RoadNetwork, from: NodeId, to: NodeId) -> SpatialResult<Route> {
        (**self).route(network, from, to)
    }
}

// ── DijkstraRouter ────────────────────────────────────────────────────────────

/// Standard Dijkstra's algorithm over the CSR road graph, using
/// `edge_weight` (ticks) as cost.
pub struct DijkstraRouter;

impl Router for DijkstraRouter {
    fn route(&self, network: &RoadNetwork, from: NodeId, to: NodeId) -> SpatialResult<Route> {
        dijkstra(network, from, to)
    }
}

// ── Dijkstra internals ────────────────────────────────────────────────────────

/// Sentinel for "no predecessor edge".
const NO_EDGE: usize = usize::MAX;

fn dijkstra(network: &RoadNetwork, from: NodeId, to: NodeId) -> SpatialResult<Route> {
    for node in [from, to] {
        if !network.contains(node) {
            return Err(SpatialError::NodeNotFound(node));
        }
    }
    if from == to {
        return Ok(Route::trivial(from));
    }

    let n = network.node_count();
    // dist[v] = best known cost (ticks) to reach v.
    let mut dist      = vec![u64::MAX; n];
    // prev_edge[v] = edge index that reached v.
    let mut prev_edge = vec![NO_EDGE; n];

    dist[from.index()] = 0;

    // Min-heap: (cost, node). Reverse makes BinaryHeap (max) behave as min-heap.
    // Secondary key NodeId ensures deterministic tie-breaking.
    let mut heap: BinaryHeap<Reverse<(u64, NodeId)>> = BinaryHeap::new();
    heap.push(Reverse((0, from)));

    while let Some(Reverse((cost, node))) = heap.pop() {
        if node == to {
            return Ok(reconstruct(network, &prev_edge, to, cost));
        }

        // Skip stale heap entries.
        if cost > dist[node.index()] {
            continue;
        }

        for edge in network.out_edges(node) {
            let neighbor = network.edge_to[edge];
            let new_cost = cost.saturating_add(u64::from(network.edge_weight[edge]));

            if new_cost < dist[neighbor.index()] {
                dist[neighbor.index()] = new_cost;
                prev_edge[neighbor.index()] = edge;
                heap.push(Reverse((new_cost, neighbor)));
            }
        }
    }

    Err(SpatialError::NoRoute { from, to })
}

fn reconstruct(network: &RoadNetwork, prev_edge: &[usize], to: NodeId, total_cost: u64) -> Route {
    let mut nodes     = vec![to];
    let mut hop_costs = Vec::new();
    let mut cur = to;
    loop {
        let e = prev_edge[cur.index()];
        if e == NO_EDGE {
            break;
        }
        hop_costs.push(network.edge_weight[e]);
        cur = network.edge_from[e];
        nodes.push(cur);
    }
    nodes.reverse();
    hop_costs.reverse();
    debug_assert_eq!(hop_costs.iter().map(|&c| u64::from(c)).sum::<u64>(), total_cost);
    Route { nodes, hop_costs, total_cost }
}
