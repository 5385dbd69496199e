//! Road network representation and builder.
//!
//! # Data layout
//!
//! The graph uses **Compressed Sparse Row (CSR)** format for outgoing edges.
//! Given a `NodeId n`, its outgoing edges occupy the slice:
//!
//! ```text
//! edge_to[ node_out_start[n] .. node_out_start[n+1] ]
//! ```
//!
//! Every road is stored as two directed edges, one per direction, so the
//! graph is undirected from the router's point of view.  Edge weights are
//! travel times in whole simulation ticks.
//!
//! Nodes carry a [`NodeKind`] tag, a planar position, and a text label.  The
//! label is the legacy `E12` / `H3` / `A210` name when the network came from
//! a graph file; builder-created nodes get a synthetic label of the same
//! shape.

use std::collections::HashMap;

use ems_core::{NodeId, NodeKind, Point};

use crate::{SpatialError, SpatialResult};

// ── RoadNetwork ───────────────────────────────────────────────────────────────

/// Undirected, weighted road graph in CSR format.
///
/// All fields are `pub` for direct indexed access on hot paths.  Do not
/// construct directly; use [`RoadNetworkBuilder`].
#[derive(Debug)]
pub struct RoadNetwork {
    // ── Node data ─────────────────────────────────────────────────────────
    /// Type tag of each node.  Indexed by `NodeId`.
    pub node_kind: Vec<NodeKind>,

    /// Position of each node (visualisation only).
    pub node_pos: Vec<Point>,

    /// Human-readable name of each node.
    pub node_label: Vec<String>,

    // ── CSR edge adjacency ────────────────────────────────────────────────
    /// CSR row pointer.  Length = `node_count + 1`.
    pub node_out_start: Vec<u32>,

    /// Source node of each directed edge.  Required for route reconstruction.
    pub edge_from: Vec<NodeId>,

    /// Destination node of each directed edge.
    pub edge_to: Vec<NodeId>,

    /// Travel time of each directed edge, in ticks.
    pub edge_weight: Vec<u32>,

    by_label: HashMap<String, NodeId>,
}

impl RoadNetwork {
    /// Construct an empty network with no nodes or edges.
    pub fn empty() -> Self {
        RoadNetworkBuilder::new().build()
    }

    // ── Graph dimensions ──────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.node_kind.len()
    }

    /// Number of **directed** edges (twice the number of roads).
    pub fn edge_count(&self) -> usize {
        self.edge_to.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_kind.is_empty()
    }

    #[inline]
    pub fn contains(&self, node: NodeId) -> bool {
        node.index() < self.node_count()
    }

    // ── Node attributes ───────────────────────────────────────────────────

    /// Type tag of `node`, or `None` if it is not in the network.
    #[inline]
    pub fn kind(&self, node: NodeId) -> Option<NodeKind> {
        self.node_kind.get(node.index()).copied()
    }

    /// Label of `node`, or `"?"` if it is not in the network.
    pub fn label(&self, node: NodeId) -> &str {
        self.node_label.get(node.index()).map_or("?", String::as_str)
    }

    pub fn node_by_label(&self, label: &str) -> Option<NodeId> {
        self.by_label.get(label).copied()
    }

    /// Like [`node_by_label`](Self::node_by_label) but returns an error.
    pub fn resolve_label(&self, label: &str) -> SpatialResult<NodeId> {
        self.node_by_label(label)
            .ok_or_else(|| SpatialError::UnknownLabel(label.to_owned()))
    }

    /// All nodes of `kind`, in ascending `NodeId` order.
    pub fn nodes_of_kind(&self, kind: NodeKind) -> impl Iterator<Item = NodeId> + '_ {
        self.node_kind
            .iter()
            .enumerate()
            .filter(move |&(_, &k)| k == kind)
            .map(|(i, _)| NodeId(i as u32))
    }

    /// Check that `node` exists and is of the `expected` kind.
    pub fn expect_kind(&self, node: NodeId, expected: NodeKind) -> SpatialResult<()> {
        match self.kind(node) {
            None => Err(SpatialError::NodeNotFound(node)),
            Some(found) if found != expected => Err(SpatialError::WrongKind { node, expected, found }),
            Some(_) => Ok(()),
        }
    }

    // ── Graph traversal ───────────────────────────────────────────────────

    /// Iterator over the indices of all outgoing edges from `node`.
    #[inline]
    pub fn out_edges(&self, node: NodeId) -> impl Iterator<Item = usize> + '_ {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        start..end
    }

    #[inline]
    pub fn out_degree(&self, node: NodeId) -> usize {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        end - start
    }

    /// Weight of the road between `a` and `b`.  With parallel roads the
    /// lightest one is returned.  `None` if the nodes are not adjacent.
    pub fn edge_weight(&self, a: NodeId, b: NodeId) -> Option<u32> {
        if !self.contains(a) {
            return None;
        }
        self.out_edges(a)
            .filter(|&e| self.edge_to[e] == b)
            .map(|e| self.edge_weight[e])
            .min()
    }

    /// Cumulative edge weight along `path`, or `None` if two consecutive
    /// nodes are not adjacent.  A single-node path costs zero.
    pub fn path_cost(&self, path: &[NodeId]) -> Option<u64> {
        path.windows(2)
            .map(|w| self.edge_weight(w[0], w[1]).map(u64::from))
            .sum()
    }
}

// ── RoadNetworkBuilder ────────────────────────────────────────────────────────

/// Construct a [`RoadNetwork`] incrementally, then call [`build`](Self::build).
///
/// # Example
///
/// ```
/// use ems_core::{NodeKind, Point};
/// use ems_spatial::RoadNetworkBuilder;
///
/// let mut b = RoadNetworkBuilder::new();
/// let station  = b.add_node(NodeKind::Station, Point::new(0.0, 0.0));
/// let hospital = b.add_node(NodeKind::Hospital, Point::new(1.0, 0.0));
/// b.add_road(station, hospital, 10);
/// let net = b.build();
/// assert_eq!(net.node_count(), 2);
/// assert_eq!(net.edge_count(), 2); // one road, both directions
/// assert_eq!(net.label(station), "A0");
/// ```
pub struct RoadNetworkBuilder {
    kinds:     Vec<NodeKind>,
    positions: Vec<Point>,
    labels:    Vec<String>,
    by_label:  HashMap<String, NodeId>,
    raw_edges: Vec<RawEdge>,
}

struct RawEdge {
    from:   NodeId,
    to:     NodeId,
    weight: u32,
}

impl RoadNetworkBuilder {
    pub fn new() -> Self {
        Self {
            kinds:     Vec::new(),
            positions: Vec::new(),
            labels:    Vec::new(),
            by_label:  HashMap::new(),
            raw_edges: Vec::new(),
        }
    }

    /// Pre-allocate for the expected number of nodes and roads.
    pub fn with_capacity(nodes: usize, roads: usize) -> Self {
        Self {
            kinds:     Vec::with_capacity(nodes),
            positions: Vec::with_capacity(nodes),
            labels:    Vec::with_capacity(nodes),
            by_label:  HashMap::with_capacity(nodes),
            raw_edges: Vec::with_capacity(roads * 2),
        }
    }

    /// Add a node with a synthetic label (`<prefix><id>`) and return its
    /// `NodeId` (sequential from 0).
    pub fn add_node(&mut self, kind: NodeKind, pos: Point) -> NodeId {
        let id = NodeId(self.kinds.len() as u32);
        let mut label = format!("{}{}", kind.prefix(), id.0);
        // A labelled node may already own the synthetic name.
        while self.by_label.contains_key(&label) {
            label.push('\'');
        }
        self.push_node(id, label, kind, pos);
        id
    }

    /// Add a node under an explicit label.
    pub fn add_labeled_node(
        &mut self,
        label: impl Into<String>,
        kind:  NodeKind,
        pos:   Point,
    ) -> SpatialResult<NodeId> {
        let label = label.into();
        if self.by_label.contains_key(&label) {
            return Err(SpatialError::DuplicateLabel(label));
        }
        let id = NodeId(self.kinds.len() as u32);
        self.push_node(id, label, kind, pos);
        Ok(id)
    }

    fn push_node(&mut self, id: NodeId, label: String, kind: NodeKind, pos: Point) {
        self.by_label.insert(label.clone(), id);
        self.kinds.push(kind);
        self.positions.push(pos);
        self.labels.push(label);
    }

    /// Look up a node added earlier by label (used by the graph loader).
    pub fn node_by_label(&self, label: &str) -> Option<NodeId> {
        self.by_label.get(label).copied()
    }

    /// Add an undirected road of travel time `weight` ticks.
    ///
    /// # Panics
    /// Panics if either endpoint has not been added.
    pub fn add_road(&mut self, a: NodeId, b: NodeId, weight: u32) {
        assert!(
            a.index() < self.kinds.len() && b.index() < self.kinds.len(),
            "add_road: endpoint not in builder ({a}, {b})"
        );
        self.raw_edges.push(RawEdge { from: a, to: b, weight });
        self.raw_edges.push(RawEdge { from: b, to: a, weight });
    }

    pub fn node_count(&self) -> usize { self.kinds.len() }
    pub fn edge_count(&self) -> usize { self.raw_edges.len() }

    /// Consume the builder and produce a [`RoadNetwork`].
    ///
    /// Edges are sorted by `(from, to)`, so iteration order (and therefore
    /// the router's tie-breaking) depends only on the graph's content.
    pub fn build(self) -> RoadNetwork {
        let node_count = self.kinds.len();
        let edge_count = self.raw_edges.len();

        let mut raw = self.raw_edges;
        raw.sort_by_key(|e| (e.from, e.to));

        let edge_from:   Vec<NodeId> = raw.iter().map(|e| e.from).collect();
        let edge_to:     Vec<NodeId> = raw.iter().map(|e| e.to).collect();
        let edge_weight: Vec<u32>    = raw.iter().map(|e| e.weight).collect();

        // Build CSR row pointer (node_out_start).
        let mut node_out_start = vec![0u32; node_count + 1];
        for e in &raw {
            node_out_start[e.from.index() + 1] += 1;
        }
        for i in 1..=node_count {
            node_out_start[i] += node_out_start[i - 1];
        }
        debug_assert_eq!(node_out_start[node_count] as usize, edge_count);

        RoadNetwork {
            node_kind:  self.kinds,
            node_pos:   self.positions,
            node_label: self.labels,
            node_out_start,
            edge_from,
            edge_to,
            edge_weight,
            by_label:   self.by_label,
        }
    }
}

impl Default for RoadNetworkBuilder {
    fn default() -> Self {
        Self::new()
    }
}
