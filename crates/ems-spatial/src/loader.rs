//! Legacy graph text loader.
//!
//! # File format
//!
//! ```text
//! 4                 ← node count n
//! A 1 0.0 0.0       ← n lines: <type letter> <number> <x> <y>
//! H 1 10.0 0.0
//! E 1 5.0 2.0
//! E 2 6.0 -1.0
//! A1 H1 10          ← remaining lines: <label> <label> <weight>
//! E1 H1 5
//! A1 E1 5.0
//! ```
//!
//! The node's label is the type letter followed by its number (`A1`, `H1`,
//! `E1`).  Type letters: `E` emergency site, `H` hospital, `A` ambulance
//! station.  Every edge line adds one undirected road.
//!
//! Weights may be fractional in the file; they are rounded **up** to whole
//! ticks so that no ambulance arrives before the weight in the file says it
//! can.  Blank lines are ignored.

use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use ems_core::{NodeId, NodeKind, Point};

use crate::network::{RoadNetwork, RoadNetworkBuilder};
use crate::{SpatialError, SpatialResult};

/// Upper bound on what the header alone can make the loader pre-allocate.
const MAX_PREALLOC_NODES: usize = 1 << 20;

/// Load a [`RoadNetwork`] from a legacy graph text file.
pub fn load_graph_text(path: &Path) -> SpatialResult<RoadNetwork> {
    let file = std::fs::File::open(path)?;
    load_graph_reader(file)
}

/// Like [`load_graph_text`] but accepts any `Read` source.
pub fn load_graph_reader<R: Read>(reader: R) -> SpatialResult<RoadNetwork> {
    let mut lines = BufReader::new(reader)
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l))
        .filter(|(_, l)| l.as_ref().map_or(true, |s| !s.trim().is_empty()));

    // ── Header ────────────────────────────────────────────────────────────
    let (line_no, header) = lines
        .next()
        .ok_or(SpatialError::Parse { line: 1, msg: "empty graph file".into() })?;
    let node_count: usize = header?
        .trim()
        .parse()
        .map_err(|_| parse_err(line_no, "first line must be the node count"))?;

    if node_count >= NodeId::INVALID.index() {
        return Err(parse_err(line_no, format!("node count {node_count} too large")));
    }
    // The header is untrusted; the node loop fails on a short file.
    let reserve = node_count.min(MAX_PREALLOC_NODES);
    let mut builder = RoadNetworkBuilder::with_capacity(reserve, reserve * 2);

    // ── Node lines ────────────────────────────────────────────────────────
    for _ in 0..node_count {
        let (line_no, line) = lines
            .next()
            .ok_or_else(|| parse_err(line_no, format!("expected {node_count} node lines")))?;
        let line = line?;
        let fields: Vec<&str> = line.split_whitespace().collect();
        let [kind, number, x, y] = fields[..] else {
            return Err(parse_err(line_no, "node line must be `<type> <number> <x> <y>`"));
        };

        let mut letters = kind.chars();
        let kind = match (letters.next().and_then(NodeKind::from_prefix), letters.next()) {
            (Some(k), None) => k,
            _ => return Err(parse_err(line_no, format!("unknown node type {kind:?}"))),
        };
        let x: f32 = x.parse().map_err(|_| parse_err(line_no, format!("bad x coordinate {x:?}")))?;
        let y: f32 = y.parse().map_err(|_| parse_err(line_no, format!("bad y coordinate {y:?}")))?;

        builder
            .add_labeled_node(format!("{}{number}", kind.prefix()), kind, Point::new(x, y))
            .map_err(|e| parse_err(line_no, e.to_string()))?;
    }

    // ── Edge lines ────────────────────────────────────────────────────────
    for (line_no, line) in lines {
        let line = line?;
        let fields: Vec<&str> = line.split_whitespace().collect();
        let [a, b, weight] = fields[..] else {
            return Err(parse_err(line_no, "edge line must be `<label> <label> <weight>`"));
        };
        let a = builder
            .node_by_label(a)
            .ok_or_else(|| parse_err(line_no, format!("edge references unknown node {a:?}")))?;
        let b = builder
            .node_by_label(b)
            .ok_or_else(|| parse_err(line_no, format!("edge references unknown node {b:?}")))?;
        builder.add_road(a, b, parse_weight(line_no, weight)?);
    }

    let network = builder.build();
    tracing::debug!(
        nodes = network.node_count(),
        roads = network.edge_count() / 2,
        "loaded road network"
    );
    Ok(network)
}

/// Parse an edge weight and round it up to whole ticks.
fn parse_weight(line: usize, s: &str) -> SpatialResult<u32> {
    let w: f64 = s
        .parse()
        .map_err(|_| parse_err(line, format!("bad edge weight {s:?}")))?;
    if !w.is_finite() || w < 0.0 || w > f64::from(u32::MAX) {
        return Err(parse_err(line, format!("edge weight {s} out of range")));
    }
    Ok(w.ceil() as u32)
}

fn parse_err(line: usize, msg: impl Into<String>) -> SpatialError {
    SpatialError::Parse { line, msg: msg.into() }
}
