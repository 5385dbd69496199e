//! Built-in city road network used when no run file is given.
//!
//! Two stations, two hospitals, six emergency sites on a ring road with one
//! crosstown link.  Weights are minutes of driving (1 tick = 1 minute).

use ems_core::{NodeKind, Point};
use ems_spatial::{RoadNetwork, RoadNetworkBuilder, SpatialResult};

/// Build the built-in city network.
///
/// Labels follow the graph-file convention (`A1`, `H1`, `E1`, …) so the
/// station table can be saved and reloaded against a file-based network.
pub fn build_network() -> SpatialResult<RoadNetwork> {
    let mut b = RoadNetworkBuilder::with_capacity(10, 12);

    let a1 = b.add_labeled_node("A1", NodeKind::Station,       Point::new(0.0, 0.0))?;
    let a2 = b.add_labeled_node("A2", NodeKind::Station,       Point::new(8.0, 6.0))?;
    let h1 = b.add_labeled_node("H1", NodeKind::Hospital,      Point::new(4.0, 1.0))?;
    let h2 = b.add_labeled_node("H2", NodeKind::Hospital,      Point::new(6.0, 8.0))?;
    let e1 = b.add_labeled_node("E1", NodeKind::EmergencySite, Point::new(2.0, 0.0))?;
    let e2 = b.add_labeled_node("E2", NodeKind::EmergencySite, Point::new(6.0, 0.0))?;
    let e3 = b.add_labeled_node("E3", NodeKind::EmergencySite, Point::new(8.0, 3.0))?;
    let e4 = b.add_labeled_node("E4", NodeKind::EmergencySite, Point::new(3.0, 8.0))?;
    let e5 = b.add_labeled_node("E5", NodeKind::EmergencySite, Point::new(0.0, 5.0))?;
    let e6 = b.add_labeled_node("E6", NodeKind::EmergencySite, Point::new(4.0, 4.0))?;

    // Ring road.
    b.add_road(a1, e1, 4);
    b.add_road(e1, h1, 3);
    b.add_road(h1, e2, 3);
    b.add_road(e2, e3, 6);
    b.add_road(e3, a2, 5);
    b.add_road(a2, h2, 4);
    b.add_road(h2, e4, 5);
    b.add_road(e4, e5, 6);
    b.add_road(e5, a1, 7);

    // Crosstown.
    b.add_road(h1, e6, 5);
    b.add_road(e6, h2, 6);
    b.add_road(e5, e6, 6);

    Ok(b.build())
}
