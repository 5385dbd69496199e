//! Emergency site → hospital lookup.
//!
//! Each call is taken to the hospital assigned to its emergency site.  The
//! mapping is static run input: either loaded from CSV or derived once as
//! the nearest hospital by road cost.

use std::collections::BTreeMap;

use ems_core::{NodeId, NodeKind};
use ems_spatial::{RoadNetwork, Router};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HospitalLookup {
    by_site: BTreeMap<NodeId, NodeId>,
}

impl HospitalLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign `site` to `hospital`, replacing any previous assignment.
    pub fn insert(&mut self, site: NodeId, hospital: NodeId) {
        self.by_site.insert(site, hospital);
    }

    pub fn get(&self, site: NodeId) -> Option<NodeId> {
        self.by_site.get(&site).copied()
    }

    /// `(site, hospital)` pairs in ascending site order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.by_site.iter().map(|(&s, &h)| (s, h))
    }

    pub fn len(&self) -> usize {
        self.by_site.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_site.is_empty()
    }

    /// Assign every emergency site to its nearest reachable hospital (ties:
    /// lower `NodeId`).  Sites that reach no hospital are left out.
    pub fn nearest_by_cost<R: Router>(network: &RoadNetwork, router: &R) -> Self {
        let hospitals: Vec<NodeId> = network.nodes_of_kind(NodeKind::Hospital).collect();
        let mut lookup = Self::new();
        for site in network.nodes_of_kind(NodeKind::EmergencySite) {
            let nearest = hospitals
                .iter()
                .filter_map(|&h| router.cost(network, site, h).ok().map(|c| (c, h)))
                .min();
            match nearest {
                Some((_, hospital)) => lookup.insert(site, hospital),
                None => tracing::warn!(site = network.label(site), "no hospital reachable from site"),
            }
        }
        lookup
    }
}

impl FromIterator<(NodeId, NodeId)> for HospitalLookup {
    fn from_iter<I: IntoIterator<Item = (NodeId, NodeId)>>(iter: I) -> Self {
        Self { by_site: iter.into_iter().collect() }
    }
}
