//! Seeded synthetic call generator for scenario runs without a calls file.

use ems_core::{NodeId, NodeKind, PatientId, SimRng, Tick};
use ems_spatial::RoadNetwork;

use crate::PatientCall;

/// Generate `count` calls at uniformly random emergency sites, with call
/// ticks uniform in `0..horizon`.
///
/// Patients are numbered `1..=count` in call-tick order.  Returns an empty
/// vec if the network has no emergency sites or `horizon` is zero.
pub fn generate_calls(
    network: &RoadNetwork,
    rng:     &mut SimRng,
    count:   usize,
    horizon: u64,
) -> Vec<PatientCall> {
    let sites: Vec<NodeId> = network.nodes_of_kind(NodeKind::EmergencySite).collect();
    if sites.is_empty() || horizon == 0 {
        return vec![];
    }

    let mut site_rng = rng.child(1);
    let mut time_rng = rng.child(2);

    let mut draws: Vec<(Tick, NodeId)> = (0..count)
        .filter_map(|_| {
            let site = *site_rng.choose(&sites)?;
            Some((Tick(time_rng.gen_range(0..horizon)), site))
        })
        .collect();
    draws.sort_by_key(|&(tick, _)| tick);

    draws
        .into_iter()
        .enumerate()
        .map(|(i, (call_tick, site))| PatientCall {
            patient:  PatientId(i as u32 + 1),
            site,
            category: 1,
            call_tick,
        })
        .collect()
}
