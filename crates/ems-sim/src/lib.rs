//! `ems-sim`: tick loop orchestrator for the ems dispatch simulator.
//!
//! # Tick loop
//!
//! ```text
//! while !finished:
//!   ① Inject   calls with call_tick == now; hospital from HospitalLookup;
//!               DispatchEngine::dispatch (assign now or queue).
//!   ② Advance  Fleet::advance_positions(now), one hop per moving
//!               ambulance, releases at the hospital, arrivals at stations.
//!   ③ Drain    retry queued calls oldest first while an ambulance is free.
//!   ④ Report   completions / abandoned calls / TickSummary → observer.
//!   tick += 1
//! ```
//!
//! `finished` = past `last call tick + grace_ticks`, or (with
//! `stop_when_idle`) every call injected, nothing queued, and every
//! ambulance back at a station.
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                 |
//! |------------|--------------------------------------------------------|
//! | `parallel` | Routes candidate ambulances on Rayon's thread pool.    |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use ems_core::{AmbulanceId, SimConfig};
//! use ems_sim::{NoopObserver, SimBuilder};
//! use ems_spatial::DijkstraRouter;
//!
//! let mut sim = SimBuilder::new(SimConfig::default(), network, DijkstraRouter)
//!     .ambulances([(AmbulanceId(0), station)])
//!     .calls(calls)
//!     .build()?;
//! sim.run(&mut NoopObserver)?;
//! ```

pub mod builder;
pub mod error;
pub mod observer;
pub mod sim;

#[cfg(test)]
mod tests;

pub use builder::SimBuilder;
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, SimObserver, TickSummary};
pub use sim::Sim;
