//! `ems-core`: foundational types for the ems dispatch simulator.
//!
//! This crate is a dependency of every other `ems-*` crate.  It has no
//! `ems-*` dependencies and a single required external one (`rand`),
//! plus optional `serde`.
//!
//! # What lives here
//!
//! | Module     | Contents                                                   |
//! |------------|------------------------------------------------------------|
//! | [`ids`]    | `NodeId`, `AmbulanceId`, `PatientId`                       |
//! | [`kind`]   | `NodeKind` (emergency site / hospital / station)           |
//! | [`geo`]    | `Point`: planar node coordinates                          |
//! | [`time`]   | `Tick`, `SimClock`, `SimConfig`                            |
//! | [`rng`]    | `SimRng` (seeded, for synthetic scenarios)                 |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod geo;
pub mod ids;
pub mod kind;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use geo::Point;
pub use ids::{AmbulanceId, NodeId, PatientId};
pub use kind::NodeKind;
pub use rng::SimRng;
pub use time::{SimClock, SimConfig, Tick};
