//! `ems-fleet`: ambulance status, candidate search, and route walking.
//!
//! # Crate layout
//!
//! | Module     | Contents                                                        |
//! |------------|-----------------------------------------------------------------|
//! | [`state`]  | `Ambulance`, `AmbulanceStatus`, `Mission`, `ReturnLeg`, `RouteCursor` |
//! | [`fleet`]  | `Fleet`: `BTreeMap<AmbulanceId, Ambulance>`, `Candidate`       |
//! | [`record`] | `ResultRecord` (completion log line), `FleetEvent`              |
//! | [`error`]  | `FleetError`, `FleetResult<T>`                                  |
//!
//! # Movement model (hop per tick)
//!
//! 1. `Fleet::commit` stores one [`Route`][ems_spatial::Route] (current node
//!    → site → hospital) and sets `available_at = now + route.total_cost`.
//! 2. `Fleet::advance_positions(now)` steps the ambulance one node along that
//!    route once the next hop's cost has elapsed since the last step.  At
//!    most one hop is taken per tick, so a route with zero-cost hops is
//!    walked more slowly than its cost suggests; release timing is unaffected
//!    because it reads `available_at`.
//! 3. At `available_at` the ambulance is released at the hospital, a
//!    [`ResultRecord`] is emitted, and it starts back along the hospital's
//!    station route (from `ems_plan::StationTable`).
//! 4. A returning ambulance can be re-dispatched from whatever node it has
//!    reached; otherwise it becomes idle when it reaches the station.
//!
//! # Feature flags
//!
//! | Flag       | Effect                                                      |
//! |------------|-------------------------------------------------------------|
//! | `parallel` | `find_candidates` routes ambulances on the Rayon pool.      |

pub mod error;
pub mod fleet;
pub mod record;
pub mod state;

#[cfg(test)]
mod tests;

pub use error::{FleetError, FleetResult};
pub use fleet::{Candidate, Fleet};
pub use record::{FleetEvent, ResultRecord};
pub use state::{Ambulance, AmbulanceStatus, Mission, ReturnLeg, RouteCursor};
