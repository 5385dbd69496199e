//! `ems-dispatch`: admission queue and dispatch engine.
//!
//! # Crate layout
//!
//! | Module     | Contents                                                         |
//! |------------|------------------------------------------------------------------|
//! | [`queue`]  | `PendingRequest`, `AdmissionQueue` (min-heap on `(call_tick, seq)`) |
//! | [`engine`] | `DispatchEngine<R>`, `DispatchOutcome`, `QueueReason`, `Abandoned` |
//! | [`error`]  | `DispatchError`, `DispatchResult<T>`                             |
//!
//! # Dispatching one call
//!
//! ```text
//! dispatch(call, hospital, now):
//!   ① fleet.advance_positions(now)
//!   ② no available ambulance          → queue  (NoAmbulanceAvailable)
//!   ③ find_candidates(site, radius)   → empty? queue (NoReachableAmbulance)
//!   ④ route site → hospital           → none?  queue (HospitalUnreachable)
//!   ⑤ winner = min(to_site + to_hospital, id); commit joined route
//! ```
//!
//! `drain(now)` replays ②–⑤ for queued calls, oldest first, while an
//! ambulance is free.  Each queued call is tried at most once per drain.
//!
//! # Feature flags
//!
//! | Flag       | Effect                                                      |
//! |------------|-------------------------------------------------------------|
//! | `parallel` | Forwards to `ems-fleet/parallel`.                           |

pub mod engine;
pub mod error;
pub mod queue;


pub use engine::{Abandoned, DispatchEngine, DispatchOutcome, QueueReason};
pub use error::{DispatchError, DispatchResult};
pub use queue::{AdmissionQueue, PendingRequest};
