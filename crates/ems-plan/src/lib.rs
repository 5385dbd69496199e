//! `ems-plan`: everything a run is planned from before the clock starts.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                  |
//! |---------------|-----------------------------------------------------------|
//! | [`call`]      | `PatientCall`, `CallSchedule` (`BTreeMap<Tick, Vec<_>>`)  |
//! | [`stations`]  | `StationAssignment`, `StationTable` (hospital → station)  |
//! | [`hospitals`] | `HospitalLookup` (emergency site → hospital)              |
//! | [`loader`]    | CSV loading/saving of calls, lookups, and station tables  |
//! | [`generate`]  | Seeded synthetic call generator                           |
//! | [`error`]     | `PlanError`, `PlanResult<T>`                              |
//!
//! The station table is the only precomputation: it is built once, handed to
//! the dispatcher in-process, and never mutated.  CSV persistence exists for
//! reuse across runs.

pub mod call;
pub mod error;
pub mod generate;
pub mod hospitals;
pub mod loader;
pub mod stations;


pub use call::{CallSchedule, PatientCall};
pub use error::{PlanError, PlanResult};
pub use generate::generate_calls;
pub use hospitals::HospitalLookup;
pub use loader::{
    load_calls_csv, load_calls_reader, load_hospital_lookup_csv, load_hospital_lookup_reader,
    load_station_table_csv, load_station_table_reader, write_station_table,
};
pub use stations::{StationAssignment, StationTable};
