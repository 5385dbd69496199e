//! CSV loading (and station-table saving).
//!
//! Nodes are referenced by their network label (`E12`, `H3`, `A210`), never
//! by raw `NodeId`, so files stay valid when a graph file is re-ordered.
//!
//! # Calls
//!
//! ```csv
//! patient_id,site,category,call_tick
//! 1,E150,1,5
//! 2,E153,1,10
//! ```
//!
//! # Hospital lookup
//!
//! ```csv
//! site,hospital
//! E150,H3
//! ```
//!
//! # Station table
//!
//! `path` is the hospital→station node sequence, space separated.
//!
//! ```csv
//! hospital,station,travel_time,path
//! H3,A210,12,H3 E9 A210
//! ```

use std::io::{Read, Write};
use std::path::Path;

use serde::Deserialize;

use ems_core::{PatientId, Tick};
use ems_spatial::{RoadNetwork, Route};

use crate::{HospitalLookup, PatientCall, PlanError, PlanResult, StationAssignment, StationTable};

// ── CSV records ──────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct CallRecord {
    patient_id: u32,
    site:       String,
    category:   u8,
    call_tick:  u64,
}

#[derive(Deserialize)]
struct LookupRecord {
    site:     String,
    hospital: String,
}

#[derive(Deserialize)]
struct StationRecord {
    hospital:    String,
    station:     String,
    travel_time: u64,
    path:        String,
}

// ── Calls ────────────────────────────────────────────────────────────────────

/// Load the call set from a CSV file.
pub fn load_calls_csv(path: &Path, network: &RoadNetwork) -> PlanResult<Vec<PatientCall>> {
    let file = std::fs::File::open(path)?;
    load_calls_reader(file, network)
}

/// Like [`load_calls_csv`] but accepts any `Read` source.
pub fn load_calls_reader<R: Read>(reader: R, network: &RoadNetwork) -> PlanResult<Vec<PatientCall>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    csv_reader
        .deserialize::<CallRecord>()
        .map(|row| -> PlanResult<PatientCall> {
            let row = row.map_err(|e| PlanError::Parse(e.to_string()))?;
            Ok(PatientCall {
                patient:   PatientId(row.patient_id),
                site:      network.resolve_label(row.site.trim())?,
                category:  row.category,
                call_tick: Tick(row.call_tick),
            })
        })
        .collect()
}

// ── Hospital lookup ──────────────────────────────────────────────────────────

/// Load an emergency-site → hospital lookup from a CSV file.
pub fn load_hospital_lookup_csv(path: &Path, network: &RoadNetwork) -> PlanResult<HospitalLookup> {
    let file = std::fs::File::open(path)?;
    load_hospital_lookup_reader(file, network)
}

/// Like [`load_hospital_lookup_csv`] but accepts any `Read` source.
pub fn load_hospital_lookup_reader<R: Read>(
    reader:  R,
    network: &RoadNetwork,
) -> PlanResult<HospitalLookup> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    csv_reader
        .deserialize::<LookupRecord>()
        .map(|row| -> PlanResult<_> {
            let row = row.map_err(|e| PlanError::Parse(e.to_string()))?;
            Ok((
                network.resolve_label(row.site.trim())?,
                network.resolve_label(row.hospital.trim())?,
            ))
        })
        .collect()
}

// ── Station table ────────────────────────────────────────────────────────────

/// Load a previously saved station table and validate it against `network`.
pub fn load_station_table_csv(path: &Path, network: &RoadNetwork) -> PlanResult<StationTable> {
    let file = std::fs::File::open(path)?;
    load_station_table_reader(file, network)
}

/// Like [`load_station_table_csv`] but accepts any `Read` source.
pub fn load_station_table_reader<R: Read>(
    reader:  R,
    network: &RoadNetwork,
) -> PlanResult<StationTable> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let assignments = csv_reader
        .deserialize::<StationRecord>()
        .map(|row| -> PlanResult<StationAssignment> {
            let row = row.map_err(|e| PlanError::Parse(e.to_string()))?;
            let nodes = row
                .path
                .split_whitespace()
                .map(|label| network.resolve_label(label))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(StationAssignment {
                hospital:    network.resolve_label(row.hospital.trim())?,
                station:     network.resolve_label(row.station.trim())?,
                travel_time: row.travel_time,
                route:       Route::from_path(network, nodes)?,
            })
        })
        .collect::<PlanResult<Vec<_>>>()?;

    StationTable::from_assignments(network, assignments)
}

/// Save `table` as CSV for reuse by a later run.
pub fn write_station_table<W: Write>(
    writer:  W,
    table:   &StationTable,
    network: &RoadNetwork,
) -> PlanResult<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(["hospital", "station", "travel_time", "path"])?;
    for a in table.iter() {
        let path = a
            .route
            .nodes
            .iter()
            .map(|&n| network.label(n))
            .collect::<Vec<_>>()
            .join(" ");
        let travel_time = a.travel_time.to_string();
        csv_writer.write_record([
            network.label(a.hospital),
            network.label(a.station),
            travel_time.as_str(),
            path.as_str(),
        ])?;
    }
    csv_writer.flush()?;
    Ok(())
}
