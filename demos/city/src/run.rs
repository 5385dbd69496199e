//! JSON run file.
//!
//! ```json
//! {
//!   "graph":          "data/city.txt",
//!   "hospitals":      "data/lookup.csv",
//!   "calls":          "data/calls.csv",
//!   "fleet":          [{ "ambulance": 0, "station": "A1" }],
//!   "output_dir":     "output/city",
//!   "station_table":  "data/stations.csv",
//!   "config":         { "tick_duration_secs": 60, "max_attempts": 20 }
//! }
//! ```
//!
//! Only `graph` and `fleet` are required.  Without `hospitals` every site
//! uses its nearest hospital; without `calls`, `generate` (or its default)
//! draws synthetic calls.  `station_table` is loaded if the file exists and
//! written after the build otherwise.

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use ems_core::SimConfig;

#[derive(Debug, Deserialize)]
pub struct FleetEntry {
    pub ambulance: u32,
    /// Station label, e.g. `"A1"`.
    pub station:   String,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Generate {
    pub count:   usize,
    /// Calls are drawn uniformly in `0..horizon`.
    pub horizon: u64,
}

impl Default for Generate {
    fn default() -> Self {
        Self { count: 40, horizon: 240 }
    }
}

#[derive(Debug, Deserialize)]
pub struct RunFile {
    pub graph:         PathBuf,
    pub fleet:         Vec<FleetEntry>,
    #[serde(default)]
    pub hospitals:     Option<PathBuf>,
    #[serde(default)]
    pub calls:         Option<PathBuf>,
    #[serde(default)]
    pub generate:      Generate,
    #[serde(default = "default_output_dir")]
    pub output_dir:    PathBuf,
    #[serde(default)]
    pub station_table: Option<PathBuf>,
    #[serde(default)]
    pub config:        SimConfig,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output/city")
}

impl RunFile {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("opening run file {}", path.display()))?;
        serde_json::from_reader(file).with_context(|| format!("parsing run file {}", path.display()))
    }
}
