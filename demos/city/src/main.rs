//! city: runnable ambulance dispatch scenario.
//!
//! ```text
//! cargo run -p city                                # built-in city, synthetic calls
//! cargo run -p city -- demos/city/data/run.json    # graph, calls, fleet from a run file
//! RUST_LOG=ems_dispatch=debug cargo run -p city
//! ```
//!
//! Writes `completions.csv`, `abandoned.csv`, and `tick_summaries.csv` to the
//! output directory and prints a short summary table.

mod network;
mod run;

use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use ems_core::{AmbulanceId, NodeId, SimConfig, SimRng, Tick};
use ems_dispatch::Abandoned;
use ems_fleet::ResultRecord;
use ems_output::{CsvWriter, OutputWriter, SimOutputObserver};
use ems_plan::{
    HospitalLookup, PatientCall, StationTable, generate_calls, load_calls_csv,
    load_hospital_lookup_csv, load_station_table_csv, write_station_table,
};
use ems_sim::{SimBuilder, SimObserver, TickSummary};
use ems_spatial::{DijkstraRouter, RoadNetwork, load_graph_text};

use run::{Generate, RunFile};

// ── Built-in scenario ─────────────────────────────────────────────────────────

const SEED:               u64 = 7;
const TICK_DURATION_SECS: u32 = 60; // 1 tick = 1 minute
const MAX_ATTEMPTS:       u32 = 120;

/// Ambulance id → station label.
const FLEET: [(u32, &str); 3] = [(0, "A1"), (1, "A1"), (2, "A2")];

// ── Scenario ──────────────────────────────────────────────────────────────────

struct Scenario {
    network:       RoadNetwork,
    fleet:         Vec<(AmbulanceId, NodeId)>,
    calls:         Vec<PatientCall>,
    lookup:        Option<HospitalLookup>,
    stations:      Option<StationTable>,
    /// Where to save the station table computed by the builder.
    save_stations: Option<PathBuf>,
    output_dir:    PathBuf,
    config:        SimConfig,
}

fn resolve_fleet<'a>(
    network: &RoadNetwork,
    entries: impl IntoIterator<Item = (u32, &'a str)>,
) -> Result<Vec<(AmbulanceId, NodeId)>> {
    entries
        .into_iter()
        .map(|(id, station)| {
            let node = network
                .resolve_label(station)
                .with_context(|| format!("ambulance {id}"))?;
            Ok((AmbulanceId(id), node))
        })
        .collect()
}

fn synthetic_calls(network: &RoadNetwork, config: &SimConfig, g: Generate) -> Vec<PatientCall> {
    let mut rng = SimRng::new(config.seed);
    generate_calls(network, &mut rng, g.count, g.horizon)
}

fn built_in() -> Result<Scenario> {
    let network = network::build_network()?;
    let config = SimConfig {
        tick_duration_secs: TICK_DURATION_SECS,
        max_attempts:       Some(MAX_ATTEMPTS),
        seed:               SEED,
        ..SimConfig::default()
    };
    let fleet = resolve_fleet(&network, FLEET)?;
    let calls = synthetic_calls(&network, &config, Generate::default());
    Ok(Scenario {
        network,
        fleet,
        calls,
        lookup: None,
        stations: None,
        save_stations: None,
        output_dir: PathBuf::from("output/city"),
        config,
    })
}

fn from_run_file(path: &Path) -> Result<Scenario> {
    let run = RunFile::load(path)?;
    let network = load_graph_text(&run.graph)
        .with_context(|| format!("loading graph {}", run.graph.display()))?;

    let fleet = resolve_fleet(
        &network,
        run.fleet.iter().map(|e| (e.ambulance, e.station.as_str())),
    )?;

    let calls = match &run.calls {
        Some(p) => load_calls_csv(p, &network)
            .with_context(|| format!("loading calls {}", p.display()))?,
        None => synthetic_calls(&network, &run.config, run.generate),
    };

    let lookup = run
        .hospitals
        .as_deref()
        .map(|p| {
            load_hospital_lookup_csv(p, &network)
                .with_context(|| format!("loading hospital lookup {}", p.display()))
        })
        .transpose()?;

    let (stations, save_stations) = match run.station_table {
        Some(p) if p.exists() => {
            let table = load_station_table_csv(&p, &network)
                .with_context(|| format!("loading station table {}", p.display()))?;
            (Some(table), None)
        }
        other => (None, other),
    };

    Ok(Scenario {
        network,
        fleet,
        calls,
        lookup,
        stations,
        save_stations,
        output_dir: run.output_dir,
        config: run.config,
    })
}

// ── Observer wrapper ──────────────────────────────────────────────────────────

/// Forwards to the output observer and keeps run totals for the summary.
struct SummaryObserver<W: OutputWriter> {
    inner:          SimOutputObserver<W>,
    completions:    u64,
    total_wait:     u64,
    total_response: u64,
    abandoned:      u64,
    peak_queue:     usize,
}

impl<W: OutputWriter> SummaryObserver<W> {
    fn new(inner: SimOutputObserver<W>) -> Self {
        Self { inner, completions: 0, total_wait: 0, total_response: 0, abandoned: 0, peak_queue: 0 }
    }

    fn mean(total: u64, n: u64) -> f64 {
        if n == 0 { 0.0 } else { total as f64 / n as f64 }
    }
}

impl<W: OutputWriter> SimObserver for SummaryObserver<W> {
    fn on_completion(&mut self, record: &ResultRecord) {
        self.completions += 1;
        self.total_wait += record.wait_ticks();
        self.total_response += record.response_ticks();
        self.inner.on_completion(record);
    }

    fn on_abandoned(&mut self, abandoned: &Abandoned) {
        self.abandoned += 1;
        self.inner.on_abandoned(abandoned);
    }

    fn on_tick_end(&mut self, summary: &TickSummary) {
        self.peak_queue = self.peak_queue.max(summary.queued);
        self.inner.on_tick_end(summary);
    }

    fn on_sim_end(&mut self, final_tick: Tick) {
        self.inner.on_sim_end(final_tick);
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // 1. Scenario.
    let scenario = match std::env::args_os().nth(1) {
        Some(path) => from_run_file(Path::new(&path))?,
        None => built_in()?,
    };
    println!("=== city: ems dispatch ===");
    println!(
        "Network: {} nodes, {} roads  |  Ambulances: {}  |  Calls: {}",
        scenario.network.node_count(),
        scenario.network.edge_count() / 2,
        scenario.fleet.len(),
        scenario.calls.len(),
    );

    // 2. Build sim.
    let config = scenario.config.clone();
    let mut builder = SimBuilder::new(config.clone(), scenario.network, DijkstraRouter)
        .ambulances(scenario.fleet)
        .calls(scenario.calls);
    if let Some(lookup) = scenario.lookup {
        builder = builder.hospital_lookup(lookup);
    }
    if let Some(table) = scenario.stations {
        builder = builder.station_table(table);
    }
    let mut sim = builder.build()?;
    println!(
        "Station table: {} hospitals assigned  |  Horizon: {}",
        sim.engine.stations.len(),
        sim.horizon
    );

    if let Some(path) = &scenario.save_stations {
        let file = File::create(path)
            .with_context(|| format!("creating station table {}", path.display()))?;
        write_station_table(file, &sim.engine.stations, &sim.network)?;
        println!("Saved station table to {}", path.display());
    }

    // 3. Output.
    std::fs::create_dir_all(&scenario.output_dir)?;
    let writer = CsvWriter::new(&scenario.output_dir)?;
    let mut obs = SummaryObserver::new(SimOutputObserver::new(writer, &config));

    // 4. Run.
    let t0 = Instant::now();
    sim.run(&mut obs)?;
    let elapsed = t0.elapsed();

    if let Some(e) = obs.inner.take_error() {
        eprintln!("output error: {e}");
    }

    // 5. Summary.
    println!();
    println!("Simulation complete in {:.3} s  ({})", elapsed.as_secs_f64(), sim.clock);
    println!("{:<24} {:>10}", "Completed", obs.completions);
    println!("{:<24} {:>10}", "Abandoned", obs.abandoned);
    println!("{:<24} {:>10}", "Still queued", sim.engine.queue.len());
    println!("{:<24} {:>10}", "Peak queue", obs.peak_queue);
    println!(
        "{:<24} {:>10.1}",
        "Mean wait (ticks)",
        SummaryObserver::<CsvWriter>::mean(obs.total_wait, obs.completions)
    );
    println!(
        "{:<24} {:>10.1}",
        "Mean response (ticks)",
        SummaryObserver::<CsvWriter>::mean(obs.total_response, obs.completions)
    );
    println!("Output: {}", scenario.output_dir.display());

    Ok(())
}
