//! The `Sim` struct and its tick loop.

use ems_core::{SimClock, SimConfig, Tick};
use ems_dispatch::{DispatchEngine, DispatchOutcome};
use ems_plan::{CallSchedule, HospitalLookup};
use ems_spatial::{RoadNetwork, Router};

use crate::{SimError, SimObserver, SimResult, TickSummary};

/// The main simulation runner.
///
/// `Sim<R>` holds all run state and drives the per-tick loop:
///
/// 1. **Inject**: every call whose `call_tick` is now is dispatched
///    immediately (or queued) with the hospital from the lookup.
/// 2. **Advance**: ambulances take their next hop; those reaching their
///    hospital are released and start back to a station.
/// 3. **Drain**: queued calls are retried, oldest first, while an ambulance
///    is free.
/// 4. **Report**: completions, abandoned calls, and the tick summary go to
///    the observer.
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Sim<R: Router> {
    pub config: SimConfig,

    /// Simulation clock: tracks the current tick and maps to wall time.
    pub clock: SimClock,

    /// Road network.  Immutable for the run.
    pub network: RoadNetwork,

    /// Fleet, admission queue, and station table.
    pub engine: DispatchEngine<R>,

    /// Calls not yet injected (`BTreeMap<Tick, Vec<PatientCall>>`).
    pub schedule: CallSchedule,

    pub hospitals: HospitalLookup,

    /// Last tick the run may process (`last call tick + grace_ticks`).
    pub horizon: Tick,
}

impl<R: Router> Sim<R> {
    // ── Public API ────────────────────────────────────────────────────────

    /// Run until [`is_finished`][Self::is_finished].
    ///
    /// Always terminates: the horizon caps the run even if calls can never
    /// be served.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        while !self.is_finished() {
            self.step(observer)?;
        }
        let final_tick = self.clock.current_tick;
        tracing::info!(
            %final_tick,
            still_queued = self.engine.queue.len(),
            clock = %self.clock,
            "simulation finished"
        );
        observer.on_sim_end(final_tick);
        Ok(())
    }

    /// Run exactly `n` ticks from the current position (ignores the stop
    /// rule and the horizon).
    ///
    /// Useful for tests and incremental stepping.
    pub fn run_ticks<O: SimObserver>(&mut self, n: u64, observer: &mut O) -> SimResult<()> {
        for _ in 0..n {
            self.step(observer)?;
        }
        Ok(())
    }

    /// Process the current tick and advance the clock by one.
    pub fn step<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<TickSummary> {
        let now = self.clock.current_tick;
        observer.on_tick_start(now);
        let summary = self.process_tick(now, observer)?;
        observer.on_tick_end(&summary);
        self.clock.advance();
        Ok(summary)
    }

    /// `true` once the clock is past the horizon, or (with
    /// `stop_when_idle`) every call is injected, nothing is queued, and
    /// every ambulance is back at a station.
    pub fn is_finished(&self) -> bool {
        let now = self.clock.current_tick;
        now > self.horizon
            || (self.config.stop_when_idle && self.schedule.is_empty() && self.engine.is_idle())
    }

    // ── Core tick processing ──────────────────────────────────────────────

    fn process_tick<O: SimObserver>(&mut self, now: Tick, observer: &mut O) -> SimResult<TickSummary> {
        let mut summary = TickSummary { tick: now, ..TickSummary::default() };

        // ── Phase 1: inject calls going live this tick ────────────────────
        for call in self.schedule.drain_tick(now).unwrap_or_default() {
            let hospital = self
                .hospitals
                .get(call.site)
                .ok_or(SimError::MissingHospital { patient: call.patient, site: call.site })?;
            let outcome = self.engine.dispatch(&self.network, call.clone(), hospital, now)?;
            if matches!(outcome, DispatchOutcome::Assigned { .. }) {
                summary.assigned += 1;
            }
            summary.calls += 1;
            observer.on_call(now, &call, &outcome);
        }

        // ── Phase 2: advance ambulances ───────────────────────────────────
        //
        // Already done by the first dispatch this tick, if any; repeating it
        // is a no-op.
        self.engine.advance(now);

        // ── Phase 3: drain the admission queue ────────────────────────────
        summary.assigned += self.engine.drain(&self.network, now);

        // ── Phase 4: report ───────────────────────────────────────────────
        for record in self.engine.take_completions() {
            tracing::info!(ambulance = %record.ambulance, "{record}");
            summary.completed += 1;
            observer.on_completion(&record);
        }
        for abandoned in self.engine.take_abandoned() {
            observer.on_abandoned(&abandoned);
        }

        let fleet = &self.engine.fleet;
        summary.queued    = self.engine.queue.len();
        summary.committed = fleet.committed_count();
        summary.returning = fleet.returning_count();
        summary.idle      = fleet.idle_count();
        Ok(summary)
    }
}
