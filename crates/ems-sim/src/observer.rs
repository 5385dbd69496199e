//! Simulation observer trait for progress reporting and data collection.

use ems_core::Tick;
use ems_dispatch::{Abandoned, DispatchOutcome};
use ems_fleet::ResultRecord;
use ems_plan::PatientCall;

/// Counts for one processed tick, passed to [`SimObserver::on_tick_end`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickSummary {
    pub tick: Tick,

    /// Calls that went live this tick.
    pub calls: usize,

    /// Calls assigned this tick, on arrival or from the queue.
    pub assigned: usize,

    /// Patients delivered to a hospital this tick.
    pub completed: usize,

    /// Admission queue length at the end of the tick.
    pub queued: usize,

    pub committed: usize,
    pub returning: usize,
    pub idle:      usize,
}

/// Callbacks invoked by [`Sim::run`][crate::Sim::run] at key points in the
/// tick loop.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// # Example: completion printer
///
/// ```rust,ignore
/// struct Printer;
///
/// impl SimObserver for Printer {
///     fn on_completion(&mut self, record: &ResultRecord) {
///         println!("{record}");
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called at the very start of each tick, before any processing.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called once per call injected this tick, after its dispatch attempt.
    fn on_call(&mut self, _tick: Tick, _call: &PatientCall, _outcome: &DispatchOutcome) {}

    /// Called for every patient delivered to a hospital, in release order.
    fn on_completion(&mut self, _record: &ResultRecord) {}

    /// Called for every queued call dropped after `max_attempts` failures.
    fn on_abandoned(&mut self, _abandoned: &Abandoned) {}

    /// Called at the end of each tick.
    fn on_tick_end(&mut self, _summary: &TickSummary) {}

    /// Called once after the final tick completes.
    fn on_sim_end(&mut self, _final_tick: Tick) {}
}

/// A [`SimObserver`] that does nothing.  Use when you need to call `run` but
/// don't want progress callbacks.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
