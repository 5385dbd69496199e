//! Patient calls and the per-tick call schedule.
//!
//! The full call set for a run is known up front, but each call only becomes
//! live at its `call_tick`.  `CallSchedule` buckets calls by tick so the
//! clock loop only touches the calls for the current tick: O(calls this
//! tick) instead of a scan over every call each tick.

use std::collections::BTreeMap;

use ems_core::{NodeId, PatientId, Tick};

/// One emergency call.  Immutable once issued.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PatientCall {
    pub patient: PatientId,
    /// Emergency-site node the call comes from.
    pub site: NodeId,
    /// Patient category.  Carried through to the queue and logs; it does not
    /// affect ordering or selection.
    pub category: u8,
    /// Tick at which the call becomes live.
    pub call_tick: Tick,
}

/// Calls bucketed by the tick at which they go live.
#[derive(Default)]
pub struct CallSchedule {
    inner: BTreeMap<Tick, Vec<PatientCall>>,
    /// Cached total call count for O(1) `len()`.
    total: usize,
}

impl CallSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bucket every call by its `call_tick`.  Calls sharing a tick keep
    /// their input order.
    pub fn build_from_calls(calls: impl IntoIterator<Item = PatientCall>) -> Self {
        let mut schedule = Self::new();
        for call in calls {
            schedule.push(call);
        }
        schedule
    }

    pub fn push(&mut self, call: PatientCall) {
        self.inner.entry(call.call_tick).or_default().push(call);
        self.total += 1;
    }

    /// Remove and return all calls that go live at exactly `tick`.
    ///
    /// Returns `None` if there are none (the common case).
    pub fn drain_tick(&mut self, tick: Tick) -> Option<Vec<PatientCall>> {
        let calls = self.inner.remove(&tick)?;
        self.total -= calls.len();
        Some(calls)
    }

    /// The earliest tick with at least one pending call.
    pub fn next_tick(&self) -> Option<Tick> {
        self.inner.keys().next().copied()
    }

    /// The latest tick with at least one pending call.
    pub fn last_tick(&self) -> Option<Tick> {
        self.inner.keys().next_back().copied()
    }

    /// Iterate pending calls in tick order.
    pub fn iter(&self) -> impl Iterator<Item = &PatientCall> {
        self.inner.values().flatten()
    }

    pub fn len(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}
