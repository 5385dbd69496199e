//! Simulation time model.
//!
//! # Design
//!
//! Time is a monotonically increasing integer `Tick`.  Edge weights in the
//! road network are expressed in the same unit, so an ambulance's
//! availability tick is exact integer arithmetic: `assigned + route cost`.
//!
//! `SimClock` optionally maps ticks onto elapsed simulated seconds for
//! human-readable logging; nothing in the dispatch logic depends on it.

use std::fmt;

// ── Tick ─────────────────────────────────────────────────────────────────────

/// An absolute simulation tick counter.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    /// Return the tick `n` steps after `self`.
    #[inline]
    pub fn offset(self, n: u64) -> Tick {
        Tick(self.0 + n)
    }

    /// Ticks elapsed from `earlier` to `self`, saturating at zero.
    #[inline]
    pub fn since(self, earlier: Tick) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl std::ops::Add<u64> for Tick {
    type Output = Tick;
    #[inline]
    fn add(self, rhs: u64) -> Tick {
        Tick(self.0 + rhs)
    }
}

impl std::ops::Sub for Tick {
    type Output = u64;
    #[inline]
    fn sub(self, rhs: Tick) -> u64 {
        self.0 - rhs.0
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// The simulation's single state variable: the current tick.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimClock {
    /// How many simulated seconds one tick represents (display only).
    pub tick_duration_secs: u32,
    /// The current tick: advanced by `SimClock::advance()` each iteration.
    pub current_tick: Tick,
}

impl SimClock {
    pub fn new(tick_duration_secs: u32) -> Self {
        Self {
            tick_duration_secs,
            current_tick: Tick::ZERO,
        }
    }

    /// Advance the clock by one tick.
    #[inline]
    pub fn advance(&mut self) {
        self.current_tick = Tick(self.current_tick.0 + 1);
    }

    /// Elapsed simulated seconds since tick 0.
    #[inline]
    pub fn elapsed_secs(&self) -> u64 {
        self.current_tick.0 * self.tick_duration_secs as u64
    }

    /// Break elapsed time into (day, hour, minute) components from sim start.
    pub fn elapsed_dhm(&self) -> (u64, u32, u32) {
        let total_secs = self.elapsed_secs();
        let days = total_secs / 86_400;
        let hours = ((total_secs % 86_400) / 3_600) as u32;
        let minutes = ((total_secs % 3_600) / 60) as u32;
        (days, hours, minutes)
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (d, h, m) = self.elapsed_dhm();
        write!(f, "{} (day {} {:02}:{:02})", self.current_tick, d, h, m)
    }
}

// ── SimConfig ─────────────────────────────────────────────────────────────────

/// Top-level simulation configuration.
///
/// Typically loaded from a JSON run file by the application crate and passed
/// to the simulation builder.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimConfig {
    /// Simulated seconds per tick (logging only).  Default: 60.
    pub tick_duration_secs: u32,

    /// Ticks to keep running after the last call's tick.  Acts as a hard
    /// safety cap: the run never goes past `last_call_tick + grace_ticks`.
    pub grace_ticks: u64,

    /// Stop as soon as every call has been injected, the admission queue is
    /// empty and every ambulance is back at a station.
    pub stop_when_idle: bool,

    /// Advisory search radius for candidate ambulances, in ticks of travel.
    /// `None` means unbounded.
    pub search_radius: Option<u64>,

    /// Abandon a queued call after this many failed dispatch attempts.
    /// `None` keeps unservable calls queued for the whole run.
    pub max_attempts: Option<u32>,

    /// Seed for synthetic scenario generation.
    pub seed: u64,
}

impl SimConfig {
    /// The last tick the simulation may process, given the latest call tick.
    #[inline]
    pub fn horizon(&self, last_call: Tick) -> Tick {
        last_call + self.grace_ticks
    }

    /// Construct a `SimClock` pre-configured for this run.
    pub fn make_clock(&self) -> SimClock {
        SimClock::new(self.tick_duration_secs)
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_duration_secs: 60,
            grace_ticks:        1_000,
            stop_when_idle:     true,
            search_radius:      None,
            max_attempts:       None,
            seed:               42,
        }
    }
}
