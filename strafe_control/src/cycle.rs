//! Fixed-period tick driver.
//!
//! Every controller implements [`Periodic`]; the [`CycleRunner`] calls
//! `tick()` once per period, measures each tick, and counts overruns.
//!
//! ## Pacing
//! In realtime mode the runner sleeps until an absolute deadline
//! (`start + n · period`) so jitter does not accumulate. Without realtime
//! pacing ticks run back to back, which is what tests and offline
//! simulation want. An overrun is logged and counted; the loop keeps going.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use strafe_common::consts::{CYCLE_TIME_US_MAX, CYCLE_TIME_US_MIN};
use tracing::warn;

use crate::error::ControlError;

// ─── Periodic ───────────────────────────────────────────────────────

/// Something advanced once per control period.
///
/// `tick` must not block and cannot fail: faults are handled inside the
/// implementor.
pub trait Periodic {
    fn name(&self) -> &str;

    fn tick(&mut self);
}

// ─── Cycle Statistics ───────────────────────────────────────────────

/// O(1) per-cycle timing statistics.
///
/// Updated every cycle with no allocation.
#[derive(Debug, Clone)]
pub struct CycleStats {
    /// Total cycles executed.
    pub cycle_count: u64,
    /// Last tick duration [ns].
    pub last_cycle_ns: i64,
    /// Minimum tick duration [ns].
    pub min_cycle_ns: i64,
    /// Maximum tick duration [ns].
    pub max_cycle_ns: i64,
    /// Running sum for average computation.
    pub sum_cycle_ns: i64,
    /// Number of ticks longer than the period.
    pub overruns: u64,
    /// Maximum wake-up latency [ns] (time between deadline and actual wake).
    pub max_latency_ns: i64,
}

impl CycleStats {
    pub const fn new() -> Self {
        Self {
            cycle_count: 0,
            last_cycle_ns: 0,
            min_cycle_ns: i64::MAX,
            max_cycle_ns: 0,
            sum_cycle_ns: 0,
            overruns: 0,
            max_latency_ns: 0,
        }
    }

    /// Record a tick duration. O(1), no allocation.
    #[inline]
    pub fn record(&mut self, duration_ns: i64, latency_ns: i64) {
        self.cycle_count += 1;
        self.last_cycle_ns = duration_ns;
        if duration_ns < self.min_cycle_ns {
            self.min_cycle_ns = duration_ns;
        }
        if duration_ns > self.max_cycle_ns {
            self.max_cycle_ns = duration_ns;
        }
        self.sum_cycle_ns = self.sum_cycle_ns.saturating_add(duration_ns);
        if latency_ns > self.max_latency_ns {
            self.max_latency_ns = latency_ns;
        }
    }

    /// Average tick time [ns] (returns 0 if no cycles).
    #[inline]
    pub fn avg_cycle_ns(&self) -> i64 {
        if self.cycle_count == 0 {
            0
        } else {
            self.sum_cycle_ns / self.cycle_count as i64
        }
    }
}

impl Default for CycleStats {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Cycle Runner ───────────────────────────────────────────────────

#[derive(Debug)]
pub struct CycleRunner {
    period: Duration,
    realtime: bool,
    stats: CycleStats,
}

impl CycleRunner {
    pub fn new(cycle_time_us: u32, realtime: bool) -> Result<Self, ControlError> {
        if !(CYCLE_TIME_US_MIN..=CYCLE_TIME_US_MAX).contains(&cycle_time_us) {
            return Err(ControlError::InvalidCycleTime(cycle_time_us));
        }
        Ok(Self {
            period: Duration::from_micros(u64::from(cycle_time_us)),
            realtime,
            stats: CycleStats::new(),
        })
    }

    #[inline]
    pub fn period(&self) -> Duration {
        self.period
    }

    #[inline]
    pub fn stats(&self) -> &CycleStats {
        &self.stats
    }

    /// Tick `task` once and record its duration.
    pub fn run_once(&mut self, task: &mut dyn Periodic) -> Duration {
        self.timed_tick(task, 0)
    }

    fn timed_tick(&mut self, task: &mut dyn Periodic, latency_ns: i64) -> Duration {
        let started = Instant::now();
        task.tick();
        let elapsed = started.elapsed();
        self.stats.record(nanos(elapsed), latency_ns);
        if elapsed > self.period {
            self.stats.overruns += 1;
            warn!(
                task = task.name(),
                elapsed_us = elapsed.as_micros() as u64,
                period_us = self.period.as_micros() as u64,
                "cycle overrun"
            );
        }
        elapsed
    }

    /// Tick until `running` clears or `max_ticks` ticks have run.
    ///
    /// Returns the number of ticks executed.
    pub fn run(
        &mut self,
        task: &mut dyn Periodic,
        max_ticks: Option<u64>,
        running: &AtomicBool,
    ) -> u64 {
        let mut ticks = 0u64;
        let mut deadline = Instant::now();

        while running.load(Ordering::Relaxed) && max_ticks.is_none_or(|max| ticks < max) {
            let mut latency_ns = 0;
            if self.realtime {
                let now = Instant::now();
                if let Some(remaining) = deadline.checked_duration_since(now) {
                    std::thread::sleep(remaining);
                }
                latency_ns = nanos(Instant::now().saturating_duration_since(deadline));
            }

            self.timed_tick(task, latency_ns);
            ticks += 1;
            deadline += self.period;

            // More than a full period behind: re-anchor instead of bursting.
            if self.realtime && Instant::now().saturating_duration_since(deadline) > self.period {
                deadline = Instant::now();
            }
        }
        ticks
    }
}

#[inline]
fn nanos(d: Duration) -> i64 {
    i64::try_from(d.as_nanos()).unwrap_or(i64::MAX)
}
