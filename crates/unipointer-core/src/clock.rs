//! Uptime clocks used to stamp raw input.
//!
//! Pointer event timestamps are plain milliseconds since an arbitrary
//! origin. Every source feeding one router must share that origin, so the
//! platform adapters take the router's clock instead of reading the system
//! time themselves.

use std::sync::atomic::{AtomicU64, Ordering};
use web_time::Instant;

/// Provides timing information for input stamping and gesture sweeps.
pub trait Clock: Send + Sync {
    /// Milliseconds elapsed since the clock's origin.
    fn now_millis(&self) -> u64;
}

/// Monotonic clock anchored at the moment it was created.
///
/// Cheap to copy; copies share the same origin.
#[derive(Clone, Copy, Debug)]
pub struct UptimeClock {
    origin: Instant,
}

impl UptimeClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    pub fn origin(&self) -> Instant {
        self.origin
    }

    /// Milliseconds between the origin and `instant`, saturating at zero for
    /// instants taken before the origin.
    pub fn millis_at(&self, instant: Instant) -> u64 {
        instant
            .checked_duration_since(self.origin)
            .map(|elapsed| elapsed.as_millis() as u64)
            .unwrap_or(0)
    }
}

impl Default for UptimeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for UptimeClock {
    fn now_millis(&self) -> u64 {
        self.millis_at(Instant::now())
    }
}

/// Clock that only moves when told to. Used by tests and scripted input.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    pub fn new(start_millis: u64) -> Self {
        Self {
            now: AtomicU64::new(start_millis),
        }
    }

    pub fn set(&self, millis: u64) {
        self.now.store(millis, Ordering::Release);
    }

    pub fn advance(&self, millis: u64) -> u64 {
        self.now.fetch_add(millis, Ordering::AcqRel) + millis
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> u64 {
        self.now.load(Ordering::Acquire)
    }
}
