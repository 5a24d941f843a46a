//! Time sources for the dashboard
//!
//! Captions are computed against a coarse clock: the current time is sampled
//! once per refresh interval instead of on every redraw, so a list of
//! countdowns does not re-layout every frame.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Default sampling interval for the dashboard clock
pub const DEFAULT_REFRESH: Duration = Duration::from_secs(30);

/// Something that knows the current Unix time in seconds
pub trait Clock: Send {
    fn now(&self) -> i64;
}

impl<C: Clock + ?Sized> Clock for Box<C> {
    fn now(&self) -> i64 {
        (**self).now()
    }
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0)
    }
}

/// A clock frozen at a given instant (used by `--now` and in tests)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now(&self) -> i64 {
        self.0
    }
}

/// Samples another clock at most once per refresh interval
pub struct CoarseClock<C: Clock = SystemClock> {
    source: C,
    interval_secs: i64,
    sampled: i64,
}

impl<C: Clock> CoarseClock<C> {
    pub fn new(source: C, interval: Duration) -> Self {
        let sampled = source.now();
        Self {
            source,
            // A zero interval would resample on every tick
            interval_secs: (interval.as_secs() as i64).max(1),
            sampled,
        }
    }

    /// Last sampled time
    pub fn now(&self) -> i64 {
        self.sampled
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs as u64)
    }

    /// Resample the source if the interval has elapsed.
    /// Returns true when the visible time changed.
    pub fn refresh(&mut self) -> bool {
        let current = self.source.now();
        // A source that moved backwards (e.g. after NTP adjustment) is followed immediately
        if current - self.sampled >= self.interval_secs || current < self.sampled {
            tracing::debug!(from = self.sampled, to = current, "clock resampled");
            self.sampled = current;
            return true;
        }
        false
    }

    /// Resample unconditionally
    pub fn force_refresh(&mut self) {
        self.sampled = self.source.now();
    }
}

impl<C: Clock> Clock for CoarseClock<C> {
    fn now(&self) -> i64 {
        self.sampled
    }
}
