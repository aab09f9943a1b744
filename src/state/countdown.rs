//! Phase countdown: a `{days, hours, minutes}` value that ticks down.
//!
//! The value decrements one minute per tick with borrow propagation
//! (minutes → hours → days) and stops at zero without going negative.
//! [`CountdownTimer`] drives the tick from a tokio interval and stops it
//! when dropped.

#[cfg(test)]
#[path = "countdown_test.rs"]
mod countdown_test;

use std::time::Duration;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

const SECS_PER_MINUTE: i64 = 60;
const MINUTES_PER_HOUR: i64 = 60;
const HOURS_PER_DAY: i64 = 24;

/// Shortest tick period the timer accepts; shorter periods are raised to it.
pub const MIN_TICK_PERIOD: Duration = Duration::from_millis(1);

/// Remaining time broken into days, hours, and minutes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Countdown {
    pub days: u32,
    pub hours: u32,
    pub minutes: u32,
}

impl Countdown {
    #[must_use]
    pub const fn new(days: u32, hours: u32, minutes: u32) -> Self {
        Self { days, hours, minutes }
    }

    /// Breakdown of the time left until `end`; zero once `end` has passed.
    /// Leftover seconds are truncated.
    #[must_use]
    pub fn until(end: OffsetDateTime, now: OffsetDateTime) -> Self {
        let total_minutes = (end - now).whole_seconds().max(0) / SECS_PER_MINUTE;
        let minutes = total_minutes % MINUTES_PER_HOUR;
        let total_hours = total_minutes / MINUTES_PER_HOUR;
        let hours = total_hours % HOURS_PER_DAY;
        let days = total_hours / HOURS_PER_DAY;
        Self {
            days: u32::try_from(days).unwrap_or(u32::MAX),
            hours: u32::try_from(hours).unwrap_or(0),
            minutes: u32::try_from(minutes).unwrap_or(0),
        }
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.days == 0 && self.hours == 0 && self.minutes == 0
    }

    /// Advance one minute. A no-op at zero.
    pub fn tick(&mut self) {
        if self.minutes > 0 {
            self.minutes -= 1;
        } else if self.hours > 0 {
            self.hours -= 1;
            self.minutes = 59;
        } else if self.days > 0 {
            self.days -= 1;
            self.hours = 23;
            self.minutes = 59;
        }
    }
}

impl std::fmt::Display for Countdown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}d {:02}h {:02}m", self.days, self.hours, self.minutes)
    }
}

/// Ticks a [`Countdown`] on a fixed period and publishes every value.
///
/// The interval task starts in [`CountdownTimer::start`] and is aborted on
/// drop, so a timer never outlives its owner.
pub struct CountdownTimer {
    state: watch::Receiver<Countdown>,
    task: JoinHandle<()>,
}

impl CountdownTimer {
    /// Spawn the tick task. Must be called within a tokio runtime.
    ///
    /// The first tick fires one full `period` after start. A `period` below
    /// [`MIN_TICK_PERIOD`] is raised to it.
    #[must_use]
    pub fn start(initial: Countdown, period: Duration) -> Self {
        if period < MIN_TICK_PERIOD {
            warn!(period_ms = period.as_millis(), "countdown period too short; using minimum");
        }
        let period = period.max(MIN_TICK_PERIOD);
        let (tx, state) = watch::channel(initial);
        debug!(%initial, period_secs = period.as_secs(), "countdown started");
        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                tx.send_modify(Countdown::tick);
                if tx.is_closed() {
                    break;
                }
            }
        });
        Self { state, task }
    }

    /// Current value.
    #[must_use]
    pub fn current(&self) -> Countdown {
        *self.state.borrow()
    }

    /// Receiver notified on every tick.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Countdown> {
        self.state.clone()
    }

    /// True once the tick task has stopped.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for CountdownTimer {
    fn drop(&mut self) {
        debug!(remaining = %self.current(), "countdown stopped");
        self.task.abort();
    }
}
