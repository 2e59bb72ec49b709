use chrono::{DateTime, Utc};
use std::time::Instant;

/// Source of time for everything that makes time-based decisions.
///
/// `now` is monotonic and drives admission windows, `utc` is wall-clock
/// time and drives token expiry.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
    fn utc(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(test)]
pub use manual::ManualClock;
