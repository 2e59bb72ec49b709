use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::clock::Clock;

/// Trailing window over which the hourly quota is counted.
pub const QUOTA_WINDOW: Duration = Duration::from_secs(60 * 60);

// Admission record - tracks admitted requests per client identity
#[derive(Default, Debug)]
pub struct AdmissionRecord {
    pub last_request: Option<Instant>,
    pub timestamps: Vec<Instant>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Admitted,
    /// Rejected because the previous admitted request is too recent.
    Cooldown { retry_after: Duration },
    /// Rejected because the client used its quota for the trailing hour.
    QuotaExhausted { retry_after: Duration },
}

/// Per-client cooldown plus sliding-window quota.
///
/// Records are created on first sight of a client and never removed, so the
/// map grows with the number of distinct identities seen by the process.
pub struct AdmissionController {
    records: DashMap<String, AdmissionRecord>,
    cooldown: Duration,
    hourly_limit: usize,
    clock: Arc<dyn Clock>,
}

impl AdmissionController {
    pub fn new(cooldown: Duration, hourly_limit: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            records: DashMap::new(),
            cooldown,
            hourly_limit,
            clock,
        }
    }

    /// Check-and-update for `client`. The record stays locked for the whole
    /// decision, so concurrent checks for the same client serialize.
    pub fn check(&self, client: &str) -> Admission {
        let now = self.clock.now();

        let mut record = self.records.entry(client.to_string()).or_default();

        // a client with no history is admitted outright, whatever the quota
        let Some(last) = record.last_request else {
            record.timestamps.push(now);
            record.last_request = Some(now);
            debug!(client, "admission granted: first request");
            return Admission::Admitted;
        };

        let elapsed = now.duration_since(last);
        if elapsed < self.cooldown {
            warn!(client, ?elapsed, "admission denied: cooldown");
            return Admission::Cooldown {
                retry_after: self.cooldown - elapsed,
            };
        }

        // pruning sticks even if the quota check below rejects
        record
            .timestamps
            .retain(|t| now.duration_since(*t) < QUOTA_WINDOW);

        if record.timestamps.len() >= self.hourly_limit {
            let retry_after = record
                .timestamps
                .first()
                .map(|oldest| QUOTA_WINDOW - now.duration_since(*oldest))
                .unwrap_or(QUOTA_WINDOW);
            warn!(client, count = record.timestamps.len(), "admission denied: hourly quota");
            return Admission::QuotaExhausted { retry_after };
        }

        record.timestamps.push(now);
        record.last_request = Some(now);
        debug!(client, count = record.timestamps.len(), "admission granted");
        Admission::Admitted
    }

    // Number of client identities ever seen
    pub fn tracked_clients(&self) -> usize {
        self.records.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn controller(clock: Arc<ManualClock>) -> AdmissionController {
        AdmissionController::new(Duration::from_secs(5), 25, clock)
    }

    #[test]
    fn first_request_is_admitted() {
        let clock = Arc::new(ManualClock::new());
        let limiter = controller(clock);

        assert_eq!(limiter.check("10.0.0.1"), Admission::Admitted);
        assert_eq!(limiter.tracked_clients(), 1);
    }

    #[test]
    fn first_request_admitted_even_with_zero_quota() {
        let clock = Arc::new(ManualClock::new());
        let limiter = AdmissionController::new(Duration::from_secs(5), 0, clock.clone());

        assert_eq!(limiter.check("fresh"), Admission::Admitted);

        // once there is history the quota applies as usual
        clock.advance(Duration::from_secs(10));
        assert!(matches!(
            limiter.check("fresh"),
            Admission::QuotaExhausted { .. }
        ));
    }

    #[test]
    fn cooldown_rejects_then_boundary_admits() {
        let clock = Arc::new(ManualClock::new());
        let limiter = controller(clock.clone());

        assert_eq!(limiter.check("a"), Admission::Admitted);

        clock.advance(Duration::from_secs(2));
        assert_eq!(
            limiter.check("a"),
            Admission::Cooldown {
                retry_after: Duration::from_secs(3)
            }
        );

        // exactly at the cooldown boundary
        clock.advance(Duration::from_secs(3));
        assert_eq!(limiter.check("a"), Admission::Admitted);
    }

    #[test]
    fn cooldown_rejection_does_not_record_request() {
        let clock = Arc::new(ManualClock::new());
        let limiter = controller(clock.clone());

        assert_eq!(limiter.check("a"), Admission::Admitted);
        clock.advance(Duration::from_secs(1));
        assert_ne!(limiter.check("a"), Admission::Admitted);

        // cooldown is measured from the admitted request, not the rejected one
        clock.advance(Duration::from_secs(4));
        assert_eq!(limiter.check("a"), Admission::Admitted);
    }

    #[test]
    fn clients_are_isolated() {
        let clock = Arc::new(ManualClock::new());
        let limiter = controller(clock);

        assert_eq!(limiter.check("a"), Admission::Admitted);
        assert_eq!(limiter.check("b"), Admission::Admitted);
        assert_ne!(limiter.check("a"), Admission::Admitted);
        assert_eq!(limiter.tracked_clients(), 2);
    }

    #[test]
    fn hourly_quota_exhausts_and_recovers() {
        let clock = Arc::new(ManualClock::new());
        let limiter = controller(clock.clone());

        // t=0 admit, t=2 cooldown, t=6 admit, then every 6s
        assert_eq!(limiter.check("x"), Admission::Admitted);
        clock.advance(Duration::from_secs(2));
        assert!(matches!(limiter.check("x"), Admission::Cooldown { .. }));
        clock.advance(Duration::from_secs(4));

        let mut admitted = 1;
        while admitted < 25 {
            assert_eq!(limiter.check("x"), Admission::Admitted);
            admitted += 1;
            clock.advance(Duration::from_secs(6));
        }

        // t=150: outside cooldown but quota is used up
        assert!(matches!(
            limiter.check("x"),
            Admission::QuotaExhausted { .. }
        ));

        // t=3599: the t=0 request is still inside the window
        clock.advance(Duration::from_secs(3599 - 150));
        assert_eq!(
            limiter.check("x"),
            Admission::QuotaExhausted {
                retry_after: Duration::from_secs(1)
            }
        );

        // t=3600: the t=0 request ages out
        clock.advance(Duration::from_secs(1));
        assert_eq!(limiter.check("x"), Admission::Admitted);

        // window now holds t=6..=144 plus t=3600
        clock.advance(Duration::from_secs(5));
        assert!(matches!(
            limiter.check("x"),
            Admission::QuotaExhausted { .. }
        ));
    }

    #[test]
    fn pruning_survives_quota_rejection() {
        let clock = Arc::new(ManualClock::new());
        let limiter = AdmissionController::new(Duration::ZERO, 2, clock.clone());

        assert_eq!(limiter.check("p"), Admission::Admitted);
        clock.advance(Duration::from_secs(60 * 59));
        assert_eq!(limiter.check("p"), Admission::Admitted);
        clock.advance(Duration::from_secs(60 * 2));

        // first entry is pruned, second is still within the hour
        assert_eq!(limiter.check("p"), Admission::Admitted);
        assert_ne!(limiter.check("p"), Admission::Admitted);
        assert_eq!(
            limiter.records.get("p").map(|r| r.timestamps.len()),
            Some(2)
        );
    }

    #[test]
    fn concurrent_checks_admit_once() {
        let clock = Arc::new(ManualClock::new());
        let limiter = Arc::new(controller(clock));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                std::thread::spawn(move || limiter.check("shared") == Admission::Admitted)
            })
            .collect();

        let admitted = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();
        assert_eq!(admitted, 1);
    }
}
