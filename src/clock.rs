use chrono::{DateTime, Local, NaiveDate, Utc};
use std::time::Instant;

/// Source of wall and monotonic time for the scheduler and the flows.
pub trait Clock {
    fn now_utc(&self) -> DateTime<Utc>;
    fn now_instant(&self) -> Instant;
    fn today_local(&self) -> NaiveDate;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn now_instant(&self) -> Instant {
        Instant::now()
    }

    fn today_local(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

#[cfg(test)]
pub use manual::ManualClock;

#[cfg(test)]
mod manual {
    use super::Clock;
    use chrono::{DateTime, NaiveDate, TimeZone, Utc};
    use std::cell::Cell;
    use std::time::{Duration, Instant};

    /// Clock that only moves when told to.
    pub struct ManualClock {
        base_utc: DateTime<Utc>,
        base_instant: Instant,
        elapsed: Cell<Duration>,
    }

    impl ManualClock {
        pub fn new() -> Self {
            Self::at(Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap())
        }

        pub fn at(base_utc: DateTime<Utc>) -> Self {
            Self {
                base_utc,
                base_instant: Instant::now(),
                elapsed: Cell::new(Duration::ZERO),
            }
        }

        pub fn advance(&self, by: Duration) {
            self.elapsed.set(self.elapsed.get() + by);
        }
    }

    impl Clock for ManualClock {
        fn now_utc(&self) -> DateTime<Utc> {
            self.base_utc + chrono::Duration::from_std(self.elapsed.get()).unwrap()
        }

        fn now_instant(&self) -> Instant {
            self.base_instant + self.elapsed.get()
        }

        fn today_local(&self) -> NaiveDate {
            self.now_utc().date_naive()
        }
    }
}
