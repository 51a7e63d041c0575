//! Wall-clock source
//!
//! The store needs "today" for the expiration sweep and "now" for
//! `created_at` stamps; documents need "now" for issuance stamps.
//! `FixedClock` pins both for tests.

use chrono::{DateTime, Local, NaiveDate, TimeZone};

/// Source of the current date and time
pub trait Clock {
    /// Current local date-time
    fn now(&self) -> DateTime<Local>;

    /// Current local calendar date
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }

    /// Current instant as milliseconds since the Unix epoch
    fn now_millis(&self) -> i64 {
        self.now().timestamp_millis()
    }
}

/// The system clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// A clock frozen at a single instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    now: DateTime<Local>,
}

impl FixedClock {
    pub fn new(now: DateTime<Local>) -> Self {
        Self { now }
    }

    /// Freeze the clock at local noon of the given date
    ///
    /// Noon keeps `today()` stable regardless of the host's UTC offset.
    pub fn at_date(date: NaiveDate) -> Self {
        let noon = date
            .and_hms_opt(12, 0, 0)
            .and_then(|dt| Local.from_local_datetime(&dt).earliest())
            .unwrap_or_else(Local::now);
        Self { now: noon }
    }

    /// Freeze the clock at an epoch-millisecond instant
    pub fn at_millis(millis: i64) -> Self {
        let now = Local
            .timestamp_millis_opt(millis)
            .single()
            .unwrap_or_else(Local::now);
        Self { now }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Local> {
        self.now
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> DateTime<Local> {
        (**self).now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock_today() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 15).unwrap();
        let clock = FixedClock::at_date(date);
        assert_eq!(clock.today(), date);
        assert_eq!(clock.today(), clock.today());
    }

    #[test]
    fn test_fixed_clock_millis() {
        let clock = FixedClock::at_millis(1_700_000_000_000);
        assert_eq!(clock.now_millis(), 1_700_000_000_000);
    }

    #[test]
    fn test_system_clock_advances() {
        let clock = SystemClock;
        let a = clock.now_millis();
        let b = clock.now_millis();
        assert!(b >= a);
    }
}
