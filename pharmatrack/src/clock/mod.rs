use chrono::{Local, NaiveDate, NaiveDateTime};

/// Source of "today" for creation stamps and expiry windows.
pub trait Clock {
    fn today(&self) -> NaiveDate;

    fn now(&self) -> NaiveDateTime;
}

/// Wall clock in the local time zone
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock pinned to one date (midnight), for tests and reproducible reports
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }

    fn now(&self) -> NaiveDateTime {
        self.0.and_hms_opt(0, 0, 0).unwrap_or_default()
    }
}
