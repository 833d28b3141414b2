use crate::domain::ports::Clock;
use chrono::{Local, NaiveDate};

/// Calendar date in the server's local time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    date: NaiveDate,
}

impl FixedClock {
    pub fn new(date: NaiveDate) -> Self {
        Self { date }
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.date
    }
}
