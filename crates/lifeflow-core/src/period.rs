//! Qualifying periods
//!
//! A period is identified by its first calendar day: the day itself for daily
//! habits, the Monday of the ISO week for weekly ones. Using the start date as
//! the key keeps periods totally ordered and makes "is the next period" a plain
//! date comparison, which is all the streak scan needs.

use chrono::{Datelike, Duration, NaiveDate};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cadence {
    /// One calendar day per period
    Daily,
    /// One ISO week (Monday..Sunday) per period
    Weekly,
}

impl Cadence {
    fn step(&self) -> Duration {
        match self {
            Cadence::Daily => Duration::days(1),
            Cadence::Weekly => Duration::weeks(1),
        }
    }

    /// First day of the period containing `day`.
    pub fn start_of(&self, day: NaiveDate) -> NaiveDate {
        match self {
            Cadence::Daily => day,
            Cadence::Weekly => day - Duration::days(day.weekday().num_days_from_monday() as i64),
        }
    }

    /// Start of the period following the one that starts at `start`.
    pub fn next(&self, start: NaiveDate) -> NaiveDate {
        start + self.step()
    }

    /// Start of the period preceding the one that starts at `start`.
    pub fn prev(&self, start: NaiveDate) -> NaiveDate {
        start - self.step()
    }

    /// Number of periods touched by the inclusive day range `[from, to]`.
    ///
    /// Returns 0 when `from` is after `to`.
    pub fn periods_between(&self, from: NaiveDate, to: NaiveDate) -> u32 {
        let first = self.start_of(from);
        let last = self.start_of(to);
        if first > last {
            return 0;
        }
        let days = (last - first).num_days();
        let periods = match self {
            Cadence::Daily => days + 1,
            Cadence::Weekly => days / 7 + 1,
        };
        u32::try_from(periods).unwrap_or(u32::MAX)
    }
}
