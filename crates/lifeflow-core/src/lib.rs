//! LifeFlow core domain
//!
//! Pure, I/O-free building blocks for habit analytics:
//!
//! - [`habit`]: habit categories and frequencies
//! - [`period`]: mapping calendar days onto qualifying periods (days or ISO weeks)
//! - [`streak`]: the streak engine (current streak, best streak, completion rate)
//!
//! Everything here operates on data that has already been fetched, so it can be
//! unit tested without a database and reused by any store backend.

pub mod error;
pub mod habit;
pub mod period;
pub mod streak;

pub use error::{Result, StatsError};
pub use habit::{HabitCategory, HabitFrequency};
pub use period::Cadence;
pub use streak::{DayMark, HabitStats, StreakEngine, WeeklyRollup};
