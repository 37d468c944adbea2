//! Error Types for LifeFlow habit analytics
//!
//! The streak engine is pure: the only thing that can go wrong is input that
//! breaks the log invariants (for example two logs for the same calendar day,
//! which the store's unique constraint is supposed to rule out).
//!
//! ## Example
//! ```ignore
//! use lifeflow_core::{StatsError, StreakEngine};
//!
//! match engine.compute(&marks, created_on, today) {
//!     Ok(stats) => println!("streak: {}", stats.current_streak),
//!     Err(StatsError::DuplicateDay(day)) => eprintln!("corrupt history at {day}"),
//!     Err(e) => return Err(e.into()),
//! }
//! ```

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatsError {
    #[error("More than one log recorded for {0}")]
    DuplicateDay(NaiveDate),

    #[error("Unknown habit category: {0}")]
    UnknownCategory(String),

    #[error("Unknown habit frequency: {0}")]
    UnknownFrequency(String),
}

pub type Result<T> = std::result::Result<T, StatsError>;
