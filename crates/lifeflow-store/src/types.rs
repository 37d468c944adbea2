//! Store Type Definitions
//!
//! Data structures exchanged with the habit store.
//!
//! ## Types Overview
//!
//! ### NewHabit / HabitUpdate
//! Input for creating a habit and for partially updating one. Absent update
//! fields keep their stored value.
//!
//! ### Habit
//! A stored habit, always owned by exactly one user.
//!
//! ### LogUpsert
//! One day's completion event. Written with upsert semantics keyed by
//! (habit, logged date): the first write creates the row, later writes for the
//! same day overwrite `completed`, `notes` and `intensity`.
//!
//! ### HabitLog
//! A stored per-day record.
//!
//! ### DateRange
//! Optional inclusive bounds for log queries.
//!
//! ## Design Decisions
//!
//! - Timestamps are i64 milliseconds since epoch, dates are `NaiveDate`
//!   (no time component, interpreted in the user's own calendar)
//! - Ids are UUID v4 strings generated by the store
//! - Validation lives here so every backend enforces the same rules

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use lifeflow_core::{DayMark, HabitCategory, HabitFrequency};
use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};

/// Intensity recorded when a log does not specify one.
pub const DEFAULT_INTENSITY: u8 = 3;

/// Target days used when a habit is created without one.
pub const DEFAULT_TARGET_DAYS: u32 = 7;

pub const DEFAULT_COLOR: &str = "#6366f1";
pub const DEFAULT_ICON: &str = "check";

/// Check an intensity value against the 1-5 scale.
pub fn validate_intensity(intensity: u8) -> Result<u8> {
    if (1..=5).contains(&intensity) {
        Ok(intensity)
    } else {
        Err(StoreError::InvalidInput(format!(
            "intensity must be between 1 and 5, got {}",
            intensity
        )))
    }
}

fn validate_target_days(target_days: u32) -> Result<u32> {
    if target_days >= 1 {
        Ok(target_days)
    } else {
        Err(StoreError::InvalidInput(
            "targetDays must be at least 1".to_string(),
        ))
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(StoreError::InvalidInput("name must not be empty".to_string()));
    }
    Ok(())
}

/// Configuration for creating a new habit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewHabit {
    pub name: String,
    pub description: Option<String>,
    pub category: HabitCategory,
    pub frequency: HabitFrequency,
    pub target_days: u32,
    pub color: String,
    pub icon: String,
}

impl NewHabit {
    /// Habit with default target days and presentation.
    pub fn new(name: impl Into<String>, category: HabitCategory, frequency: HabitFrequency) -> Self {
        Self {
            name: name.into(),
            description: None,
            category,
            frequency,
            target_days: DEFAULT_TARGET_DAYS,
            color: DEFAULT_COLOR.to_string(),
            icon: DEFAULT_ICON.to_string(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_name(&self.name)?;
        validate_target_days(self.target_days)?;
        Ok(())
    }
}

/// Partial habit update. `None` keeps the stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HabitUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<HabitCategory>,
    pub frequency: Option<HabitFrequency>,
    pub target_days: Option<u32>,
    pub color: Option<String>,
    pub icon: Option<String>,
}

impl HabitUpdate {
    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(target_days) = self.target_days {
            validate_target_days(target_days)?;
        }
        Ok(())
    }
}

/// A stored habit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub description: Option<String>,
    pub category: HabitCategory,
    pub frequency: HabitFrequency,
    /// Always >= 1
    pub target_days: u32,
    pub color: String,
    pub icon: String,
    /// Creation timestamp (milliseconds since Unix epoch)
    pub created_at: i64,
    /// Last update timestamp (milliseconds since Unix epoch)
    pub updated_at: i64,
}

impl Habit {
    /// Calendar day the habit was created on, as seen from `offset`.
    pub fn created_on(&self, offset: FixedOffset) -> NaiveDate {
        DateTime::<Utc>::from_timestamp_millis(self.created_at)
            .map(|ts| ts.with_timezone(&offset).date_naive())
            .unwrap_or_default()
    }
}

/// One day's completion event for a habit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogUpsert {
    pub habit_id: String,
    pub user_id: String,
    pub logged_date: NaiveDate,
    pub completed: bool,
    pub notes: Option<String>,
    /// Defaults to [`DEFAULT_INTENSITY`]
    pub intensity: Option<u8>,
}

impl LogUpsert {
    /// Intensity after defaulting and range checking.
    pub fn effective_intensity(&self) -> Result<u8> {
        validate_intensity(self.intensity.unwrap_or(DEFAULT_INTENSITY))
    }
}

/// A stored per-day log. At most one exists per (habit_id, logged_date).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitLog {
    pub id: String,
    pub habit_id: String,
    pub user_id: String,
    pub logged_date: NaiveDate,
    pub completed: bool,
    pub notes: Option<String>,
    pub intensity: u8,
    /// Timestamp of the first write for this day (milliseconds since Unix epoch)
    pub created_at: i64,
}

impl HabitLog {
    pub fn mark(&self) -> DayMark {
        DayMark::new(self.logged_date, self.completed)
    }
}

/// Inclusive date bounds for log queries. Both ends are optional.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    /// Range from `start` to the far future.
    pub fn since(start: NaiveDate) -> Self {
        Self {
            start: Some(start),
            end: None,
        }
    }
}
