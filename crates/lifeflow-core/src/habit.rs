//! Habit classification types
//!
//! Categories are presentation-only. Frequencies drive the streak engine: they
//! decide which calendar unit a streak is counted in and how many completed
//! days a unit needs before it counts.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::StatsError;
use crate::period::Cadence;

/// What area of life a habit belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HabitCategory {
    Fitness,
    Learning,
    Health,
    Productivity,
    Mindfulness,
    Social,
    Other,
}

impl HabitCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            HabitCategory::Fitness => "fitness",
            HabitCategory::Learning => "learning",
            HabitCategory::Health => "health",
            HabitCategory::Productivity => "productivity",
            HabitCategory::Mindfulness => "mindfulness",
            HabitCategory::Social => "social",
            HabitCategory::Other => "other",
        }
    }
}

impl fmt::Display for HabitCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HabitCategory {
    type Err = StatsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fitness" => Ok(HabitCategory::Fitness),
            "learning" => Ok(HabitCategory::Learning),
            "health" => Ok(HabitCategory::Health),
            "productivity" => Ok(HabitCategory::Productivity),
            "mindfulness" => Ok(HabitCategory::Mindfulness),
            "social" => Ok(HabitCategory::Social),
            "other" => Ok(HabitCategory::Other),
            _ => Err(StatsError::UnknownCategory(s.to_string())),
        }
    }
}

/// How often a habit is meant to be performed.
///
/// | Frequency | Period   | Completed days needed per period |
/// |-----------|----------|----------------------------------|
/// | `daily`   | day      | 1                                |
/// | `weekly`  | ISO week | 1                                |
/// | `custom`  | ISO week | `min(target_days, 7)`            |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HabitFrequency {
    Daily,
    Weekly,
    Custom,
}

impl HabitFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            HabitFrequency::Daily => "daily",
            HabitFrequency::Weekly => "weekly",
            HabitFrequency::Custom => "custom",
        }
    }

    /// Calendar unit a streak of this habit is measured in.
    pub fn cadence(&self) -> Cadence {
        match self {
            HabitFrequency::Daily => Cadence::Daily,
            HabitFrequency::Weekly | HabitFrequency::Custom => Cadence::Weekly,
        }
    }

    /// Completed days a single period needs before it counts toward a streak.
    pub fn required_per_period(&self, target_days: u32) -> u32 {
        match self {
            HabitFrequency::Daily | HabitFrequency::Weekly => 1,
            HabitFrequency::Custom => target_days.clamp(1, 7),
        }
    }

    /// Completed days expected in any trailing seven-day window.
    pub fn expected_per_week(&self, target_days: u32) -> u32 {
        match self {
            HabitFrequency::Daily => 7,
            HabitFrequency::Weekly => 1,
            HabitFrequency::Custom => target_days.clamp(1, 7),
        }
    }
}

impl fmt::Display for HabitFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HabitFrequency {
    type Err = StatsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(HabitFrequency::Daily),
            "weekly" => Ok(HabitFrequency::Weekly),
            "custom" => Ok(HabitFrequency::Custom),
            _ => Err(StatsError::UnknownFrequency(s.to_string())),
        }
    }
}
