//! API models for REST endpoints
//!
//! JSON field names are camelCase. Timestamps are milliseconds since the Unix
//! epoch and calendar days are `YYYY-MM-DD`.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use lifeflow_core::{HabitCategory, HabitFrequency, HabitStats};
use lifeflow_store::{Habit, HabitLog, HabitUpdate, NewHabit, DEFAULT_COLOR, DEFAULT_ICON, DEFAULT_TARGET_DAYS};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::error::ApiError;

/// Success envelope: `{"success": true, "data": ...}`
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Parse a calendar day from `YYYY-MM-DD`, an RFC 3339 datetime (the day in
/// its own offset) or a naive `YYYY-MM-DDTHH:MM:SS[.fff]` datetime.
pub fn parse_day(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.date_naive()))
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|dt| dt.date())
        })
}

/// Parse an optional date parameter, naming it in the error.
pub fn parse_day_param(field: &str, value: Option<&str>) -> Result<Option<NaiveDate>, ApiError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(raw) => parse_day(raw)
            .map(Some)
            .ok_or_else(|| ApiError::InvalidInput(format!("{} is not a valid date: {}", field, raw))),
    }
}

// ---------------------------------------------------------------
// Habits
// ---------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateHabitRequest {
    pub name: String,
    pub description: Option<String>,
    #[schema(value_type = String, example = "fitness")]
    pub category: HabitCategory,
    #[schema(value_type = String, example = "daily")]
    pub frequency: HabitFrequency,
    /// Defaults to 7
    pub target_days: Option<u32>,
    /// Defaults to #6366f1
    pub color: Option<String>,
    /// Defaults to "check"
    pub icon: Option<String>,
}

impl CreateHabitRequest {
    pub fn into_new_habit(self) -> NewHabit {
        NewHabit {
            name: self.name,
            description: self.description,
            category: self.category,
            frequency: self.frequency,
            target_days: self.target_days.unwrap_or(DEFAULT_TARGET_DAYS),
            color: self.color.unwrap_or_else(|| DEFAULT_COLOR.to_string()),
            icon: self.icon.unwrap_or_else(|| DEFAULT_ICON.to_string()),
        }
    }
}

/// Partial update. Absent fields keep their stored value.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateHabitRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    #[schema(value_type = Option<String>)]
    pub category: Option<HabitCategory>,
    #[schema(value_type = Option<String>)]
    pub frequency: Option<HabitFrequency>,
    pub target_days: Option<u32>,
    pub color: Option<String>,
    pub icon: Option<String>,
}

impl From<UpdateHabitRequest> for HabitUpdate {
    fn from(req: UpdateHabitRequest) -> Self {
        HabitUpdate {
            name: req.name,
            description: req.description,
            category: req.category,
            frequency: req.frequency,
            target_days: req.target_days,
            color: req.color,
            icon: req.icon,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HabitResponse {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub description: Option<String>,
    #[schema(value_type = String)]
    pub category: HabitCategory,
    #[schema(value_type = String)]
    pub frequency: HabitFrequency,
    pub target_days: u32,
    pub color: String,
    pub icon: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<Habit> for HabitResponse {
    fn from(h: Habit) -> Self {
        Self {
            id: h.id,
            user_id: h.user_id,
            name: h.name,
            description: h.description,
            category: h.category,
            frequency: h.frequency,
            target_days: h.target_days,
            color: h.color,
            icon: h.icon,
            created_at: h.created_at,
            updated_at: h.updated_at,
        }
    }
}

/// A habit plus statistics derived from its logs.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HabitWithStats {
    #[serde(flatten)]
    pub habit: HabitResponse,
    pub current_streak: u32,
    pub best_streak: u32,
    /// Fraction of elapsed periods that qualified, in [0, 1]
    pub completion_rate: f64,
    pub total_completions: u32,
}

impl HabitWithStats {
    pub fn new(habit: Habit, stats: HabitStats) -> Self {
        Self {
            habit: habit.into(),
            current_streak: stats.current_streak,
            best_streak: stats.best_streak,
            completion_rate: stats.completion_rate,
            total_completions: stats.total_completions,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteHabitResponse {
    pub id: String,
    pub message: String,
}

// ---------------------------------------------------------------
// Logs
// ---------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LogHabitRequest {
    /// `YYYY-MM-DD` or an ISO-8601 datetime
    #[schema(example = "2024-01-15")]
    pub logged_date: String,
    pub completed: bool,
    pub notes: Option<String>,
    /// 1-5, defaults to 3
    pub intensity: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HabitLogResponse {
    pub id: String,
    pub habit_id: String,
    pub user_id: String,
    #[schema(value_type = String, format = Date, example = "2024-01-15")]
    pub logged_date: NaiveDate,
    pub completed: bool,
    pub notes: Option<String>,
    pub intensity: u8,
    pub created_at: i64,
}

impl From<HabitLog> for HabitLogResponse {
    fn from(l: HabitLog) -> Self {
        Self {
            id: l.id,
            habit_id: l.habit_id,
            user_id: l.user_id,
            logged_date: l.logged_date,
            completed: l.completed,
            notes: l.notes,
            intensity: l.intensity,
            created_at: l.created_at,
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct LogRangeParams {
    /// Inclusive lower bound
    pub start_date: Option<String>,
    /// Inclusive upper bound
    pub end_date: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AsOfParams {
    /// Evaluate statistics as of this calendar day (the caller's local date)
    pub as_of: Option<String>,
    /// Caller's offset from UTC in minutes, used for "today" and for the day
    /// each habit was created on
    pub utc_offset_minutes: Option<i32>,
}

// ---------------------------------------------------------------
// Analytics
// ---------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub today: TodayStats,
    pub week: WeekStats,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TodayStats {
    pub habits_completed: u32,
    pub total_habits: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WeekStats {
    pub habit_completion_rate: f64,
    pub best_streak: Option<BestStreak>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BestStreak {
    pub habit_name: String,
    pub streak: u32,
}

// ---------------------------------------------------------------
// Health
// ---------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    /// RFC 3339
    pub timestamp: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_parse_day_formats() {
        assert_eq!(parse_day("2024-01-15"), Some(d(2024, 1, 15)));
        assert_eq!(parse_day(" 2024-01-15 "), Some(d(2024, 1, 15)));
        assert_eq!(parse_day("2024-01-15T23:30:00Z"), Some(d(2024, 1, 15)));
        // The day is taken in the stated offset, not converted to UTC
        assert_eq!(parse_day("2024-01-15T23:30:00-05:00"), Some(d(2024, 1, 15)));
        assert_eq!(parse_day("2024-01-15T08:00:00"), Some(d(2024, 1, 15)));
        assert_eq!(parse_day("2024-01-15T08:00:00.250"), Some(d(2024, 1, 15)));
        assert_eq!(parse_day("2024-02-29"), Some(d(2024, 2, 29)));
    }

    #[test]
    fn test_parse_day_rejects_garbage() {
        assert_eq!(parse_day("yesterday"), None);
        assert_eq!(parse_day("2023-02-29"), None);
        assert_eq!(parse_day("2024-13-01"), None);
        assert_eq!(parse_day(""), None);
    }

    #[test]
    fn test_parse_day_param() {
        assert_eq!(parse_day_param("startDate", None).unwrap(), None);
        assert_eq!(parse_day_param("startDate", Some("")).unwrap(), None);
        assert!(matches!(
            parse_day_param("startDate", Some("soon")),
            Err(ApiError::InvalidInput(msg)) if msg.contains("startDate")
        ));
    }

    #[test]
    fn test_create_request_defaults() {
        let req: CreateHabitRequest = serde_json::from_value(serde_json::json!({
            "name": "Read",
            "category": "learning",
            "frequency": "daily"
        }))
        .unwrap();

        let habit = req.into_new_habit();
        assert_eq!(habit.target_days, 7);
        assert_eq!(habit.color, "#6366f1");
        assert_eq!(habit.icon, "check");
    }

    #[test]
    fn test_habit_with_stats_is_flat_camel_case() {
        let habit = Habit {
            id: "h1".to_string(),
            user_id: "u1".to_string(),
            name: "Run".to_string(),
            description: None,
            category: HabitCategory::Fitness,
            frequency: HabitFrequency::Weekly,
            target_days: 3,
            color: "#000000".to_string(),
            icon: "run".to_string(),
            created_at: 1,
            updated_at: 2,
        };
        let stats = HabitStats {
            current_streak: 2,
            best_streak: 4,
            completion_rate: 0.5,
            total_completions: 9,
        };

        let json = serde_json::to_value(HabitWithStats::new(habit, stats)).unwrap();
        assert_eq!(json["id"], "h1");
        assert_eq!(json["targetDays"], 3);
        assert_eq!(json["frequency"], "weekly");
        assert_eq!(json["currentStreak"], 2);
        assert_eq!(json["bestStreak"], 4);
        assert_eq!(json["completionRate"], 0.5);
        assert_eq!(json["totalCompletions"], 9);
    }

    #[test]
    fn test_log_date_renders_as_plain_day() {
        let log = HabitLogResponse {
            id: "l1".to_string(),
            habit_id: "h1".to_string(),
            user_id: "u1".to_string(),
            logged_date: d(2024, 1, 7),
            completed: true,
            notes: None,
            intensity: 3,
            created_at: 0,
        };
        let json = serde_json::to_value(log).unwrap();
        assert_eq!(json["loggedDate"], "2024-01-07");
        assert_eq!(json["habitId"], "h1");
    }
}
