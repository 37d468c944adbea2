//! Habit Aggregator
//!
//! Runs the streak engine over every habit of a user and composes the
//! per-habit listing and the dashboard from the same scan.
//!
//! ## Data Flow
//!
//! ```text
//! list_habits(user) ──→ for each habit (at most 8 in flight):
//!                         list_logs(habit, user, last N days)
//!                         StreakEngine::compute(marks, tracking_since, today)
//!                       ──→ Vec<HabitReport> (store order: newest habit first)
//! ```
//!
//! `today` and the creation day of each habit are both read in the caller's
//! UTC offset, so a habit created late in the evening starts on the caller's
//! day rather than the server's.
//!
//! Nothing is cached. Every call reads the store again, so a log written a
//! moment ago is always reflected.
//!
//! ## Partial Failure
//!
//! If one habit's logs cannot be read or do not form a valid history, that
//! habit is reported with zeroed statistics and a `warn!` is emitted. Only a
//! failure to list the habits themselves fails the request.

use chrono::{Duration, FixedOffset, NaiveDate};
use futures::stream::{self, StreamExt};
use lifeflow_core::{DayMark, HabitStats, StatsError, StreakEngine, WeeklyRollup};
use lifeflow_store::{DateRange, Habit, HabitStore, StoreError};
use std::sync::Arc;
use thiserror::Error;

use crate::error::ApiResult;
use crate::models::HabitWithStats;

/// One habit with its computed statistics and the marks they came from.
#[derive(Debug, Clone)]
pub struct HabitReport {
    pub habit: Habit,
    pub stats: HabitStats,
    /// Logs inside the lookback window; empty when statistics degraded
    pub marks: Vec<DayMark>,
}

impl HabitReport {
    pub fn completed_on(&self, day: NaiveDate) -> bool {
        self.marks.iter().any(|m| m.date == day && m.completed)
    }
}

/// Dashboard figures for one user and one day.
#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub habits_completed_today: u32,
    pub total_habits: u32,
    pub week: WeeklyRollup,
    /// Habit with the longest running streak, if any streak is running
    pub best_streak: Option<(String, u32)>,
}

/// Per-habit log queries allowed in flight for one request.
const MAX_CONCURRENT_HABIT_QUERIES: usize = 8;

#[derive(Debug, Error)]
enum ReportError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Stats(#[from] StatsError),
}

#[derive(Clone)]
pub struct HabitAggregator {
    store: Arc<dyn HabitStore>,
    lookback_days: u32,
}

impl HabitAggregator {
    pub fn new(store: Arc<dyn HabitStore>, lookback_days: u32) -> Self {
        Self {
            store,
            lookback_days: lookback_days.max(1),
        }
    }

    /// First day of the log window that ends on `today`.
    pub fn window_start(&self, today: NaiveDate) -> NaiveDate {
        today - Duration::days(i64::from(self.lookback_days) - 1)
    }

    /// Statistics for every habit of `user_id`, newest habit first.
    pub async fn reports(
        &self,
        user_id: &str,
        today: NaiveDate,
        offset: FixedOffset,
    ) -> ApiResult<Vec<HabitReport>> {
        let habits = self.store.list_habits(user_id).await?;
        let since = self.window_start(today);

        // buffered keeps the store order
        let reports: Vec<HabitReport> = stream::iter(habits)
            .map(|habit| self.report(user_id, habit, since, today, offset))
            .buffered(MAX_CONCURRENT_HABIT_QUERIES)
            .collect()
            .await;

        Ok(reports)
    }

    pub async fn list_with_stats(
        &self,
        user_id: &str,
        today: NaiveDate,
        offset: FixedOffset,
    ) -> ApiResult<Vec<HabitWithStats>> {
        Ok(self
            .reports(user_id, today, offset)
            .await?
            .into_iter()
            .map(|r| HabitWithStats::new(r.habit, r.stats))
            .collect())
    }

    pub async fn dashboard(
        &self,
        user_id: &str,
        today: NaiveDate,
        offset: FixedOffset,
    ) -> ApiResult<Dashboard> {
        let reports = self.reports(user_id, today, offset).await?;

        let mut dashboard = Dashboard {
            habits_completed_today: 0,
            total_habits: reports.len() as u32,
            week: WeeklyRollup::default(),
            best_streak: None,
        };

        for report in &reports {
            if report.completed_on(today) {
                dashboard.habits_completed_today += 1;
            }
            dashboard.week.record(
                report.habit.frequency,
                report.habit.target_days,
                &report.marks,
                today,
            );

            let streak = report.stats.current_streak;
            let leading = dashboard.best_streak.as_ref().map_or(0, |(_, s)| *s);
            if streak > leading {
                dashboard.best_streak = Some((report.habit.name.clone(), streak));
            }
        }

        Ok(dashboard)
    }

    async fn report(
        &self,
        user_id: &str,
        habit: Habit,
        since: NaiveDate,
        today: NaiveDate,
        offset: FixedOffset,
    ) -> HabitReport {
        match self.compute(user_id, &habit, since, today, offset).await {
            Ok((stats, marks)) => HabitReport {
                habit,
                stats,
                marks,
            },
            Err(error) => {
                tracing::warn!(
                    habit_id = %habit.id,
                    user_id,
                    error = %error,
                    "habit statistics unavailable, reporting zeros"
                );
                HabitReport {
                    habit,
                    stats: HabitStats::default(),
                    marks: Vec::new(),
                }
            }
        }
    }

    async fn compute(
        &self,
        user_id: &str,
        habit: &Habit,
        since: NaiveDate,
        today: NaiveDate,
        offset: FixedOffset,
    ) -> Result<(HabitStats, Vec<DayMark>), ReportError> {
        let logs = self
            .store
            .list_logs(&habit.id, user_id, DateRange::since(since))
            .await?;
        let marks: Vec<DayMark> = logs.iter().map(|l| l.mark()).collect();

        let tracking_since = habit.created_on(offset).max(since);
        let stats = StreakEngine::new(habit.frequency, habit.target_days).compute(
            &marks,
            tracking_since,
            today,
        )?;

        Ok((stats, marks))
    }
}
