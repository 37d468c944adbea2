//! Streak Engine
//!
//! Computes per-habit statistics from a habit's day-by-day log history.
//!
//! ## Scan, not aggregate
//!
//! "How many completed rows" is one `COUNT(*)`, but "how many *consecutive*
//! completed periods" is not expressible as a plain aggregate. The engine
//! therefore works on the already-fetched, date-sorted log sequence and does an
//! explicit scan with gap detection.
//!
//! ## Algorithm
//!
//! 1. Drop logs dated after `today` (future logs do not count until their day
//!    arrives) and sort the rest by date.
//! 2. Bucket completed days into periods (see [`Cadence`]) and keep the periods
//!    whose completed-day count meets the frequency's requirement.
//! 3. Walk the qualifying periods in order: a run continues while each period
//!    is exactly the successor of the previous one. The longest run is the best
//!    streak.
//! 4. The current streak is anchored at today's period when anything is
//!    logged in it, otherwise at the period of the most recent log. It counts
//!    qualifying periods backwards from the anchor and stops at the first
//!    gap, so an explicit "not completed" today ends the run.
//! 5. Completion rate is qualifying periods over elapsed periods, measured from
//!    the earlier of `tracking_since` and the first log.
//!
//! ## Invariants
//!
//! - `current_streak <= best_streak <= total_completions`
//! - `0.0 <= completion_rate <= 1.0`
//! - The result does not depend on the order of the input slice.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::error::{Result, StatsError};
use crate::habit::HabitFrequency;
use crate::period::Cadence;

/// One day of a habit's history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayMark {
    pub date: NaiveDate,
    pub completed: bool,
}

impl DayMark {
    pub fn new(date: NaiveDate, completed: bool) -> Self {
        Self { date, completed }
    }
}

/// Derived statistics for a single habit.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitStats {
    /// Consecutive qualifying periods ending at the anchor period
    pub current_streak: u32,
    /// Longest run of consecutive qualifying periods in the history
    pub best_streak: u32,
    /// Qualifying periods / elapsed periods, in [0, 1]
    pub completion_rate: f64,
    /// Number of completed days (not periods)
    pub total_completions: u32,
}

/// Pure streak calculator for one habit's frequency policy.
#[derive(Debug, Clone, Copy)]
pub struct StreakEngine {
    frequency: HabitFrequency,
    required: u32,
}

impl StreakEngine {
    pub fn new(frequency: HabitFrequency, target_days: u32) -> Self {
        Self {
            frequency,
            required: frequency.required_per_period(target_days),
        }
    }

    pub fn cadence(&self) -> Cadence {
        self.frequency.cadence()
    }

    /// Compute statistics as of `today`.
    ///
    /// `tracking_since` is the first day the habit is accountable for, usually
    /// its creation date. Logs older than that extend the window backwards.
    ///
    /// # Errors
    ///
    /// `DuplicateDay` when two marks share a date.
    pub fn compute(
        &self,
        marks: &[DayMark],
        tracking_since: NaiveDate,
        today: NaiveDate,
    ) -> Result<HabitStats> {
        let mut history: Vec<DayMark> = marks.iter().copied().filter(|m| m.date <= today).collect();
        history.sort_by_key(|m| m.date);

        if let Some(pair) = history.windows(2).find(|w| w[0].date == w[1].date) {
            return Err(StatsError::DuplicateDay(pair[0].date));
        }

        let total_completions = history.iter().filter(|m| m.completed).count() as u32;
        let qualifying = self.qualifying_periods(&history);

        let best_streak = self.best_run(&qualifying);
        let current_streak = self.current_run(&history, &qualifying);

        let start = history
            .first()
            .map(|m| m.date.min(tracking_since))
            .unwrap_or(tracking_since);
        let elapsed = self.cadence().periods_between(start, today);
        let completion_rate = if elapsed == 0 {
            0.0
        } else {
            (qualifying.len() as f64 / elapsed as f64).clamp(0.0, 1.0)
        };

        Ok(HabitStats {
            current_streak,
            best_streak,
            completion_rate,
            total_completions,
        })
    }

    fn qualifying_periods(&self, history: &[DayMark]) -> BTreeSet<NaiveDate> {
        let cadence = self.cadence();
        let mut per_period: BTreeMap<NaiveDate, u32> = BTreeMap::new();
        for mark in history.iter().filter(|m| m.completed) {
            *per_period.entry(cadence.start_of(mark.date)).or_default() += 1;
        }
        per_period
            .into_iter()
            .filter(|(_, done)| *done >= self.required)
            .map(|(start, _)| start)
            .collect()
    }

    fn best_run(&self, qualifying: &BTreeSet<NaiveDate>) -> u32 {
        let cadence = self.cadence();
        let mut best = 0;
        let mut run = 0;
        let mut previous: Option<NaiveDate> = None;

        for &start in qualifying {
            run = match previous {
                Some(prev) if cadence.next(prev) == start => run + 1,
                _ => 1,
            };
            best = best.max(run);
            previous = Some(start);
        }
        best
    }

    fn current_run(&self, history: &[DayMark], qualifying: &BTreeSet<NaiveDate>) -> u32 {
        let cadence = self.cadence();
        // history is sorted and holds nothing after today
        let Some(latest) = history.last() else {
            return 0;
        };

        let mut cursor = cadence.start_of(latest.date);
        let mut run = 0;
        while qualifying.contains(&cursor) {
            run += 1;
            cursor = cadence.prev(cursor);
        }
        run
    }
}

/// Trailing seven-day completion across several habits.
///
/// Each habit contributes its expected completions for a week and the number
/// it actually achieved, capped at the expectation so an over-achieving habit
/// cannot hide a neglected one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WeeklyRollup {
    pub completed: u32,
    pub expected: u32,
}

impl WeeklyRollup {
    pub fn record(
        &mut self,
        frequency: HabitFrequency,
        target_days: u32,
        marks: &[DayMark],
        today: NaiveDate,
    ) {
        let window_start = today - Duration::days(6);
        let done = marks
            .iter()
            .filter(|m| m.completed && m.date >= window_start && m.date <= today)
            .count() as u32;
        let expected = frequency.expected_per_week(target_days);
        self.completed += done.min(expected);
        self.expected += expected;
    }

    pub fn rate(&self) -> f64 {
        if self.expected == 0 {
            0.0
        } else {
            self.completed as f64 / self.expected as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(n: i64) -> NaiveDate {
        // 2024-01-01 is a Monday, which keeps the weekly cases readable
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Duration::days(n)
    }

    fn done(days: &[i64]) -> Vec<DayMark> {
        days.iter().map(|&d| DayMark::new(day(d), true)).collect()
    }

    fn daily() -> StreakEngine {
        StreakEngine::new(HabitFrequency::Daily, 7)
    }

    #[test]
    fn test_no_logs_is_all_zero() {
        let stats = daily().compute(&[], day(0), day(10)).unwrap();
        assert_eq!(stats, HabitStats::default());
    }

    #[test]
    fn test_created_today_without_logs() {
        let stats = daily().compute(&[], day(3), day(3)).unwrap();
        assert_eq!(stats.completion_rate, 0.0);
        assert_eq!(stats.current_streak, 0);
    }

    #[test]
    fn test_gap_breaks_current_streak() {
        let stats = daily().compute(&done(&[0, 1, 2, 4]), day(0), day(4)).unwrap();
        assert_eq!(stats.current_streak, 1);
        assert_eq!(stats.best_streak, 3);
        assert_eq!(stats.total_completions, 4);
        assert!((stats.completion_rate - 0.8).abs() < f64::EPSILON);
    }

    #[test]
    fn test_today_in_progress_keeps_yesterdays_streak() {
        let stats = daily().compute(&done(&[1, 2, 3]), day(0), day(4)).unwrap();
        assert_eq!(stats.current_streak, 3);
    }

    #[test]
    fn test_unlogged_days_anchor_at_latest_log() {
        let stats = daily().compute(&done(&[1, 2, 3]), day(0), day(6)).unwrap();
        assert_eq!(stats.current_streak, 3);
        assert_eq!(stats.best_streak, 3);
    }

    #[test]
    fn test_incomplete_log_today_ends_streak() {
        let mut marks = done(&[0, 1, 2, 3]);
        marks.push(DayMark::new(day(4), false));
        let stats = daily().compute(&marks, day(0), day(4)).unwrap();
        assert_eq!(stats.current_streak, 0);
        assert_eq!(stats.best_streak, 4);
        assert_eq!(stats.total_completions, 4);
    }

    #[test]
    fn test_future_log_does_not_move_anchor() {
        let mut marks = done(&[0, 1]);
        marks.push(DayMark::new(day(3), false));
        let stats = daily().compute(&marks, day(0), day(2)).unwrap();
        assert_eq!(stats.current_streak, 2);
    }

    #[test]
    fn test_not_completed_log_is_a_gap() {
        let mut marks = done(&[0, 1, 3]);
        marks.push(DayMark::new(day(2), false));
        let stats = daily().compute(&marks, day(0), day(3)).unwrap();
        assert_eq!(stats.current_streak, 1);
        assert_eq!(stats.best_streak, 2);
        assert_eq!(stats.total_completions, 3);
    }

    #[test]
    fn test_future_logs_are_ignored() {
        let stats = daily().compute(&done(&[0, 1, 9]), day(0), day(1)).unwrap();
        assert_eq!(stats.current_streak, 2);
        assert_eq!(stats.total_completions, 2);
        assert_eq!(stats.completion_rate, 1.0);
    }

    #[test]
    fn test_input_order_does_not_matter() {
        let in_order = daily().compute(&done(&[0, 1, 2, 3]), day(0), day(3)).unwrap();
        let backfilled = daily().compute(&done(&[3, 0, 2, 1]), day(0), day(3)).unwrap();
        assert_eq!(in_order, backfilled);
    }

    #[test]
    fn test_duplicate_day_is_rejected() {
        let marks = vec![DayMark::new(day(1), true), DayMark::new(day(1), false)];
        assert_eq!(
            daily().compute(&marks, day(0), day(2)),
            Err(StatsError::DuplicateDay(day(1)))
        );
    }

    #[test]
    fn test_logs_before_creation_extend_the_window() {
        let stats = daily().compute(&done(&[0, 1]), day(1), day(1)).unwrap();
        assert_eq!(stats.completion_rate, 1.0);
    }

    #[test]
    fn test_weekly_streak_counts_weeks() {
        let engine = StreakEngine::new(HabitFrequency::Weekly, 1);
        // weeks 0, 1, 2 each have one completion; week 3 has none yet
        let stats = engine.compute(&done(&[2, 8, 20]), day(0), day(22)).unwrap();
        assert_eq!(stats.current_streak, 3);
        assert_eq!(stats.best_streak, 3);
        assert_eq!(stats.total_completions, 3);
        assert!((stats.completion_rate - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn test_weekly_gap_week_breaks_streak() {
        let engine = StreakEngine::new(HabitFrequency::Weekly, 1);
        let stats = engine.compute(&done(&[0, 15, 22]), day(0), day(22)).unwrap();
        assert_eq!(stats.current_streak, 2);
        assert_eq!(stats.best_streak, 2);
    }

    #[test]
    fn test_custom_needs_target_days_per_week() {
        let engine = StreakEngine::new(HabitFrequency::Custom, 3);
        // week 0: 3 days (qualifies), week 1: 2 days so far (does not)
        let stats = engine.compute(&done(&[0, 2, 4, 7, 9]), day(0), day(10)).unwrap();
        assert_eq!(stats.best_streak, 1);
        assert_eq!(stats.current_streak, 0);
        assert_eq!(stats.total_completions, 5);

        // nothing logged this week yet: anchored at week 0
        let stats = engine.compute(&done(&[0, 2, 4]), day(0), day(10)).unwrap();
        assert_eq!(stats.current_streak, 1);
        assert_eq!(stats.total_completions, 5);
    }

    #[test]
    fn test_streak_invariants_hold() {
        let histories: Vec<Vec<i64>> = vec![
            vec![],
            vec![5],
            vec![0, 1, 2, 3, 4, 5, 6],
            vec![0, 2, 4, 6, 8],
            vec![1, 2, 3, 10, 11, 12, 13, 20],
        ];
        for frequency in [HabitFrequency::Daily, HabitFrequency::Weekly, HabitFrequency::Custom] {
            let engine = StreakEngine::new(frequency, 2);
            for days in &histories {
                let stats = engine.compute(&done(days), day(0), day(21)).unwrap();
                assert!(stats.current_streak <= stats.best_streak, "{frequency} {days:?}");
                assert!(stats.best_streak <= stats.total_completions, "{frequency} {days:?}");
                assert!((0.0..=1.0).contains(&stats.completion_rate));
            }
        }
    }

    #[test]
    fn test_weekly_rollup_caps_each_habit() {
        let mut rollup = WeeklyRollup::default();
        rollup.record(HabitFrequency::Daily, 7, &done(&[4, 5, 6]), day(6));
        rollup.record(HabitFrequency::Weekly, 1, &done(&[1, 2, 3]), day(6));
        assert_eq!(rollup.completed, 4);
        assert_eq!(rollup.expected, 8);
        assert!((rollup.rate() - 0.5).abs() < f64::EPSILON);
        assert_eq!(WeeklyRollup::default().rate(), 0.0);
    }
}
