//! SQLite Habit Store Implementation
//!
//! This module implements the HabitStore trait using SQLite as the backend.
//!
//! ## Usage
//!
//! ### File-Based
//! ```ignore
//! use lifeflow_store::{SqliteHabitStore, HabitStore};
//!
//! // Creates lifeflow.db (or opens it if it exists)
//! let store = SqliteHabitStore::new("lifeflow.db").await?;
//! ```
//!
//! ### In-Memory (Testing)
//! ```ignore
//! let store = SqliteHabitStore::new_in_memory().await?;
//! ```
//!
//! ## Implementation Details
//!
//! ### Connection Pool
//! - File databases use a pool of 10 connections in WAL mode with a busy
//!   timeout, so concurrent writers queue instead of failing
//! - In-memory databases use a single long-lived connection: every SQLite
//!   connection to `:memory:` would otherwise see its own empty database
//!
//! ### Migrations
//! - Run automatically on startup via `sqlx::migrate!("./migrations")`
//!
//! ### Upsert
//! - `INSERT ... SELECT ... FROM habits WHERE id = ? AND user_id = ?` performs
//!   the ownership check inside the write statement
//! - `ON CONFLICT(habit_id, logged_date) DO UPDATE` turns a second write for
//!   the same day into an overwrite
//! - `RETURNING` hands back the resulting row; no row means the habit is not
//!   the caller's
//!
//! ### Dates
//! - `logged_date` is stored as ISO-8601 TEXT (`YYYY-MM-DD`), which sorts and
//!   compares correctly as a string

use crate::{
    error::{conflict_or, Result, StoreError},
    new_id, now_ms,
    types::*,
    HabitStore,
};
use async_trait::async_trait;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteRow,
};
use sqlx::{QueryBuilder, Row, Sqlite};
use std::str::FromStr;
use std::time::Duration;

const HABIT_COLUMNS: &str = "id, user_id, name, description, category, frequency, target_days, color, icon, created_at, updated_at";
const LOG_COLUMNS: &str =
    "id, habit_id, user_id, logged_date, completed, notes, intensity, created_at";

/// SQLite-based habit store implementation
pub struct SqliteHabitStore {
    pool: SqlitePool,
}

impl SqliteHabitStore {
    /// Open (or create) a SQLite database.
    ///
    /// Accepts either a `sqlite:` URL or a plain file path.
    pub async fn new(path: &str) -> Result<Self> {
        let url = if path.starts_with("sqlite:") {
            path.to_string()
        } else {
            format!("sqlite://{}", path)
        };

        let options = SqliteConnectOptions::from_str(&url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(10)
            .connect_with(options)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create in-memory database (for testing)
    pub async fn new_in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    async fn ensure_owned(&self, habit_id: &str, user_id: &str) -> Result<()> {
        let row = sqlx::query("SELECT 1 FROM habits WHERE id = ? AND user_id = ?")
            .bind(habit_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound(habit_id.to_string())),
        }
    }
}

fn corrupt(e: impl std::fmt::Display) -> StoreError {
    StoreError::CorruptRow(e.to_string())
}

fn habit_from_row(row: &SqliteRow) -> Result<Habit> {
    let category: String = row.try_get("category")?;
    let frequency: String = row.try_get("frequency")?;
    let target_days: i64 = row.try_get("target_days")?;

    Ok(Habit {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        category: category.parse().map_err(corrupt)?,
        frequency: frequency.parse().map_err(corrupt)?,
        target_days: u32::try_from(target_days).map_err(corrupt)?,
        color: row.try_get("color")?,
        icon: row.try_get("icon")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn log_from_row(row: &SqliteRow) -> Result<HabitLog> {
    let intensity: i64 = row.try_get("intensity")?;

    Ok(HabitLog {
        id: row.try_get("id")?,
        habit_id: row.try_get("habit_id")?,
        user_id: row.try_get("user_id")?,
        logged_date: row.try_get("logged_date")?,
        completed: row.try_get("completed")?,
        notes: row.try_get("notes")?,
        intensity: u8::try_from(intensity).map_err(corrupt)?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl HabitStore for SqliteHabitStore {
    async fn create_habit(&self, user_id: &str, habit: NewHabit) -> Result<Habit> {
        habit.validate()?;

        let id = new_id();
        let now = now_ms();

        sqlx::query(
            r#"
            INSERT INTO habits (id, user_id, name, description, category, frequency, target_days, color, icon, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(user_id)
        .bind(&habit.name)
        .bind(&habit.description)
        .bind(habit.category.as_str())
        .bind(habit.frequency.as_str())
        .bind(habit.target_days as i64)
        .bind(&habit.color)
        .bind(&habit.icon)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| conflict_or(e, &id))?;

        Ok(Habit {
            id,
            user_id: user_id.to_string(),
            name: habit.name,
            description: habit.description,
            category: habit.category,
            frequency: habit.frequency,
            target_days: habit.target_days,
            color: habit.color,
            icon: habit.icon,
            created_at: now,
            updated_at: now,
        })
    }

    async fn get_habit(&self, habit_id: &str, user_id: &str) -> Result<Option<Habit>> {
        let row = sqlx::query(&format!(
            "SELECT {HABIT_COLUMNS} FROM habits WHERE id = ? AND user_id = ?"
        ))
        .bind(habit_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(habit_from_row).transpose()
    }

    async fn update_habit(
        &self,
        habit_id: &str,
        user_id: &str,
        update: HabitUpdate,
    ) -> Result<Habit> {
        update.validate()?;

        let row = sqlx::query(&format!(
            r#"
            UPDATE habits
            SET name = COALESCE(?, name),
                description = COALESCE(?, description),
                category = COALESCE(?, category),
                frequency = COALESCE(?, frequency),
                target_days = COALESCE(?, target_days),
                color = COALESCE(?, color),
                icon = COALESCE(?, icon),
                updated_at = ?
            WHERE id = ? AND user_id = ?
            RETURNING {HABIT_COLUMNS}
            "#
        ))
        .bind(&update.name)
        .bind(&update.description)
        .bind(update.category.map(|c| c.as_str()))
        .bind(update.frequency.map(|f| f.as_str()))
        .bind(update.target_days.map(i64::from))
        .bind(&update.color)
        .bind(&update.icon)
        .bind(now_ms())
        .bind(habit_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => habit_from_row(&row),
            None => Err(StoreError::NotFound(habit_id.to_string())),
        }
    }

    async fn delete_habit(&self, habit_id: &str, user_id: &str) -> Result<()> {
        let rows_affected = sqlx::query("DELETE FROM habits WHERE id = ? AND user_id = ?")
            .bind(habit_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if rows_affected == 0 {
            return Err(StoreError::NotFound(habit_id.to_string()));
        }

        Ok(())
    }

    async fn list_habits(&self, user_id: &str) -> Result<Vec<Habit>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {HABIT_COLUMNS}
            FROM habits
            WHERE user_id = ?
            ORDER BY created_at DESC, rowid DESC
            "#
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(habit_from_row).collect()
    }

    async fn upsert_log(&self, entry: LogUpsert) -> Result<HabitLog> {
        let intensity = entry.effective_intensity()?;

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO habit_logs (id, habit_id, user_id, logged_date, completed, notes, intensity, created_at)
            SELECT ?, h.id, h.user_id, ?, ?, ?, ?, ?
            FROM habits h
            WHERE h.id = ? AND h.user_id = ?
            ON CONFLICT(habit_id, logged_date)
            DO UPDATE SET
                completed = excluded.completed,
                notes = excluded.notes,
                intensity = excluded.intensity
            RETURNING {LOG_COLUMNS}
            "#
        ))
        .bind(new_id())
        .bind(entry.logged_date)
        .bind(entry.completed)
        .bind(&entry.notes)
        .bind(intensity as i64)
        .bind(now_ms())
        .bind(&entry.habit_id)
        .bind(&entry.user_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => log_from_row(&row),
            None => Err(StoreError::NotFound(entry.habit_id)),
        }
    }

    async fn list_logs(
        &self,
        habit_id: &str,
        user_id: &str,
        range: DateRange,
    ) -> Result<Vec<HabitLog>> {
        self.ensure_owned(habit_id, user_id).await?;

        let mut query = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {LOG_COLUMNS} FROM habit_logs WHERE habit_id = "
        ));
        query.push_bind(habit_id);
        query.push(" AND user_id = ");
        query.push_bind(user_id);
        if let Some(start) = range.start {
            query.push(" AND logged_date >= ");
            query.push_bind(start);
        }
        if let Some(end) = range.end {
            query.push(" AND logged_date <= ");
            query.push_bind(end);
        }
        query.push(" ORDER BY logged_date DESC");

        let rows = query.build().fetch_all(&self.pool).await?;

        rows.iter().map(log_from_row).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use lifeflow_core::{HabitCategory, HabitFrequency};

    async fn setup_test_store() -> SqliteHabitStore {
        SqliteHabitStore::new_in_memory().await.unwrap()
    }

    fn day(n: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, n).unwrap()
    }

    fn entry(habit_id: &str, user_id: &str, date: NaiveDate, completed: bool) -> LogUpsert {
        LogUpsert {
            habit_id: habit_id.to_string(),
            user_id: user_id.to_string(),
            logged_date: date,
            completed,
            notes: None,
            intensity: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_get_habit() {
        let store = setup_test_store().await;

        let habit = store
            .create_habit(
                "alice",
                NewHabit::new("Meditate", HabitCategory::Mindfulness, HabitFrequency::Daily),
            )
            .await
            .unwrap();

        let fetched = store.get_habit(&habit.id, "alice").await.unwrap().unwrap();
        assert_eq!(fetched, habit);
        assert_eq!(fetched.target_days, DEFAULT_TARGET_DAYS);

        // Another user cannot see it
        assert!(store.get_habit(&habit.id, "bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_second_log_for_same_day_overwrites() {
        let store = setup_test_store().await;
        let habit = store
            .create_habit(
                "alice",
                NewHabit::new("Run", HabitCategory::Fitness, HabitFrequency::Daily),
            )
            .await
            .unwrap();

        let first = store
            .upsert_log(entry(&habit.id, "alice", day(5), false))
            .await
            .unwrap();
        let mut again = entry(&habit.id, "alice", day(5), true);
        again.notes = Some("10k".to_string());
        again.intensity = Some(5);
        let second = store.upsert_log(again).await.unwrap();

        assert_eq!(first.id, second.id);
        assert!(second.completed);
        assert_eq!(second.intensity, 5);
        assert_eq!(second.notes.as_deref(), Some("10k"));

        let logs = store
            .list_logs(&habit.id, "alice", DateRange::default())
            .await
            .unwrap();
        assert_eq!(logs.len(), 1);
        assert!(logs[0].completed);
    }

    #[tokio::test]
    async fn test_upsert_for_foreign_habit_is_not_found() {
        let store = setup_test_store().await;
        let habit = store
            .create_habit(
                "alice",
                NewHabit::new("Run", HabitCategory::Fitness, HabitFrequency::Daily),
            )
            .await
            .unwrap();

        let result = store.upsert_log(entry(&habit.id, "mallory", day(1), true)).await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));

        let logs = store
            .list_logs(&habit.id, "alice", DateRange::default())
            .await
            .unwrap();
        assert!(logs.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_intensity_rejected_before_write() {
        let store = setup_test_store().await;
        let habit = store
            .create_habit(
                "alice",
                NewHabit::new("Run", HabitCategory::Fitness, HabitFrequency::Daily),
            )
            .await
            .unwrap();

        let mut bad = entry(&habit.id, "alice", day(1), true);
        bad.intensity = Some(9);
        assert!(matches!(
            store.upsert_log(bad).await,
            Err(StoreError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_cascades_logs() {
        let store = setup_test_store().await;
        let habit = store
            .create_habit(
                "alice",
                NewHabit::new("Run", HabitCategory::Fitness, HabitFrequency::Daily),
            )
            .await
            .unwrap();
        store
            .upsert_log(entry(&habit.id, "alice", day(1), true))
            .await
            .unwrap();

        assert!(matches!(
            store.delete_habit(&habit.id, "bob").await,
            Err(StoreError::NotFound(_))
        ));
        store.delete_habit(&habit.id, "alice").await.unwrap();

        let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM habit_logs")
            .fetch_one(&store.pool)
            .await
            .unwrap();
        assert_eq!(remaining, 0);
    }
}
