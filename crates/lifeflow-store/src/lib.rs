//! LifeFlow Habit Store
//!
//! This crate implements the persistence contract for habits and their per-day
//! logs: the time series the streak engine reads from.
//!
//! ## What Gets Stored
//!
//! - **Habits**: name, category, frequency policy, presentation, owner
//! - **Habit logs**: one row per (habit, calendar day), holding whether the
//!   habit was completed that day, optional notes and an intensity (1-5)
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │   HTTP handlers  │
//! └────────┬─────────┘
//!          │ user id + request
//!          ▼
//! ┌──────────────────┐     ┌──────────────────────┐
//! │ Ingestion /      │ ──→ │ TimeoutStore         │  bounded calls
//! │ Aggregator       │     └──────────┬───────────┘
//! └──────────────────┘                │
//!                          ┌──────────▼───────────┐
//!                          │ SqliteHabitStore /   │
//!                          │ PostgresHabitStore   │
//!                          └──────────────────────┘
//! ```
//!
//! ## Usage Example
//!
//! ```ignore
//! use lifeflow_store::{HabitStore, LogUpsert, NewHabit, SqliteHabitStore};
//! use lifeflow_core::{HabitCategory, HabitFrequency};
//!
//! let store = SqliteHabitStore::new("lifeflow.db").await?;
//!
//! let habit = store
//!     .create_habit("user-1", NewHabit::new("Read", HabitCategory::Learning, HabitFrequency::Daily))
//!     .await?;
//!
//! // Logging the same day twice leaves one row holding the latest values
//! store.upsert_log(LogUpsert { completed: false, ..entry.clone() }).await?;
//! store.upsert_log(LogUpsert { completed: true, ..entry }).await?;
//! ```
//!
//! ## Ownership
//!
//! Every read and write takes the caller's user id. A habit owned by someone
//! else behaves exactly like a habit that does not exist (`NotFound`).
//!
//! ## Concurrency
//!
//! - Backends hold an SQLx connection pool and are safe to share via `Arc<>`
//! - The (habit, day) uniqueness constraint plus `ON CONFLICT DO UPDATE`
//!   guarantees that racing writes for one day converge to a single row; the
//!   last committed write wins
//! - Writes for different days need no coordination

pub mod error;
pub mod store;
pub mod timeout;
pub mod types;

#[cfg(feature = "postgres")]
pub mod postgres;

pub use error::{Result, StoreError};
pub use store::SqliteHabitStore;
pub use timeout::TimeoutStore;
pub use types::*;

#[cfg(feature = "postgres")]
pub use postgres::PostgresHabitStore;

use async_trait::async_trait;

/// Habit store trait - abstracts over storage backends.
///
/// ## Implementations
///
/// - **SqliteHabitStore**: embedded, single node, used in tests and development
/// - **PostgresHabitStore**: shared server deployments (feature `postgres`)
/// - **TimeoutStore**: decorator that bounds every call of another store
///
/// ## Error Handling
///
/// - `NotFound`: habit absent or owned by another user
/// - `InvalidInput`: intensity outside 1-5, target days below 1, empty name
/// - `Unavailable`: time budget exceeded, pool exhausted
/// - `DatabaseError`: any other backend failure
#[async_trait]
pub trait HabitStore: Send + Sync {
    // ============================================================
    // HABIT OPERATIONS
    // ============================================================

    /// Create a habit owned by `user_id`.
    ///
    /// # Errors
    ///
    /// - `InvalidInput`: empty name or `target_days < 1`
    /// - `Conflict`: generated id collided with an existing habit
    async fn create_habit(&self, user_id: &str, habit: NewHabit) -> Result<Habit>;

    /// Get a habit if it exists and belongs to `user_id`.
    async fn get_habit(&self, habit_id: &str, user_id: &str) -> Result<Option<Habit>>;

    /// Apply a partial update and return the stored result.
    ///
    /// # Errors
    ///
    /// - `NotFound`: habit absent or not owned by `user_id`
    /// - `InvalidInput`: update violates a habit rule
    async fn update_habit(
        &self,
        habit_id: &str,
        user_id: &str,
        update: HabitUpdate,
    ) -> Result<Habit>;

    /// Delete a habit. Its logs are removed with it (cascade).
    ///
    /// # Errors
    ///
    /// - `NotFound`: habit absent or not owned by `user_id`
    async fn delete_habit(&self, habit_id: &str, user_id: &str) -> Result<()>;

    /// List a user's habits, newest first.
    async fn list_habits(&self, user_id: &str) -> Result<Vec<Habit>>;

    // ============================================================
    // LOG OPERATIONS
    // ============================================================

    /// Insert the log for (habit, day) or overwrite the existing one.
    ///
    /// The ownership check and the write are a single statement, so there is
    /// no window in which a habit can change hands between them. Concurrent
    /// calls for the same key leave exactly one row; its values come from
    /// whichever statement committed last.
    ///
    /// # Returns
    ///
    /// The stored row after the write.
    ///
    /// # Errors
    ///
    /// - `NotFound`: habit absent or not owned by `entry.user_id`
    /// - `InvalidInput`: intensity outside 1-5
    async fn upsert_log(&self, entry: LogUpsert) -> Result<HabitLog>;

    /// List a habit's logs, newest day first, optionally within an inclusive range.
    ///
    /// # Errors
    ///
    /// - `NotFound`: habit absent or not owned by `user_id`
    async fn list_logs(
        &self,
        habit_id: &str,
        user_id: &str,
        range: DateRange,
    ) -> Result<Vec<HabitLog>>;
}

pub(crate) fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
