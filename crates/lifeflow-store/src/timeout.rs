//! Bounded Store Calls
//!
//! [`TimeoutStore`] wraps another [`HabitStore`] and puts an upper bound on
//! every call. A call that does not finish in time fails with
//! [`StoreError::Unavailable`] instead of hanging the request.
//!
//! ## Writes Outlive Their Callers
//!
//! Writes (`create_habit`, `update_habit`, `delete_habit`, `upsert_log`) run
//! on a spawned task. If the HTTP client disconnects, or the caller stops
//! waiting after the timeout, the statement already sent to the database
//! still runs to completion. A write is therefore never cut off halfway, and
//! the (habit, day) key always ends up with at most one row.
//!
//! Reads are awaited in place and simply dropped when abandoned.
//!
//! ## Usage Example
//!
//! ```ignore
//! use std::{sync::Arc, time::Duration};
//! use lifeflow_store::{SqliteHabitStore, TimeoutStore};
//!
//! let sqlite = Arc::new(SqliteHabitStore::new("lifeflow.db").await?);
//! let store = TimeoutStore::new(sqlite, Duration::from_secs(5));
//! ```

use crate::{
    error::{Result, StoreError},
    types::*,
    HabitStore,
};
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Decorator that bounds every call of the wrapped store.
#[derive(Clone)]
pub struct TimeoutStore {
    inner: Arc<dyn HabitStore>,
    timeout: Duration,
}

impl TimeoutStore {
    pub fn new(inner: Arc<dyn HabitStore>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn timed_out(&self, operation: &'static str) -> StoreError {
        let timeout_ms = self.timeout.as_millis() as u64;
        tracing::warn!(operation, timeout_ms, "store call timed out");
        StoreError::Unavailable(format!("{} timed out after {}ms", operation, timeout_ms))
    }

    async fn read<T, F>(&self, operation: &'static str, call: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(self.timed_out(operation)),
        }
    }

    async fn write<T, F>(&self, operation: &'static str, call: F) -> Result<T>
    where
        F: Future<Output = Result<T>> + Send + 'static,
        T: Send + 'static,
    {
        let handle = tokio::spawn(call);
        match tokio::time::timeout(self.timeout, handle).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => Err(StoreError::Unavailable(format!(
                "{} did not complete: {}",
                operation, e
            ))),
            Err(_) => Err(self.timed_out(operation)),
        }
    }
}

#[async_trait]
impl HabitStore for TimeoutStore {
    async fn create_habit(&self, user_id: &str, habit: NewHabit) -> Result<Habit> {
        let inner = self.inner.clone();
        let user_id = user_id.to_string();
        self.write("create_habit", async move {
            inner.create_habit(&user_id, habit).await
        })
        .await
    }

    async fn get_habit(&self, habit_id: &str, user_id: &str) -> Result<Option<Habit>> {
        self.read("get_habit", self.inner.get_habit(habit_id, user_id))
            .await
    }

    async fn update_habit(
        &self,
        habit_id: &str,
        user_id: &str,
        update: HabitUpdate,
    ) -> Result<Habit> {
        let inner = self.inner.clone();
        let habit_id = habit_id.to_string();
        let user_id = user_id.to_string();
        self.write("update_habit", async move {
            inner.update_habit(&habit_id, &user_id, update).await
        })
        .await
    }

    async fn delete_habit(&self, habit_id: &str, user_id: &str) -> Result<()> {
        let inner = self.inner.clone();
        let habit_id = habit_id.to_string();
        let user_id = user_id.to_string();
        self.write("delete_habit", async move {
            inner.delete_habit(&habit_id, &user_id).await
        })
        .await
    }

    async fn list_habits(&self, user_id: &str) -> Result<Vec<Habit>> {
        self.read("list_habits", self.inner.list_habits(user_id))
            .await
    }

    async fn upsert_log(&self, entry: LogUpsert) -> Result<HabitLog> {
        let inner = self.inner.clone();
        self.write("upsert_log", async move { inner.upsert_log(entry).await })
            .await
    }

    async fn list_logs(
        &self,
        habit_id: &str,
        user_id: &str,
        range: DateRange,
    ) -> Result<Vec<HabitLog>> {
        self.read("list_logs", self.inner.list_logs(habit_id, user_id, range))
            .await
    }
}
