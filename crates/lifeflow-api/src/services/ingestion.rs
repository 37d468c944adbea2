//! Log Ingestion
//!
//! Records one day's completion event for a habit:
//!
//! 1. Validate the payload (date parseable, intensity 1-5). Nothing reaches
//!    the store when this fails.
//! 2. Upsert keyed by (habit, day). The ownership check happens inside the
//!    same statement, so a foreign or unknown habit is `NotFound`.
//!
//! A day moves from "no log" to "logged" on the first write and stays logged;
//! repeat writes overwrite `completed`, `notes` and `intensity`. Dates in the
//! future are accepted and only start counting once they arrive.

use lifeflow_store::{validate_intensity, HabitLog, HabitStore, LogUpsert};
use std::sync::Arc;

use crate::error::{ApiError, ApiResult};
use crate::models::{parse_day, LogHabitRequest};

#[derive(Clone)]
pub struct LogIngestion {
    store: Arc<dyn HabitStore>,
}

impl LogIngestion {
    pub fn new(store: Arc<dyn HabitStore>) -> Self {
        Self { store }
    }

    /// Validate and record a log for `habit_id` on behalf of `user_id`.
    pub async fn record(
        &self,
        user_id: &str,
        habit_id: &str,
        request: LogHabitRequest,
    ) -> ApiResult<HabitLog> {
        let entry = Self::validate(user_id, habit_id, request)?;
        let log = self.store.upsert_log(entry).await?;

        tracing::debug!(
            habit_id,
            user_id,
            logged_date = %log.logged_date,
            completed = log.completed,
            "habit log recorded"
        );

        Ok(log)
    }

    /// Turn a request into a store entry, rejecting bad dates and intensities.
    pub fn validate(user_id: &str, habit_id: &str, request: LogHabitRequest) -> ApiResult<LogUpsert> {
        let logged_date = parse_day(&request.logged_date).ok_or_else(|| {
            ApiError::InvalidInput(format!(
                "loggedDate is not a valid date: {}",
                request.logged_date
            ))
        })?;

        let intensity = request
            .intensity
            .map(|value| {
                let value = u8::try_from(value).map_err(|_| {
                    ApiError::InvalidInput(format!(
                        "intensity must be between 1 and 5, got {}",
                        value
                    ))
                })?;
                validate_intensity(value).map_err(ApiError::from)
            })
            .transpose()?;

        Ok(LogUpsert {
            habit_id: habit_id.to_string(),
            user_id: user_id.to_string(),
            logged_date,
            completed: request.completed,
            notes: request.notes,
            intensity,
        })
    }
}
