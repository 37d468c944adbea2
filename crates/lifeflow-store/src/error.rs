//! Store Error Types
//!
//! This module defines all error types that can occur during habit store operations.
//!
//! ## Error Categories
//!
//! ### Ownership Errors
//! - `NotFound`: The habit does not exist *or* belongs to another user. The two
//!   cases are deliberately indistinguishable so callers never learn that
//!   somebody else's habit exists.
//!
//! ### Input Errors
//! - `InvalidInput`: A value violates a contract rule (intensity outside 1-5,
//!   target days below 1, empty name)
//! - `Conflict`: A unique key other than the (habit, day) log key was violated
//!
//! ### Availability Errors
//! - `Unavailable`: The store did not answer within its time budget or the
//!   connection pool is exhausted/closed. Safe for clients to retry.
//! - `DatabaseError`: Any other SQLx failure
//! - `MigrationError`: Schema migration failed at start-up
//!
//! ### Data Errors
//! - `CorruptRow`: A stored row could not be turned back into a domain value
//!
//! ## Usage
//!
//! ```ignore
//! use lifeflow_store::{HabitStore, StoreError};
//!
//! match store.list_logs(&habit_id, &user_id, DateRange::default()).await {
//!     Ok(logs) => println!("{} logs", logs.len()),
//!     Err(StoreError::NotFound(_)) => println!("no such habit"),
//!     Err(e) if e.is_retryable() => println!("try again later"),
//!     Err(e) => return Err(e),
//! }
//! ```

use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Habit not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Corrupt row: {0}")]
    CorruptRow(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrationError(String),
}

impl StoreError {
    /// Whether a client may reasonably retry the same call.
    pub fn is_retryable(&self) -> bool {
        match self {
            StoreError::Unavailable(_) => true,
            StoreError::DatabaseError(e) => matches!(
                e,
                sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_)
            ),
            _ => false,
        }
    }
}

impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(e: sqlx::migrate::MigrateError) -> Self {
        StoreError::MigrationError(e.to_string())
    }
}

/// Translate a failed INSERT into `Conflict` when it hit a unique constraint.
pub(crate) fn conflict_or(e: sqlx::Error, what: &str) -> StoreError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_unique_violation() {
            return StoreError::Conflict(what.to_string());
        }
    }
    e.into()
}
