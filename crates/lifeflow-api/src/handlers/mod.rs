//! API request handlers

pub mod analytics;
pub mod habits;
pub mod health;
