//! Habit analytics services
//!
//! - [`HabitAggregator`]: per-habit statistics and the dashboard view, always
//!   recomputed from the store
//! - [`LogIngestion`]: validates and records one day's completion event

pub mod aggregator;
pub mod ingestion;

pub use aggregator::{Dashboard, HabitAggregator, HabitReport};
pub use ingestion::LogIngestion;
