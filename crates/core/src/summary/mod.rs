//! Expense summaries.
//!
//! # Modules
//!
//! - `types` - Summaries, snapshots and triggers
//! - `period` - Reporting window resolution
//! - `engine` - Aggregation and persistence
//! - `query` - Paginated reads

pub mod engine;
pub mod error;
pub mod period;
pub mod query;
pub mod types;

#[cfg(test)]
mod period_props;

pub use engine::SummaryEngine;
pub use error::SummaryError;
pub use period::{period_start, resolve_window};
pub use query::SummaryQueryService;
pub use types::{DateRange, ExpenseSnapshot, Summary, SummaryView, TriggerType};
