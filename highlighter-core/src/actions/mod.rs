//! Action implementations for interval editing
//!
//! This module contains all the concrete action types that can be executed
//! through the action system.

pub mod clean_intervals;
pub mod delete_interval;
pub mod insert_interval;
pub mod insert_intervals;

pub use clean_intervals::CleanIntervalsAction;
pub use delete_interval::DeleteIntervalAction;
pub use insert_interval::InsertIntervalAction;
pub use insert_intervals::InsertIntervalsAction;
