//! Core domain logic for the time tracker.
//!
//! This crate contains the fundamental types and logic for:
//! - Time entries: the records fetched from the tracking service
//! - Short-entry filtering and wire timestamp formatting
//! - Logging: a leveled logger that republishes messages to observers

pub mod log;
mod time_entry;

pub use log::{LogBackend, LogLevel, Logger, SubscriptionId, TracingBackend, UnknownLogLevel};
pub use time_entry::{
    MIN_ENTRY_DURATION_SECS, TimeEntry, filter_short_entries, format_wire_timestamp,
};
