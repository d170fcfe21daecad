#![forbid(unsafe_code)]

//! Core domain model and business logic for the Fitlog workout log.
//!
//! This crate provides:
//! - Domain types (exercise records, categories, intensity levels)
//! - The durable record store (CRUD, filtered listing)
//! - Derived statistics (totals, weekly/monthly counts, streaks)
//! - Export/import exchange format with merge deduplication

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod slot;
pub mod store;
pub mod stats;
pub mod exchange;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::{Config, WeekStart};
pub use slot::JsonSlot;
pub use store::ExerciseStore;
pub use stats::{compute_stats, streaks};
pub use exchange::{export_json, parse_payload, write_csv, TransportPayload, EXPORT_VERSION};
