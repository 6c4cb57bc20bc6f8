//! `herald-core` — configuration, shared errors and domain types.
//!
//! Everything the other herald crates agree on lives here: the
//! [`Reminder`] record, the closed set of notification [`Bucket`]s with
//! their lead-time tuning, and the TOML/env configuration loader.

pub mod config;
pub mod error;
pub mod reminder;

pub use config::HeraldConfig;
pub use error::{HeraldError, Result};
pub use reminder::{Bucket, BucketSpec, Reminder};
