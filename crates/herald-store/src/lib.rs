//! `herald-store` — SQLite persistence for reminder records.
//!
//! The [`ReminderStore`] handle wraps a shared connection and exposes the
//! CRUD surface used by the Telegram command path plus the two operations
//! the sweep relies on: the candidate query and the idempotent sent-flag
//! update.

pub mod db;
pub mod error;
pub mod store;

pub use error::{Result, StoreError};
pub use store::{ReminderField, ReminderStore};
