//! `herald-sweep` — due-reminder detection and delivery.
//!
//! # Overview
//!
//! One sweep is a single pass over the reminder table, triggered from the
//! outside (the HTTP endpoint or the dev timer — the crate owns no timer of
//! its own):
//!
//! 1. [`sweep::SweepRunner`] fetches candidate rows from the store
//! 2. [`window::due_buckets`] picks the (reminder, bucket) pairs whose
//!    tolerance window contains the current instant
//! 3. [`dispatch::Dispatcher`] renders and pushes one message per pair
//! 4. each successful push is followed by the store's idempotent sent-flag
//!    update, so the pair is excluded from every later sweep
//!
//! Per-pair failures are collected in the [`sweep::SweepReport`]; only a
//! failed candidate fetch aborts a sweep.

pub mod dispatch;
pub mod error;
pub mod sweep;
pub mod window;

pub use dispatch::{Dispatcher, MessageTransport};
pub use error::{DispatchError, SweepError, TransportError};
pub use sweep::{EventStore, FailureStage, SweepFailure, SweepReport, SweepRunner};
