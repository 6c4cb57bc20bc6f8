//! The sweep orchestrator: fetch → evaluate → dispatch → mark.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use herald_core::reminder::{Bucket, BucketSpec, Reminder};
use herald_store::{ReminderStore, StoreError};

use crate::dispatch::{Dispatcher, MessageTransport};
use crate::error::SweepError;
use crate::window;

/// The two store operations a sweep needs. Implemented by
/// [`ReminderStore`] and by in-memory fakes in tests.
pub trait EventStore {
    fn fetch_candidates(&self, today: NaiveDate) -> Result<Vec<Reminder>, StoreError>;
    fn mark_bucket_sent(&self, id: i64, bucket: Bucket) -> Result<(), StoreError>;
}

impl EventStore for ReminderStore {
    fn fetch_candidates(&self, today: NaiveDate) -> Result<Vec<Reminder>, StoreError> {
        ReminderStore::fetch_candidates(self, today)
    }

    fn mark_bucket_sent(&self, id: i64, bucket: Bucket) -> Result<(), StoreError> {
        ReminderStore::mark_bucket_sent(self, id, bucket)
    }
}

/// Which step of a pair's processing failed.
///
/// `Mark` is the nastier case: the message already went out, so an unset
/// flag means a possible duplicate on the next tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    Dispatch,
    Mark,
}

/// One failed (reminder, bucket) pair.
#[derive(Debug, Clone, Serialize)]
pub struct SweepFailure {
    #[serde(rename = "id")]
    pub reminder_id: i64,
    pub bucket: Bucket,
    pub stage: FailureStage,
    pub reason: String,
}

/// Aggregate outcome of one sweep. Partial failure is still a completed
/// sweep — only a failed fetch surfaces as `Err` from [`SweepRunner::run`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct SweepReport {
    /// Candidate rows considered this tick.
    pub total_processed: usize,
    /// Successful dispatches (messages that actually went out).
    pub reminders_sent: usize,
    pub failures: Vec<SweepFailure>,
}

/// Drives one sweep per invocation. Holds its collaborators as explicit
/// injected dependencies; keeps no state between runs — everything
/// persistent lives in the store's sent flags, which is what makes an
/// immediate re-run a no-op.
pub struct SweepRunner<S, T> {
    store: S,
    dispatcher: Dispatcher<T>,
    specs: Vec<BucketSpec>,
    tz: Tz,
}

impl<S: EventStore, T: MessageTransport> SweepRunner<S, T> {
    pub fn new(store: S, dispatcher: Dispatcher<T>, specs: Vec<BucketSpec>, tz: Tz) -> Self {
        Self {
            store,
            dispatcher,
            specs,
            tz,
        }
    }

    /// Run one sweep at `now`.
    ///
    /// Pairs are processed sequentially; one pair's failure is recorded and
    /// never blocks the rest. The sent flag is set strictly after its own
    /// successful dispatch.
    pub async fn run(&self, now: DateTime<Utc>) -> Result<SweepReport, SweepError> {
        let today = now.with_timezone(&self.tz).date_naive();
        let candidates = self
            .store
            .fetch_candidates(today)
            .map_err(SweepError::Fetch)?;

        let mut report = SweepReport {
            total_processed: candidates.len(),
            ..Default::default()
        };

        let mut worklist: Vec<(&Reminder, Bucket)> = Vec::new();
        for reminder in &candidates {
            let Some(target) = reminder.target_instant(self.tz) else {
                warn!(
                    reminder_id = reminder.id,
                    date = %reminder.event_date,
                    time = %reminder.event_time,
                    "target not representable in configured zone — skipping"
                );
                continue;
            };
            for bucket in window::due_buckets(reminder, target, now, &self.specs) {
                worklist.push((reminder, bucket));
            }
        }
        debug!(
            candidates = candidates.len(),
            pairs = worklist.len(),
            "sweep worklist built"
        );

        for (reminder, bucket) in worklist {
            match self.dispatcher.dispatch(reminder, bucket).await {
                Ok(()) => {
                    report.reminders_sent += 1;
                    if let Err(e) = self.store.mark_bucket_sent(reminder.id, bucket) {
                        error!(
                            reminder_id = reminder.id,
                            bucket = %bucket,
                            error = %e,
                            "notification sent but flag update failed — duplicate possible next sweep"
                        );
                        report.failures.push(SweepFailure {
                            reminder_id: reminder.id,
                            bucket,
                            stage: FailureStage::Mark,
                            reason: e.to_string(),
                        });
                    }
                }
                Err(e) => {
                    warn!(
                        reminder_id = reminder.id,
                        bucket = %bucket,
                        error = %e,
                        "dispatch failed"
                    );
                    report.failures.push(SweepFailure {
                        reminder_id: reminder.id,
                        bucket,
                        stage: FailureStage::Dispatch,
                        reason: e.to_string(),
                    });
                }
            }
        }

        info!(
            processed = report.total_processed,
            sent = report.reminders_sent,
            failed = report.failures.len(),
            "sweep complete"
        );
        Ok(report)
    }
}
