//! Notification dispatch — recipient resolution, message rendering, and
//! the transport seam.

use async_trait::async_trait;

use herald_core::reminder::{Bucket, Reminder};

use crate::error::{DispatchError, TransportError};

/// One-way push into the messaging platform. The production impl lives in
/// `herald-telegram`; tests use in-memory fakes.
#[async_trait]
pub trait MessageTransport: Send + Sync {
    async fn send(&self, recipient: &str, text: &str) -> Result<(), TransportError>;
}

/// Formats and delivers one notification per due (reminder, bucket) pair.
///
/// Never touches sent flags — marking is the orchestrator's job, strictly
/// after a successful send.
pub struct Dispatcher<T> {
    transport: T,
    /// When set, every notification goes here (the supervisor chat)
    /// instead of the reminder's owner.
    fixed_recipient: Option<String>,
}

impl<T: MessageTransport> Dispatcher<T> {
    pub fn new(transport: T, fixed_recipient: Option<String>) -> Self {
        Self {
            transport,
            fixed_recipient,
        }
    }

    /// Deliver the notification for one due pair.
    pub async fn dispatch(&self, reminder: &Reminder, bucket: Bucket) -> Result<(), DispatchError> {
        let recipient = self.recipient(reminder)?;
        let text = render_message(reminder, bucket);
        self.transport.send(recipient, &text).await?;
        Ok(())
    }

    fn recipient<'a>(&'a self, reminder: &'a Reminder) -> Result<&'a str, DispatchError> {
        if let Some(ref fixed) = self.fixed_recipient {
            return Ok(fixed);
        }
        if !reminder.owner_id.is_empty() {
            return Ok(&reminder.owner_id);
        }
        Err(DispatchError::NoRecipient)
    }
}

/// Deterministic notification text: always the bucket's label, the note,
/// and the target date and time.
pub fn render_message(reminder: &Reminder, bucket: Bucket) -> String {
    format!(
        "⏰ Appointment in {}.\n🗓 {} at {}\n📝 {}",
        bucket.label(),
        reminder.event_date.format("%Y-%m-%d"),
        reminder.event_time.format("%H:%M"),
        reminder.note,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::sync::{Arc, Mutex};

    struct RecordingTransport {
        sent: Arc<Mutex<Vec<(String, String)>>>,
    }

    #[async_trait]
    impl MessageTransport for RecordingTransport {
        async fn send(&self, recipient: &str, text: &str) -> Result<(), TransportError> {
            self.sent
                .lock()
                .unwrap()
                .push((recipient.to_string(), text.to_string()));
            Ok(())
        }
    }

    fn reminder(owner: &str) -> Reminder {
        Reminder {
            id: 1,
            owner_id: owner.into(),
            event_date: "2024-01-16".parse().unwrap(),
            event_time: chrono::NaiveTime::parse_from_str("10:00", "%H:%M").unwrap(),
            note: "final round with the hiring manager".into(),
            sent_24h: false,
            sent_3h: false,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn message_contains_all_fields() {
        let text = render_message(&reminder("100"), Bucket::H24);
        assert!(text.contains("24 hours"));
        assert!(text.contains("2024-01-16"));
        assert!(text.contains("10:00"));
        assert!(text.contains("final round with the hiring manager"));
    }

    #[tokio::test]
    async fn falls_back_to_owner_without_fixed_recipient() {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let dispatcher = Dispatcher::new(RecordingTransport { sent: sent.clone() }, None);
        dispatcher.dispatch(&reminder("100"), Bucket::H3).await.unwrap();
        assert_eq!(sent.lock().unwrap()[0].0, "100");
    }

    #[tokio::test]
    async fn fixed_recipient_overrides_owner() {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let dispatcher = Dispatcher::new(
            RecordingTransport { sent: sent.clone() },
            Some("999".to_string()),
        );
        dispatcher.dispatch(&reminder("100"), Bucket::H3).await.unwrap();
        assert_eq!(sent.lock().unwrap()[0].0, "999");
    }

    #[tokio::test]
    async fn no_recipient_is_an_error() {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let dispatcher = Dispatcher::new(RecordingTransport { sent: sent.clone() }, None);
        let err = dispatcher.dispatch(&reminder(""), Bucket::H3).await.unwrap_err();
        assert!(matches!(err, DispatchError::NoRecipient));
        assert!(sent.lock().unwrap().is_empty());
    }
}
