//! Webhook update handling — from a raw Telegram `Update` to a reply.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;
use teloxide::types::{ChatId, Update, UpdateKind};
use tracing::debug;

use herald_core::reminder::{BucketSpec, Reminder};
use herald_store::{ReminderField, ReminderStore, StoreError};
use herald_sweep::window;

use crate::allow;
use crate::commands::{self, Command, USAGE};

/// Executes chat commands against the reminder store.
///
/// Runs for every webhook update. Performs:
/// 1. Non-message and bot-sender filter
/// 2. Allowlist check
/// 3. Command parsing
/// 4. Store CRUD + reply rendering
pub struct CommandHandler {
    store: ReminderStore,
    specs: Vec<BucketSpec>,
    tz: Tz,
    allow_chats: Vec<i64>,
}

impl CommandHandler {
    pub fn new(store: ReminderStore, specs: Vec<BucketSpec>, tz: Tz, allow_chats: Vec<i64>) -> Self {
        Self {
            store,
            specs,
            tz,
            allow_chats,
        }
    }

    /// Handle one webhook update.
    ///
    /// Returns the chat to answer and the reply text, or `None` when the
    /// update carries nothing for us (edits, stickers, other bots,
    /// disallowed chats).
    pub fn handle_update(&self, update: &Update, now: DateTime<Utc>) -> Option<(ChatId, String)> {
        let UpdateKind::Message(msg) = &update.kind else {
            return None;
        };
        if msg.from.as_ref().map(|u| u.is_bot).unwrap_or(false) {
            return None;
        }
        let text = msg.text()?;
        if !allow::is_allowed(&self.allow_chats, msg.chat.id.0) {
            debug!(chat_id = msg.chat.id.0, "chat not in allowlist — ignoring");
            return None;
        }
        Some((msg.chat.id, self.execute(msg.chat.id.0, text, now)))
    }

    /// Parse and run one command, producing the user-visible reply.
    pub fn execute(&self, chat_id: i64, text: &str, now: DateTime<Utc>) -> String {
        let cmd = match commands::parse(text) {
            Ok(cmd) => cmd,
            Err(e) => return format!("{e}\n\n{USAGE}"),
        };
        match self.run(chat_id, cmd, now) {
            Ok(reply) => reply,
            Err(e) => format!("⚠️ {e}"),
        }
    }

    fn run(&self, chat_id: i64, cmd: Command, now: DateTime<Utc>) -> Result<String, StoreError> {
        match cmd {
            Command::Add { date, time, note } => self.add(chat_id, date, time, &note, now),
            Command::List => self.list(chat_id),
            Command::Delete { id } => {
                self.store.delete(id)?;
                Ok(format!("Deleted reminder #{id}."))
            }
            Command::Update {
                id,
                date,
                time,
                note,
            } => {
                let r = self.store.update(
                    id,
                    &[
                        ReminderField::Date(date),
                        ReminderField::Time(time),
                        ReminderField::Note(note),
                    ],
                )?;
                Ok(format!(
                    "Updated reminder #{}: {} {} — {}",
                    r.id,
                    r.event_date.format("%Y-%m-%d"),
                    r.event_time.format("%H:%M"),
                    r.note
                ))
            }
            Command::Help => Ok(USAGE.to_string()),
        }
    }

    fn add(
        &self,
        chat_id: i64,
        date: NaiveDate,
        time: NaiveTime,
        note: &str,
        now: DateTime<Utc>,
    ) -> Result<String, StoreError> {
        // Buckets whose window already passed are marked sent at creation,
        // so a last-minute reminder never fires them late.
        let pre_sent = target_utc(date, time, self.tz)
            .map(|target| window::preexpired_buckets(target, now, &self.specs))
            .unwrap_or_default();

        let r = self
            .store
            .create(&chat_id.to_string(), date, time, note, &pre_sent)?;
        Ok(format!(
            "Saved reminder #{}: {} {} — {}",
            r.id,
            r.event_date.format("%Y-%m-%d"),
            r.event_time.format("%H:%M"),
            r.note
        ))
    }

    fn list(&self, chat_id: i64) -> Result<String, StoreError> {
        let rows = self.store.list_for_owner(&chat_id.to_string())?;
        if rows.is_empty() {
            return Ok("No reminders yet. Create one with `add YYYY-MM-DD HH:MM <text>`.".into());
        }
        let lines: Vec<String> = rows.iter().map(render_row).collect();
        Ok(lines.join("\n"))
    }
}

fn render_row(r: &Reminder) -> String {
    format!(
        "#{} {} {} — {}",
        r.id,
        r.event_date.format("%Y-%m-%d"),
        r.event_time.format("%H:%M"),
        r.note
    )
}

fn target_utc(date: NaiveDate, time: NaiveTime, tz: Tz) -> Option<DateTime<Utc>> {
    use chrono::TimeZone;
    tz.from_local_datetime(&date.and_time(time))
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use herald_core::reminder::default_buckets;

    fn handler(allow_chats: Vec<i64>) -> CommandHandler {
        let store = ReminderStore::new(rusqlite::Connection::open_in_memory().unwrap()).unwrap();
        CommandHandler::new(store, default_buckets(), chrono_tz::UTC, allow_chats)
    }

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn add_then_list() {
        let h = handler(vec![]);
        let now = at(2024, 1, 10, 9, 0);
        let reply = h.execute(100, "add 2024-01-16 10:00 phone screen", now);
        assert!(reply.starts_with("Saved reminder #1"));
        assert!(reply.contains("phone screen"));

        let listed = h.execute(100, "list", now);
        assert!(listed.contains("#1 2024-01-16 10:00 — phone screen"));
        // Another chat sees its own (empty) list.
        assert!(h.execute(200, "list", now).contains("No reminders yet"));
    }

    #[test]
    fn add_far_out_leaves_flags_unset() {
        let h = handler(vec![]);
        h.execute(100, "add 2024-01-16 10:00 x", at(2024, 1, 10, 9, 0));
        let r = h.store.get(1).unwrap();
        assert!(!r.sent_24h);
        assert!(!r.sent_3h);
    }

    #[test]
    fn add_at_the_last_minute_premarks_passed_windows() {
        // Created 30 minutes before the target: both windows unreachable.
        let h = handler(vec![]);
        h.execute(100, "add 2024-01-15 11:00 walk-in", at(2024, 1, 15, 10, 30));
        let r = h.store.get(1).unwrap();
        assert!(r.sent_24h);
        assert!(r.sent_3h);
    }

    #[test]
    fn add_same_day_premarks_only_the_day_before_window() {
        // 5 hours ahead: the 24h window is gone, the 3h one still to come.
        let h = handler(vec![]);
        h.execute(100, "add 2024-01-15 15:00 onsite", at(2024, 1, 15, 10, 0));
        let r = h.store.get(1).unwrap();
        assert!(r.sent_24h);
        assert!(!r.sent_3h);
    }

    #[test]
    fn update_and_delete_round_trip() {
        let h = handler(vec![]);
        let now = at(2024, 1, 10, 9, 0);
        h.execute(100, "add 2024-01-16 10:00 old text", now);

        let reply = h.execute(100, "update 1 2024-02-01 14:30 new text", now);
        assert!(reply.contains("Updated reminder #1"));
        assert!(reply.contains("2024-02-01 14:30"));
        assert!(reply.contains("new text"));

        let reply = h.execute(100, "delete 1", now);
        assert_eq!(reply, "Deleted reminder #1.");
        assert!(h.execute(100, "delete 1", now).contains("not found"));
    }

    #[test]
    fn parse_errors_come_back_with_usage() {
        let h = handler(vec![]);
        let reply = h.execute(100, "add tomorrow 10:00 x", at(2024, 1, 10, 9, 0));
        assert!(reply.contains("not a date"));
        assert!(reply.contains("Commands:"));
    }

    #[test]
    fn help_returns_usage() {
        let h = handler(vec![]);
        assert_eq!(h.execute(100, "help", at(2024, 1, 10, 9, 0)), USAGE);
    }
}
