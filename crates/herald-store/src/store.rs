use std::sync::{Arc, Mutex};

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rusqlite::Connection;
use tracing::info;

use herald_core::reminder::{Bucket, Reminder};

use crate::db::init_db;
use crate::error::{Result, StoreError};

const DATE_FMT: &str = "%Y-%m-%d";
const TIME_FMT: &str = "%H:%M";

const SELECT_COLS: &str =
    "id, owner_id, event_date, event_time, note, sent_24h, sent_3h, created_at, updated_at";

/// An updatable reminder field.
///
/// The `update` command builds a patch from these variants — a closed set,
/// so column names never come from user input.
#[derive(Debug, Clone, PartialEq)]
pub enum ReminderField {
    Date(NaiveDate),
    Time(NaiveTime),
    Note(String),
}

/// Shared handle over the reminders table.
///
/// Cloneable; wraps the connection in a `Mutex` so HTTP handlers and the
/// sweep path can share one handle.
#[derive(Clone)]
pub struct ReminderStore {
    conn: Arc<Mutex<Connection>>,
}

impl ReminderStore {
    /// Create a store handle, initialising the schema if needed.
    pub fn new(conn: Connection) -> Result<Self> {
        init_db(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Insert a new reminder. Flags start false except the `pre_sent`
    /// buckets — the creation path passes buckets whose window already
    /// lies in the past so they are never considered due.
    pub fn create(
        &self,
        owner_id: &str,
        event_date: NaiveDate,
        event_time: NaiveTime,
        note: &str,
        pre_sent: &[Bucket],
    ) -> Result<Reminder> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO reminders
             (owner_id, event_date, event_time, note, sent_24h, sent_3h, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            rusqlite::params![
                owner_id,
                event_date.format(DATE_FMT).to_string(),
                event_time.format(TIME_FMT).to_string(),
                note,
                pre_sent.contains(&Bucket::H24),
                pre_sent.contains(&Bucket::H3),
                now,
            ],
        )?;
        let id = conn.last_insert_rowid();
        info!(reminder_id = id, owner = %owner_id, "reminder created");
        get_inner(&conn, id)
    }

    /// Fetch one reminder by id.
    pub fn get(&self, id: i64) -> Result<Reminder> {
        let conn = self.conn.lock().unwrap();
        get_inner(&conn, id)
    }

    /// All reminders created from `owner_id`, soonest first.
    pub fn list_for_owner(&self, owner_id: &str) -> Result<Vec<Reminder>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {SELECT_COLS} FROM reminders
             WHERE owner_id = ?1
             ORDER BY event_date, event_time",
        ))?;
        let rows = stmt.query_map([owner_id], row_to_reminder)?;
        Ok(rows.filter_map(|r| r.ok()).collect())
    }

    /// Apply a field patch and stamp `updated_at`. Sent flags are never
    /// part of a patch — they only move through [`Self::mark_bucket_sent`].
    pub fn update(&self, id: i64, patch: &[ReminderField]) -> Result<Reminder> {
        let conn = self.conn.lock().unwrap();
        if patch.is_empty() {
            return get_inner(&conn, id);
        }

        let mut sets: Vec<&str> = Vec::with_capacity(patch.len() + 1);
        let mut values: Vec<Box<dyn rusqlite::ToSql>> = Vec::with_capacity(patch.len() + 2);
        for field in patch {
            match field {
                ReminderField::Date(d) => {
                    sets.push("event_date = ?");
                    values.push(Box::new(d.format(DATE_FMT).to_string()));
                }
                ReminderField::Time(t) => {
                    sets.push("event_time = ?");
                    values.push(Box::new(t.format(TIME_FMT).to_string()));
                }
                ReminderField::Note(n) => {
                    sets.push("note = ?");
                    values.push(Box::new(n.clone()));
                }
            }
        }
        sets.push("updated_at = ?");
        values.push(Box::new(Utc::now().to_rfc3339()));
        values.push(Box::new(id));

        let sql = format!("UPDATE reminders SET {} WHERE id = ?", sets.join(", "));
        let param_refs: Vec<&dyn rusqlite::ToSql> = values.iter().map(|v| v.as_ref()).collect();
        let n = conn.execute(&sql, param_refs.as_slice())?;
        if n == 0 {
            return Err(StoreError::NotFound { id });
        }
        info!(reminder_id = id, fields = patch.len(), "reminder updated");
        get_inner(&conn, id)
    }

    /// Delete a reminder. `NotFound` if no row was removed.
    pub fn delete(&self, id: i64) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let n = conn.execute("DELETE FROM reminders WHERE id = ?1", [id])?;
        if n == 0 {
            return Err(StoreError::NotFound { id });
        }
        info!(reminder_id = id, "reminder deleted");
        Ok(())
    }

    /// Rows that could plausibly have a due bucket: at least one unsent
    /// flag and a target date on or after `today`.
    ///
    /// Deliberately a superset — the evaluator does the precise window
    /// check. A single query returns every matching row; nothing is paged.
    pub fn fetch_candidates(&self, today: NaiveDate) -> Result<Vec<Reminder>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {SELECT_COLS} FROM reminders
             WHERE (sent_24h = 0 OR sent_3h = 0) AND event_date >= ?1
             ORDER BY event_date, event_time",
        ))?;
        let rows = stmt.query_map([today.format(DATE_FMT).to_string()], row_to_reminder)?;
        Ok(rows.filter_map(|r| r.ok()).collect())
    }

    /// Set the sent flag for `bucket` on one row. Idempotent: repeating the
    /// call leaves the flag true and succeeds. `NotFound` when the id does
    /// not exist.
    pub fn mark_bucket_sent(&self, id: i64, bucket: Bucket) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let sql = format!(
            "UPDATE reminders SET {} = 1 WHERE id = ?1",
            bucket.column()
        );
        let n = conn.execute(&sql, [id])?;
        if n == 0 {
            return Err(StoreError::NotFound { id });
        }
        info!(reminder_id = id, bucket = %bucket, "bucket marked sent");
        Ok(())
    }
}

fn get_inner(conn: &Connection, id: i64) -> Result<Reminder> {
    conn.query_row(
        &format!("SELECT {SELECT_COLS} FROM reminders WHERE id = ?1"),
        [id],
        row_to_reminder,
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound { id },
        other => other.into(),
    })
}

fn row_to_reminder(row: &rusqlite::Row<'_>) -> rusqlite::Result<Reminder> {
    let date_s: String = row.get(2)?;
    let time_s: String = row.get(3)?;
    let created_s: String = row.get(7)?;
    let updated_s: Option<String> = row.get(8)?;

    Ok(Reminder {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        event_date: NaiveDate::parse_from_str(&date_s, DATE_FMT)
            .map_err(|e| bad_column(2, e))?,
        event_time: NaiveTime::parse_from_str(&time_s, TIME_FMT)
            .map_err(|e| bad_column(3, e))?,
        note: row.get(4)?,
        sent_24h: row.get(5)?,
        sent_3h: row.get(6)?,
        created_at: parse_utc(&created_s).map_err(|e| bad_column(7, e))?,
        updated_at: updated_s
            .map(|s| parse_utc(&s).map_err(|e| bad_column(8, e)))
            .transpose()?,
    })
}

fn parse_utc(s: &str) -> chrono::ParseResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s).map(|dt| dt.with_timezone(&Utc))
}

fn bad_column(idx: usize, e: chrono::ParseError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
}
