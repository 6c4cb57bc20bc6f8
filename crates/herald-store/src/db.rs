use rusqlite::{Connection, Result};

/// Initialise the reminder schema in `conn`. Safe to call on every startup
/// (idempotent).
///
/// One boolean flag column per notification bucket; the index on
/// `event_date` keeps the candidate query cheap as the table grows.
pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS reminders (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            owner_id    TEXT    NOT NULL,
            event_date  TEXT    NOT NULL,   -- YYYY-MM-DD
            event_time  TEXT    NOT NULL,   -- HH:MM
            note        TEXT    NOT NULL,
            sent_24h    INTEGER NOT NULL DEFAULT 0,
            sent_3h     INTEGER NOT NULL DEFAULT 0,
            created_at  TEXT    NOT NULL,   -- ISO-8601
            updated_at  TEXT                -- ISO-8601 or NULL
        );

        CREATE INDEX IF NOT EXISTS idx_reminders_date ON reminders (event_date);
        ",
    )
}
