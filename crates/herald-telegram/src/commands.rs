//! The text command grammar.
//!
//! Dates are `YYYY-MM-DD`, times `HH:MM` (24-hour). The verb is
//! case-insensitive and a leading slash is tolerated so `/help` behaves
//! like `help`.

use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;

const DATE_FMT: &str = "%Y-%m-%d";
const TIME_FMT: &str = "%H:%M";

pub const USAGE: &str = "Commands:\n\
    add YYYY-MM-DD HH:MM <text> — schedule a reminder\n\
    list — show your reminders\n\
    update <id> YYYY-MM-DD HH:MM <text> — replace date, time and text\n\
    delete <id> — remove a reminder\n\
    help — this message";

/// A parsed chat command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Add {
        date: NaiveDate,
        time: NaiveTime,
        note: String,
    },
    List,
    Delete {
        id: i64,
    },
    Update {
        id: i64,
        date: NaiveDate,
        time: NaiveTime,
        note: String,
    },
    Help,
}

/// Parse failures — every message is user-presentable.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandError {
    #[error("I don't know the command `{0}`.")]
    Unknown(String),

    #[error("`{0}` is not a date — expected YYYY-MM-DD.")]
    BadDate(String),

    #[error("`{0}` is not a time — expected HH:MM (24-hour).")]
    BadTime(String),

    #[error("`{0}` is not a reminder id.")]
    BadId(String),

    #[error("that command needs more arguments.")]
    MissingArgs,
}

/// Parse one incoming message into a [`Command`].
pub fn parse(text: &str) -> Result<Command, CommandError> {
    let trimmed = text.trim();
    let mut parts = trimmed.splitn(2, char::is_whitespace);
    let verb = parts
        .next()
        .unwrap_or("")
        .trim_start_matches('/')
        .to_ascii_lowercase();
    let rest = parts.next().unwrap_or("").trim();

    match verb.as_str() {
        "add" => parse_add(rest),
        "list" => Ok(Command::List),
        "delete" => parse_delete(rest),
        "update" => parse_update(rest),
        "help" | "start" => Ok(Command::Help),
        "" => Err(CommandError::MissingArgs),
        other => Err(CommandError::Unknown(other.to_string())),
    }
}

fn parse_add(rest: &str) -> Result<Command, CommandError> {
    if rest.is_empty() {
        return Err(CommandError::MissingArgs);
    }
    let mut parts = rest.splitn(3, char::is_whitespace);
    let date = parse_date(parts.next().ok_or(CommandError::MissingArgs)?)?;
    let time = parse_time(parts.next().ok_or(CommandError::MissingArgs)?)?;
    let note = parts.next().map(str::trim).unwrap_or("");
    if note.is_empty() {
        return Err(CommandError::MissingArgs);
    }
    Ok(Command::Add {
        date,
        time,
        note: note.to_string(),
    })
}

fn parse_delete(rest: &str) -> Result<Command, CommandError> {
    let id = parse_id(rest)?;
    Ok(Command::Delete { id })
}

fn parse_update(rest: &str) -> Result<Command, CommandError> {
    if rest.is_empty() {
        return Err(CommandError::MissingArgs);
    }
    let mut parts = rest.splitn(4, char::is_whitespace);
    let id = parse_id(parts.next().ok_or(CommandError::MissingArgs)?)?;
    let date = parse_date(parts.next().ok_or(CommandError::MissingArgs)?)?;
    let time = parse_time(parts.next().ok_or(CommandError::MissingArgs)?)?;
    let note = parts.next().map(str::trim).unwrap_or("");
    if note.is_empty() {
        return Err(CommandError::MissingArgs);
    }
    Ok(Command::Update {
        id,
        date,
        time,
        note: note.to_string(),
    })
}

fn parse_date(s: &str) -> Result<NaiveDate, CommandError> {
    NaiveDate::parse_from_str(s, DATE_FMT).map_err(|_| CommandError::BadDate(s.to_string()))
}

fn parse_time(s: &str) -> Result<NaiveTime, CommandError> {
    NaiveTime::parse_from_str(s, TIME_FMT).map_err(|_| CommandError::BadTime(s.to_string()))
}

fn parse_id(s: &str) -> Result<i64, CommandError> {
    if s.is_empty() {
        return Err(CommandError::MissingArgs);
    }
    s.parse().map_err(|_| CommandError::BadId(s.to_string()))
}
