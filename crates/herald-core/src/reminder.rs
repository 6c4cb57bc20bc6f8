//! Reminder domain types — shared between the store, the sweep engine and
//! the Telegram command surface.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// A scheduled appointment reminder as persisted in the `reminders` table.
///
/// `event_date` + `event_time` are a wall-clock target in the configured
/// zone; the sweep resolves them to an absolute instant via
/// [`Reminder::target_instant`]. One sent flag per [`Bucket`] — monotonic,
/// flipped only through the store's `mark_bucket_sent`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    /// SQLite rowid — stable for the record's lifetime.
    pub id: i64,
    /// Chat id of the creating chat, kept as text.
    pub owner_id: String,
    pub event_date: NaiveDate,
    pub event_time: NaiveTime,
    /// Free text carried verbatim into the notification message.
    pub note: String,
    pub sent_24h: bool,
    pub sent_3h: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Reminder {
    /// Resolve the stored local date+time to an absolute UTC instant in `tz`.
    ///
    /// Returns `None` when the wall-clock time does not exist exactly once
    /// in `tz` (a DST gap or fold). Callers skip such records with a warning
    /// rather than guessing an instant.
    pub fn target_instant(&self, tz: Tz) -> Option<DateTime<Utc>> {
        tz.from_local_datetime(&self.event_date.and_time(self.event_time))
            .single()
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Whether the notification for `bucket` already went out.
    pub fn is_sent(&self, bucket: Bucket) -> bool {
        match bucket {
            Bucket::H24 => self.sent_24h,
            Bucket::H3 => self.sent_3h,
        }
    }
}

/// Notification bucket — one variant per supported lead time.
///
/// A closed enum on purpose: the store maps each variant to a fixed flag
/// column, so no user-supplied string ever reaches a SQL identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Bucket {
    /// Day-before notification.
    #[serde(rename = "24h")]
    H24,
    /// Same-day notification.
    #[serde(rename = "3h")]
    H3,
}

impl Bucket {
    /// Human label embedded in the outgoing message.
    pub fn label(self) -> &'static str {
        match self {
            Bucket::H24 => "24 hours",
            Bucket::H3 => "3 hours",
        }
    }

    /// Column holding this bucket's sent flag.
    pub fn column(self) -> &'static str {
        match self {
            Bucket::H24 => "sent_24h",
            Bucket::H3 => "sent_3h",
        }
    }
}

impl std::fmt::Display for Bucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Bucket::H24 => "24h",
            Bucket::H3 => "3h",
        };
        write!(f, "{s}")
    }
}

/// Lead time and tolerance window for one bucket.
///
/// A bucket is due when the fractional hours until the target fall inside
/// `[lead_hours - tolerance_hours, lead_hours + tolerance_hours]`. The
/// window only has to be wide enough that one sweep tick lands in it —
/// duplicate suppression comes from the sent flag, not from window exit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BucketSpec {
    pub bucket: Bucket,
    pub lead_hours: f64,
    pub tolerance_hours: f64,
}

impl BucketSpec {
    pub const fn new(bucket: Bucket, lead_hours: f64, tolerance_hours: f64) -> Self {
        Self {
            bucket,
            lead_hours,
            tolerance_hours,
        }
    }
}

/// The standard notification schedule: 24 hours and 3 hours before the
/// appointment, each with a ±30 minute window.
pub fn default_buckets() -> Vec<BucketSpec> {
    vec![
        BucketSpec::new(Bucket::H24, 24.0, 0.5),
        BucketSpec::new(Bucket::H3, 3.0, 0.5),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reminder(date: &str, time: &str) -> Reminder {
        Reminder {
            id: 1,
            owner_id: "100".into(),
            event_date: date.parse().unwrap(),
            event_time: NaiveTime::parse_from_str(time, "%H:%M").unwrap(),
            note: "screening call".into(),
            sent_24h: false,
            sent_3h: false,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn target_instant_resolves_in_utc() {
        let r = reminder("2024-01-16", "10:00");
        let target = r.target_instant(chrono_tz::UTC).unwrap();
        assert_eq!(target, Utc.with_ymd_and_hms(2024, 1, 16, 10, 0, 0).unwrap());
    }

    #[test]
    fn target_instant_applies_offset() {
        let r = reminder("2024-01-16", "10:00");
        let target = r.target_instant(chrono_tz::Asia::Tokyo).unwrap();
        // 10:00 JST == 01:00 UTC
        assert_eq!(target, Utc.with_ymd_and_hms(2024, 1, 16, 1, 0, 0).unwrap());
    }

    #[test]
    fn target_instant_none_in_dst_gap() {
        // 2024-03-10 02:30 does not exist in New York (spring-forward).
        let r = reminder("2024-03-10", "02:30");
        assert!(r.target_instant(chrono_tz::America::New_York).is_none());
    }

    #[test]
    fn bucket_flag_lookup() {
        let mut r = reminder("2024-01-16", "10:00");
        assert!(!r.is_sent(Bucket::H24));
        r.sent_24h = true;
        assert!(r.is_sent(Bucket::H24));
        assert!(!r.is_sent(Bucket::H3));
    }

    #[test]
    fn default_buckets_ordered_longest_lead_first() {
        let specs = default_buckets();
        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].bucket, Bucket::H24);
        assert_eq!(specs[1].bucket, Bucket::H3);
        assert!(specs[0].lead_hours > specs[1].lead_hours);
    }

    #[test]
    fn bucket_serialises_as_short_name() {
        assert_eq!(serde_json::to_string(&Bucket::H24).unwrap(), "\"24h\"");
        assert_eq!(serde_json::to_string(&Bucket::H3).unwrap(), "\"3h\"");
        assert_eq!(Bucket::H3.to_string(), "3h");
    }
}
