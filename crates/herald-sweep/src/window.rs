//! Due-window evaluation — pure time math, no I/O.
//!
//! The sweep runs on a coarse external tick (minutes apart), so an
//! exact-instant comparison would miss nearly every reminder. Each bucket
//! instead carries a tolerance window around its nominal lead time, wide
//! enough that at least one tick lands inside it. Firing twice across
//! consecutive ticks is prevented by the sent flag, never by window exit.

use chrono::{DateTime, Utc};

use herald_core::reminder::{Bucket, BucketSpec, Reminder};

/// Fractional hours from `now` until `target`, at millisecond resolution.
/// Positive while the target lies in the future.
pub fn hours_until(target: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    target.signed_duration_since(now).num_milliseconds() as f64 / 3_600_000.0
}

/// Buckets currently due for `reminder`, in spec order.
///
/// A bucket is due iff its sent flag is unset and the remaining time falls
/// inside `[lead - tolerance, lead + tolerance]`, inclusive on both ends.
/// The flag check repeats here even though the candidate query already
/// filters fully-notified rows.
pub fn due_buckets(
    reminder: &Reminder,
    target: DateTime<Utc>,
    now: DateTime<Utc>,
    specs: &[BucketSpec],
) -> Vec<Bucket> {
    let remaining = hours_until(target, now);
    specs
        .iter()
        .filter(|spec| !reminder.is_sent(spec.bucket))
        .filter(|spec| {
            let lo = spec.lead_hours - spec.tolerance_hours;
            let hi = spec.lead_hours + spec.tolerance_hours;
            (lo..=hi).contains(&remaining)
        })
        .map(|spec| spec.bucket)
        .collect()
}

/// Buckets whose window already lies in the past at `now`.
///
/// A reminder created closer to its target than `lead - tolerance` can
/// never enter that bucket's window, so the creation path marks these sent
/// up front — they are neither due now nor perpetually overdue later.
pub fn preexpired_buckets(
    target: DateTime<Utc>,
    now: DateTime<Utc>,
    specs: &[BucketSpec],
) -> Vec<Bucket> {
    let remaining = hours_until(target, now);
    specs
        .iter()
        .filter(|spec| remaining < spec.lead_hours - spec.tolerance_hours)
        .map(|spec| spec.bucket)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use herald_core::reminder::default_buckets;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    fn reminder(sent_24h: bool, sent_3h: bool) -> Reminder {
        Reminder {
            id: 7,
            owner_id: "100".into(),
            event_date: "2024-01-16".parse().unwrap(),
            event_time: chrono::NaiveTime::parse_from_str("10:00", "%H:%M").unwrap(),
            note: "interview".into(),
            sent_24h,
            sent_3h,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn fractional_hours() {
        let target = at(2024, 1, 16, 10, 0);
        assert_eq!(hours_until(target, at(2024, 1, 15, 10, 0)), 24.0);
        assert_eq!(hours_until(target, at(2024, 1, 16, 7, 15)), 2.75);
        assert!(hours_until(target, at(2024, 1, 16, 11, 0)) < 0.0);
    }

    #[test]
    fn due_at_exact_lead() {
        // 24h away on the dot — inside the 24h window, outside the 3h one.
        let target = at(2024, 1, 16, 10, 0);
        let due = due_buckets(&reminder(false, false), target, at(2024, 1, 15, 10, 0), &default_buckets());
        assert_eq!(due, vec![Bucket::H24]);
    }

    #[test]
    fn window_edges_are_inclusive() {
        let target = at(2024, 1, 16, 10, 0);
        let specs = default_buckets();
        // 24.5h away: upper edge of the 24h window.
        assert_eq!(
            due_buckets(&reminder(false, false), target, at(2024, 1, 15, 9, 30), &specs),
            vec![Bucket::H24]
        );
        // 23.5h away: lower edge.
        assert_eq!(
            due_buckets(&reminder(false, false), target, at(2024, 1, 15, 10, 30), &specs),
            vec![Bucket::H24]
        );
    }

    #[test]
    fn outside_tolerance_not_due() {
        let target = at(2024, 1, 16, 10, 0);
        let specs = default_buckets();
        // 24.51h away — just past the upper edge.
        assert!(due_buckets(&reminder(false, false), target, at(2024, 1, 15, 9, 29), &specs)
            .is_empty());
        // 23.49h — just past the lower edge (and far from the 3h window).
        assert!(due_buckets(&reminder(false, false), target, at(2024, 1, 15, 10, 31), &specs)
            .is_empty());
    }

    #[test]
    fn sent_flag_excludes_bucket() {
        // 2.75h before target: inside the 3h window. The 24h flag being set
        // changes nothing; setting the 3h flag silences it entirely.
        let target = at(2024, 1, 16, 10, 0);
        let now = at(2024, 1, 16, 7, 15);
        let specs = default_buckets();
        assert_eq!(
            due_buckets(&reminder(true, false), target, now, &specs),
            vec![Bucket::H3]
        );
        assert!(due_buckets(&reminder(true, true), target, now, &specs).is_empty());
    }

    #[test]
    fn irregular_tick_still_lands_in_window() {
        // Ticks every 10 minutes around the 3h mark all hit the ±30min window.
        let target = at(2024, 1, 16, 10, 0);
        let specs = default_buckets();
        for minutes in [35, 45, 55, 5, 15, 25] {
            let now = at(2024, 1, 16, 6, minutes);
            assert_eq!(
                due_buckets(&reminder(true, false), target, now, &specs),
                vec![Bucket::H3],
                "tick at 06:{minutes:02} missed the window"
            );
        }
    }

    #[test]
    fn preexpired_close_to_target() {
        // Created 30 minutes before the target: both windows already passed.
        let target = at(2024, 1, 15, 11, 0);
        let now = at(2024, 1, 15, 10, 30);
        let pre = preexpired_buckets(target, now, &default_buckets());
        assert_eq!(pre, vec![Bucket::H24, Bucket::H3]);
    }

    #[test]
    fn preexpired_partial() {
        // 5h out: the 24h window is unreachable, the 3h one still ahead.
        let target = at(2024, 1, 15, 15, 0);
        let now = at(2024, 1, 15, 10, 0);
        let pre = preexpired_buckets(target, now, &default_buckets());
        assert_eq!(pre, vec![Bucket::H24]);
    }

    #[test]
    fn preexpired_none_when_far_out() {
        let target = at(2024, 1, 20, 10, 0);
        let now = at(2024, 1, 15, 10, 0);
        assert!(preexpired_buckets(target, now, &default_buckets()).is_empty());
    }
}
