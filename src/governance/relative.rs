//! Human readable time phrases ("in 3 days", "an hour ago") and calendar dates

use chrono::{DateTime, Datelike, FixedOffset, Months, Offset, Utc};

use crate::format::NO_DATA;

const MINUTE: f64 = 60.0;
const HOUR: f64 = 3_600.0;
const DAY: f64 = 86_400.0;
// Fallback for timestamps chrono cannot represent
const AVG_MONTH: f64 = 30.436_875 * DAY;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unit {
    Second,
    Minute,
    Hour,
    Day,
    Month,
    Year,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phrase {
    FewSeconds,
    Minute,
    Minutes,
    Hour,
    Hours,
    Day,
    Days,
    Month,
    Months,
    Year,
    Years,
}

impl Phrase {
    fn render(self, n: i64) -> String {
        match self {
            Phrase::FewSeconds => "a few seconds".to_string(),
            Phrase::Minute => "a minute".to_string(),
            Phrase::Minutes => format!("{} minutes", n),
            Phrase::Hour => "an hour".to_string(),
            Phrase::Hours => format!("{} hours", n),
            Phrase::Day => "a day".to_string(),
            Phrase::Days => format!("{} days", n),
            Phrase::Month => "a month".to_string(),
            Phrase::Months => format!("{} months", n),
            Phrase::Year => "a year".to_string(),
            Phrase::Years => format!("{} years", n),
        }
    }
}

/// (phrase, inclusive upper bound, unit the difference is re-measured in).
/// Rows without a unit reuse the previous measurement.
const THRESHOLDS: [(Phrase, Option<i64>, Option<Unit>); 11] = [
    (Phrase::FewSeconds, Some(44), Some(Unit::Second)),
    (Phrase::Minute, Some(89), None),
    (Phrase::Minutes, Some(44), Some(Unit::Minute)),
    (Phrase::Hour, Some(89), None),
    (Phrase::Hours, Some(21), Some(Unit::Hour)),
    (Phrase::Day, Some(35), None),
    (Phrase::Days, Some(25), Some(Unit::Day)),
    (Phrase::Month, Some(45), None),
    (Phrase::Months, Some(10), Some(Unit::Month)),
    (Phrase::Year, Some(17), None),
    (Phrase::Years, None, Some(Unit::Year)),
];

/// Describe `at` relative to `now`, e.g. "in an hour" or "3 days ago"
pub fn from_now(at: i64, now: i64) -> String {
    let mut measured = 0.0;
    let mut phrase = Phrase::Years;
    let mut amount = 0;

    for (i, (candidate, max, unit)) in THRESHOLDS.iter().enumerate() {
        if let Some(unit) = unit {
            measured = difference(at, now, *unit);
        }
        let rounded = measured.abs().round() as i64;
        if max.map_or(true, |max| rounded <= max) {
            phrase = if rounded <= 1 && i > 0 {
                THRESHOLDS[i - 1].0
            } else {
                *candidate
            };
            amount = rounded;
            break;
        }
    }

    let text = phrase.render(amount);
    if measured > 0.0 {
        format!("in {}", text)
    } else {
        format!("{} ago", text)
    }
}

/// Signed `at - now` in the given unit
fn difference(at: i64, now: i64, unit: Unit) -> f64 {
    let secs = at.saturating_sub(now) as f64;
    match unit {
        Unit::Second => secs,
        Unit::Minute => secs / MINUTE,
        Unit::Hour => secs / HOUR,
        Unit::Day => secs / DAY,
        Unit::Month => months_between(at, now),
        Unit::Year => months_between(at, now) / 12.0,
    }
}

fn months_between(at: i64, now: i64) -> f64 {
    match (DateTime::from_timestamp(at, 0), DateTime::from_timestamp(now, 0)) {
        (Some(a), Some(b)) => month_diff(a, b),
        _ => at.saturating_sub(now) as f64 / AVG_MONTH,
    }
}

/// Calendar month difference `a - b`, interpolating the partial month
/// against the length of the month it falls in
fn month_diff(a: DateTime<Utc>, b: DateTime<Utc>) -> f64 {
    if a.day() < b.day() {
        return -month_diff(b, a);
    }
    let whole = (b.year() - a.year()) * 12 + (b.month() as i32 - a.month() as i32);
    let anchor = add_months(a, whole);
    let behind = b < anchor;
    let next = add_months(a, whole + if behind { -1 } else { 1 });
    let span = if behind { anchor - next } else { next - anchor };
    let span_ms = span.num_milliseconds();
    if span_ms == 0 {
        return -(whole as f64);
    }
    let partial = (b - anchor).num_milliseconds() as f64 / span_ms as f64;
    let diff = -(whole as f64 + partial);
    if diff.is_nan() {
        0.0
    } else {
        diff
    }
}

fn add_months(dt: DateTime<Utc>, n: i32) -> DateTime<Utc> {
    let shifted = if n >= 0 {
        dt.checked_add_months(Months::new(n as u32))
    } else {
        dt.checked_sub_months(Months::new(n.unsigned_abs()))
    };
    shifted.unwrap_or(dt)
}

/// Renders calendar dates at a fixed UTC offset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateFormatter {
    offset: FixedOffset,
}

impl Default for DateFormatter {
    fn default() -> Self {
        Self::utc()
    }
}

impl DateFormatter {
    pub fn utc() -> Self {
        Self::with_offset_minutes(0)
    }

    /// Out of range offsets (beyond ±24h) fall back to UTC
    pub fn with_offset_minutes(minutes: i32) -> Self {
        let offset = minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| {
                tracing::warn!("UTC offset of {} minutes is out of range, using UTC", minutes);
                Utc.fix()
            });
        Self { offset }
    }

    /// `MMM DD, YYYY`, e.g. "Mar 05, 2024"
    pub fn date(&self, ts: i64) -> String {
        DateTime::from_timestamp(ts, 0)
            .map(|dt| dt.with_timezone(&self.offset).format("%b %d, %Y").to_string())
            .unwrap_or_else(|| NO_DATA.to_string())
    }
}
