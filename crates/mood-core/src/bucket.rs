//! Calendar bucketing of entries.
//!
//! Entries are grouped by the calendar period that contains their timestamp,
//! interpreted in the host's local time zone:
//!
//! - `Day`: the local date
//! - `Week`: the ISO 8601 week (Monday start, week 1 holds the first Thursday)
//! - `Month`: the local year and month
//!
//! Buckets are ordered by the first calendar day of their period, never by
//! label, so `Week 9` sorts before `Week 10` and the last ISO week of a year
//! sorts before week 1 of the next. Periods without entries are absent.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Duration, Local, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::entry::Entry;

/// Width of a bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Day,
    Week,
    Month,
}

impl Granularity {
    /// Lowercase name used in JSON output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
        }
    }

    /// First calendar day of the period containing `date`.
    fn period_start(self, date: NaiveDate) -> NaiveDate {
        match self {
            Self::Day => date,
            Self::Week => {
                let days_since_monday = date.weekday().num_days_from_monday();
                date - Duration::days(i64::from(days_since_monday))
            }
            Self::Month => date - Duration::days(i64::from(date.day0())),
        }
    }
}

/// How many of the most recent buckets to keep per granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BucketLimits {
    pub day: usize,
    pub week: usize,
    pub month: usize,
}

impl Default for BucketLimits {
    fn default() -> Self {
        Self {
            day: 7,
            week: 6,
            month: 6,
        }
    }
}

impl BucketLimits {
    /// Limit configured for `granularity`.
    #[must_use]
    pub const fn for_granularity(self, granularity: Granularity) -> usize {
        match granularity {
            Granularity::Day => self.day,
            Granularity::Week => self.week,
            Granularity::Month => self.month,
        }
    }
}

/// Average rating over one calendar period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bucket {
    /// Human-readable period name.
    pub label: String,
    /// Local midnight of the period's first day.
    pub period_start: DateTime<Utc>,
    /// Mean rating, unrounded.
    pub average: f64,
    /// Number of entries in the period. Never zero.
    pub count: usize,
}

#[derive(Debug, Default, Clone, Copy)]
struct Accumulator {
    sum: u64,
    count: usize,
}

/// Buckets `entries` in the host's local calendar, keeping the last `limit`.
pub fn bucketize(entries: &[Entry], granularity: Granularity, limit: usize) -> Vec<Bucket> {
    bucketize_in(entries, granularity, limit, &Local)
}

/// Buckets `entries` against the calendar of `tz`, keeping the last `limit`.
#[allow(clippy::cast_precision_loss)]
pub fn bucketize_in<Tz: TimeZone>(
    entries: &[Entry],
    granularity: Granularity,
    limit: usize,
    tz: &Tz,
) -> Vec<Bucket> {
    let mut periods: BTreeMap<NaiveDate, Accumulator> = BTreeMap::new();
    for entry in entries {
        let local_date = entry.timestamp.with_timezone(tz).date_naive();
        let acc = periods
            .entry(granularity.period_start(local_date))
            .or_default();
        acc.sum += u64::from(entry.rating.value());
        acc.count += 1;
    }

    let skip = periods.len().saturating_sub(limit);
    let kept: Vec<(NaiveDate, Accumulator)> = periods.into_iter().skip(skip).collect();

    // Day labels omit the year unless the kept range crosses one.
    let spans_years = kept
        .first()
        .zip(kept.last())
        .is_some_and(|((first, _), (last, _))| first.year() != last.year());

    kept.into_iter()
        .map(|(start, acc)| Bucket {
            label: label_for(granularity, start, spans_years),
            period_start: start_of_day(tz, start),
            average: acc.sum as f64 / acc.count as f64,
            count: acc.count,
        })
        .collect()
}

fn label_for(granularity: Granularity, start: NaiveDate, with_year: bool) -> String {
    match granularity {
        Granularity::Day if with_year => start.format("%d %b %Y").to_string(),
        Granularity::Day => start.format("%d %b").to_string(),
        Granularity::Week => {
            let week = start.iso_week();
            format!("Week {}, {}", week.week(), week.year())
        }
        Granularity::Month => start.format("%b %Y").to_string(),
    }
}

/// Converts local midnight of `date` to UTC.
///
/// An ambiguous midnight (DST fall-back) resolves to the earlier instant. A
/// midnight inside a spring-forward gap moves to 01:00 local.
fn start_of_day<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    match tz.from_local_datetime(&midnight) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.with_timezone(&Utc),
        LocalResult::None => {
            let one_am = midnight + Duration::hours(1);
            tz.from_local_datetime(&one_am)
                .earliest()
                .map_or_else(|| Utc.from_utc_datetime(&midnight), |dt| dt.with_timezone(&Utc))
        }
    }
}
