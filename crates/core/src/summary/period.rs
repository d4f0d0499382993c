//! Reporting period resolution.
//!
//! Reporting cycles run Tuesday to Friday and Friday to Tuesday. The weekday
//! and midnight are taken in the configured timezone, then converted back to
//! UTC for the store query.

use chrono::{DateTime, Datelike, Duration, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::summary::error::SummaryError;
use crate::summary::types::DateRange;

/// Days between `weekday` (Sunday = 0) and the start of its reporting window.
#[must_use]
pub fn days_since_cutoff(weekday: u32) -> u32 {
    match weekday {
        2 => 4,
        5 => 3,
        0 | 1 => weekday + 2,
        3 | 4 => weekday - 2,
        _ => 1,
    }
}

/// Start of the reporting window containing `now`, at local midnight.
#[must_use]
pub fn period_start(now: DateTime<Utc>, tz: Tz) -> DateTime<Utc> {
    let local = now.with_timezone(&tz);
    let days_back = days_since_cutoff(local.weekday().num_days_from_sunday());
    let midnight = (local.date_naive() - Duration::days(i64::from(days_back))).and_time(NaiveTime::MIN);

    // Midnight can fall in a DST gap; the day then opens when the gap ends.
    (0..=96_i64)
        .map(|step| midnight + Duration::minutes(15 * step))
        .find_map(|local| tz.from_local_datetime(&local).earliest())
        .map_or_else(|| Utc.from_utc_datetime(&midnight), |start| start.with_timezone(&Utc))
}

/// Resolves an optional explicit window against the default period.
///
/// # Errors
/// * `InvalidRange` if the resolved start is after the resolved end
pub fn resolve_window(
    now: DateTime<Utc>,
    tz: Tz,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> Result<DateRange, SummaryError> {
    let end = end.unwrap_or(now);
    let start = start.unwrap_or_else(|| period_start(now, tz));
    if start > end {
        return Err(SummaryError::InvalidRange { start, end });
    }
    Ok(DateRange { start, end })
}
