use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Timezone used to derive calendar months and display dates.
/// The assistant targets Indonesian users, so calendar boundaries follow Jakarta time.
pub const DEFAULT_REPORTING_TZ: Tz = chrono_tz::Asia::Jakarta;

/// Returns the `(year, month)` of the given instant in the reporting timezone.
pub fn calendar_month_of(instant: DateTime<Utc>, tz: Tz) -> (i32, u32) {
    let local = instant.with_timezone(&tz);
    (local.year(), local.month())
}

/// Returns the half-open UTC range `[first day 00:00, next month first day 00:00)`
/// covering a calendar month in the given timezone.
pub fn month_bounds_utc(year: i32, month: u32, tz: Tz) -> Option<(NaiveDateTime, NaiveDateTime)> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((
        local_midnight_as_utc(start, tz)?,
        local_midnight_as_utc(next, tz)?,
    ))
}

fn local_midnight_as_utc(date: NaiveDate, tz: Tz) -> Option<NaiveDateTime> {
    let midnight = date.and_hms_opt(0, 0, 0)?;
    tz.from_local_datetime(&midnight)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc).naive_utc())
}

/// Formats an instant as an Indonesian short date (`d/m/yyyy`).
pub fn format_short_date_id(instant: DateTime<Utc>, tz: Tz) -> String {
    instant.with_timezone(&tz).format("%-d/%-m/%Y").to_string()
}

/// Whole days remaining until `deadline`, rounded up and floored at zero.
pub fn days_until(deadline: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let remaining = deadline - now;
    if remaining <= Duration::zero() {
        return 0;
    }
    let day_ms = Duration::days(1).num_milliseconds();
    let ms = remaining.num_milliseconds();
    (ms + day_ms - 1) / day_ms
}
