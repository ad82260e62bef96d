//! Calendar helpers for the backtest loop.
//!
//! The backtest steps over thousands of trading days and asks two questions of
//! every date: how far is it from the start, and which rebalance period does it
//! belong to. jiff `Span` arithmetic answers the first correctly but is heavy for a
//! hot loop, so day differences go through Rata Die numbering instead.

use jiff::civil::Date;

/// Average Gregorian year length used for CAGR horizons.
pub const DAYS_PER_YEAR: f64 = 365.25;

/// Convert a civil date to a Rata Die day number (days since 0001-01-01).
///
/// Proleptic Gregorian calendar, Baum (2017).
#[inline]
fn rata_die(d: Date) -> i32 {
    let y = d.year() as i32;
    let m = d.month() as i32;
    let day = d.day() as i32;

    // Shift March = month 1 so Feb (end of "year") is month 12
    let a = (14 - m) / 12;
    let y2 = y - a;
    let m2 = m + 12 * a - 3;

    day + (153 * m2 + 2) / 5 + 365 * y2 + y2 / 4 - y2 / 100 + y2 / 400 - 306
}

/// Number of days between two dates (d2 - d1). Positive when `d2 > d1`.
#[inline]
pub fn fast_days_between(d1: Date, d2: Date) -> i32 {
    rata_die(d2) - rata_die(d1)
}

/// Elapsed actual years between two dates.
#[inline]
pub fn years_between(d1: Date, d2: Date) -> f64 {
    f64::from(fast_days_between(d1, d2)) / DAYS_PER_YEAR
}

/// Calendar quarter (1-4) of a date.
#[inline]
pub fn quarter(d: Date) -> i8 {
    (d.month() - 1) / 3 + 1
}

/// Month ordinal counted from year 0, so consecutive months differ by one
/// across year boundaries.
#[inline]
pub fn month_ordinal(d: Date) -> i32 {
    i32::from(d.year()) * 12 + i32::from(d.month()) - 1
}
