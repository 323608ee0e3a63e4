//! Day-number arithmetic for calendar offsets and date medians.
//!
//! Dates are mapped to Rata Die day numbers (days since 0001-01-01) so that
//! offsets, distances and medians are plain integer operations instead of
//! going through jiff's `Span` normalisation. Day numbers are only meaningful
//! for years 1 through 9999; results past either end saturate.

use jiff::civil::Date;

/// Convert a civil date to its Rata Die day number.
///
/// Proleptic Gregorian algorithm from Baum (2017); March is treated as the
/// first month so the leap day falls at the end of the computational year.
#[inline]
#[must_use]
pub fn day_number(d: Date) -> i32 {
    let y = i32::from(d.year());
    let m = i32::from(d.month());
    let day = i32::from(d.day());

    let a = (14 - m) / 12;
    let y2 = y - a;
    let m2 = m + 12 * a - 3;

    day + (153 * m2 + 2) / 5 + 365 * y2 + y2 / 4 - y2 / 100 + y2 / 400 - 306
}

/// First and last representable day numbers (0001-01-01 and 9999-12-31)
pub const MIN_DAY_NUMBER: i32 = 1;
pub const MAX_DAY_NUMBER: i32 = 3_652_059;

/// Inverse of [`day_number`]; out-of-range day numbers clamp to the nearest
/// representable date.
#[inline]
#[must_use]
pub fn from_day_number(rd: i32) -> Date {
    let rd = rd.clamp(MIN_DAY_NUMBER, MAX_DAY_NUMBER);
    let z = rd + 306;
    let h = 100 * z - 25;
    let a = h / 3_652_425;
    let b = a - a / 4;
    let y = (100 * b + h) / 36_525;
    let c = b + z - 365 * y - y / 4;
    let m = (5 * c + 456) / 153;
    let day = c - (153 * m - 457) / 5;

    let (year, month) = if m > 12 { (y + 1, m - 12) } else { (y, m) };

    i16::try_from(year)
        .ok()
        .and_then(|y| Date::new(y, month as i8, day as i8).ok())
        .unwrap_or(Date::MAX)
}

/// Signed number of days from `from` to `to`.
#[inline]
#[must_use]
pub fn days_between(from: Date, to: Date) -> i32 {
    day_number(to) - day_number(from)
}

/// Shift a date by `n` days (negative moves earlier), saturating at
/// 0001-01-01 and 9999-12-31.
#[inline]
#[must_use]
pub fn add_days(d: Date, n: i32) -> Date {
    from_day_number(day_number(d).saturating_add(n))
}

/// Median of a set of dates.
///
/// For an even count the two middle day numbers are averaged and rounded
/// toward the earlier date. Order of the input does not matter.
#[must_use]
pub fn median_date(dates: &[Date]) -> Option<Date> {
    if dates.is_empty() {
        return None;
    }
    let mut days: Vec<i32> = dates.iter().copied().map(day_number).collect();
    days.sort_unstable();

    let mid = days.len() / 2;
    let median = if days.len() % 2 == 1 {
        days[mid]
    } else {
        (days[mid - 1] + days[mid]).div_euclid(2)
    };
    Some(from_day_number(median))
}
