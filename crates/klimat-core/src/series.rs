use chrono::Datelike;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::types::{RawSeriesPoint, Tonnes, Year, YearSeries};

/// Area under the piecewise-linear curve defined by the series' (year, value)
/// points, by the trapezoid rule over each adjacent pair. Pairs separated by
/// multi-year gaps contribute `gap * (v1 + v2) / 2`; no further interpolation
/// is performed for intermediate missing years.
///
/// Empty and single-point series integrate to zero.
pub fn trapezoidal_integration(series: &YearSeries) -> Tonnes {
    let mut total = Decimal::ZERO;
    let mut prev: Option<(Year, Tonnes)> = None;

    for (&year, &value) in series {
        if let Some((prev_year, prev_value)) = prev {
            let width = Decimal::from(year - prev_year);
            total += width * (prev_value + value) / dec!(2);
        }
        prev = Some((year, value));
    }

    total
}

/// Inclusive ascending sequence from `start` to `end`. `start > end` yields
/// an empty sequence, not an error.
pub fn year_range(start: Year, end: Year) -> Vec<Year> {
    (start..=end).collect()
}

/// Wall-clock calendar year. Computations that need "now" also take an
/// explicit year so tests stay deterministic.
pub fn current_year() -> Year {
    chrono::Utc::now().year()
}

/// Shape check for a parsed series: false for an empty collection or any
/// point lacking a year. Value ranges are not validated here.
pub fn validate_series(points: &[RawSeriesPoint]) -> bool {
    !points.is_empty() && points.iter().all(|p| p.year.is_some())
}

/// Value at the numerically largest year present.
pub fn latest_value(series: &YearSeries) -> Option<Tonnes> {
    series.iter().next_back().map(|(_, &v)| v)
}

/// All years present, sorted descending.
pub fn available_years(series: &YearSeries) -> Vec<Year> {
    series.keys().rev().copied().collect()
}

/// Parse a year-keyed JSON map key. Non-numeric keys are excluded from the
/// merged year set, not treated as fatal.
pub fn parse_year(key: &str) -> Option<Year> {
    key.trim().parse::<Year>().ok()
}

/// Extract the year from an ISO date string by taking the first four
/// characters. Naive date parsing of end-of-day UTC timestamps shifts the
/// year across timezones; a string slice does not.
pub fn year_from_iso_date(date: &str) -> Option<Year> {
    date.get(..4).and_then(|y| y.parse::<Year>().ok())
}
