// Utility helpers for parsing, ages and basic statistics.
//
// This module centralizes the forgiving CSV field handling and the small
// numeric helpers so the rest of the code can assume clean, typed values.
use chrono::{Datelike, NaiveDate};
use num_format::{Locale, ToFormattedString};

/// Trim an optional CSV field and drop it entirely when it is blank.
pub fn non_empty(s: Option<&str>) -> Option<&str> {
    let s = s?.trim();
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

pub fn parse_u32_safe(s: Option<&str>) -> Option<u32> {
    // `?` propagates `None` early if the field is missing or blank.
    non_empty(s)?.parse::<u32>().ok()
}

pub fn parse_date_safe(s: Option<&str>) -> Option<NaiveDate> {
    // Census dates are expected in `YYYY-MM-DD` format.
    NaiveDate::parse_from_str(non_empty(s)?, "%Y-%m-%d").ok()
}

/// Whole years elapsed between `born` and `as_of`.
///
/// The year count is reduced by one when the birthday has not been reached
/// yet in the `as_of` year. A birth date after `as_of` yields 0.
pub fn age_in_years(born: NaiveDate, as_of: NaiveDate) -> u32 {
    if born >= as_of {
        return 0;
    }
    let mut years = as_of.year() - born.year();
    if (as_of.month(), as_of.day()) < (born.month(), born.day()) {
        years -= 1;
    }
    years.max(0) as u32
}

pub fn average(v: &[f64]) -> f64 {
    // Standard arithmetic mean; returns 0 for an empty slice to avoid NaNs.
    if v.is_empty() {
        return 0.0;
    }
    let sum: f64 = v.iter().copied().sum();
    sum / v.len() as f64
}

pub fn median(mut v: Vec<f64>) -> f64 {
    // Takes the `Vec` by value so it can sort in place without cloning at
    // the call site.
    if v.is_empty() {
        return 0.0;
    }
    v.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = v.len() / 2;
    if v.len() % 2 == 1 {
        v[mid]
    } else {
        (v[mid - 1] + v[mid]) / 2.0
    }
}

/// Ratio of `part` to `whole`, or 0 when `whole` is zero.
pub fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed number of decimal places plus thousands separators
    // (e.g. `1,234.50`).
    let neg = n.is_sign_negative() && n != 0.0;
    let s = format!("{:.*}", decimals, n.abs());
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Counts in console messages (e.g. `1,204 residents loaded`).
    n.to_formatted_string(&Locale::en)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_median_empty_odd_even() {
        assert_eq!(median(vec![]), 0.0);
        assert_eq!(median(vec![3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(vec![4.0, 1.0, 3.0, 2.0]), 2.5);
    }

    #[test]
    fn test_age_before_and_after_birthday() {
        let born = date(2000, 6, 15);
        assert_eq!(age_in_years(born, date(2020, 6, 14)), 19);
        assert_eq!(age_in_years(born, date(2020, 6, 15)), 20);
        assert_eq!(age_in_years(born, date(2020, 12, 31)), 20);
    }

    #[test]
    fn test_age_never_negative() {
        assert_eq!(age_in_years(date(2030, 1, 1), date(2020, 1, 1)), 0);
    }

    #[test]
    fn test_ratio_guards_zero() {
        assert_eq!(ratio(3, 0), 0.0);
        assert!((ratio(1, 4) - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_number(-2.5, 1), "-2.5");
        assert_eq!(format_number(0.0, 0), "0");
        assert_eq!(format_int(12045u32), "12,045");
    }

    #[test]
    fn test_parse_helpers() {
        assert_eq!(parse_u32_safe(Some(" 42 ")), Some(42));
        assert_eq!(parse_u32_safe(Some("")), None);
        assert_eq!(parse_u32_safe(None), None);
        assert_eq!(parse_date_safe(Some("2077-10-23")), Some(date(2077, 10, 23)));
        assert_eq!(parse_date_safe(Some("23/10/2077")), None);
    }
}
