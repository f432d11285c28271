use chrono::{Duration, NaiveDate};

use crate::models::RawValue;

/// Serialization of every cleaned date: `dd/mm/yyyy`.
pub const OUTPUT_FORMAT: &str = "%d/%m/%Y";

const MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

/// Resolve a statement cell to a calendar date, reading numeric dates
/// day-first (`03/04/2024` is 3 April).
pub fn resolve_date(value: &RawValue) -> Option<NaiveDate> {
    match value {
        RawValue::Empty => None,
        RawValue::Date(d) => Some(*d),
        RawValue::Number(n) => excel_serial_to_date(*n),
        RawValue::Text(s) => parse_date_dmy(s),
    }
}

pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    // Excel epoch is 1899-12-30 (accounting for the 1900 leap year bug)
    if !(1.0..2_958_466.0).contains(&serial) {
        return None;
    }
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    base.checked_add_signed(Duration::days(serial.trunc() as i64))
}

pub fn parse_date_dmy(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    // ISO `T` only when digits sit on both sides, so `OCT` stays intact.
    let raw = match raw.split_once('T') {
        Some((date, time))
            if date.ends_with(|c: char| c.is_ascii_digit())
                && time.starts_with(|c: char| c.is_ascii_digit()) =>
        {
            date
        }
        _ => raw,
    };
    let date_part: Vec<&str> = raw
        .split_whitespace()
        .filter(|tok| {
            !tok.contains(':') && !tok.eq_ignore_ascii_case("am") && !tok.eq_ignore_ascii_case("pm")
        })
        .collect();
    let date_part = date_part.join(" ");

    let parts: Vec<&str> = date_part
        .split(|c: char| matches!(c, '/' | '-' | '.' | ' ' | ','))
        .filter(|p| !p.is_empty())
        .collect();
    if parts.len() != 3 {
        return None;
    }

    // ISO order when the first field is a four-digit year.
    if parts[0].len() == 4 && is_digits(parts[0]) {
        let y: i32 = parts[0].parse().ok()?;
        let m = parse_month(parts[1])?;
        let d: u32 = parts[2].parse().ok()?;
        return NaiveDate::from_ymd_opt(y, m, d);
    }

    let y = parse_year(parts[2])?;

    // Named month first: `Feb 01 2024`.
    if !is_digits(parts[0]) && is_digits(parts[1]) {
        let m = parse_month(parts[0])?;
        let d: u32 = parts[1].parse().ok()?;
        return NaiveDate::from_ymd_opt(y, m, d);
    }

    let d: u32 = parts[0].parse().ok()?;
    let m = parse_month(parts[1])?;
    NaiveDate::from_ymd_opt(y, m, d).or_else(|| {
        // Day-first is impossible (e.g. 04/13/2024); read it month-first.
        if is_digits(parts[1]) {
            let swapped_day: u32 = parts[1].parse().ok()?;
            NaiveDate::from_ymd_opt(y, d, swapped_day)
        } else {
            None
        }
    })
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

fn parse_month(tok: &str) -> Option<u32> {
    if is_digits(tok) {
        return tok.parse().ok();
    }
    if tok.len() < 3 || !tok.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let prefix = tok[..3].to_ascii_lowercase();
    MONTHS
        .iter()
        .position(|m| *m == prefix)
        .map(|i| i as u32 + 1)
}

fn parse_year(tok: &str) -> Option<i32> {
    if !is_digits(tok) {
        return None;
    }
    let y: i32 = tok.parse().ok()?;
    match tok.len() {
        2 if y <= 68 => Some(2000 + y),
        2 => Some(1900 + y),
        4 => Some(y),
        _ => None,
    }
}
