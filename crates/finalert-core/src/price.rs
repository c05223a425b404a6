//! Locale-aware price parsing and formatting.
//!
//! Upstream pages mix Turkish formatting (`1.234,56`) with plain decimals
//! (`40.5`). Parsing never fails loudly: text that cannot be read as a number
//! yields `None` from [`try_parse_price`] and zero from [`parse_price`], and
//! callers treat zero as "no data".

use rust_decimal::Decimal;
use std::str::FromStr;

/// Parse price text, returning `None` when no number can be read.
pub fn try_parse_price(text: &str) -> Option<Decimal> {
    let cleaned: String = text
        .trim()
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '-'))
        .collect();

    let negative = cleaned.starts_with('-');
    let body: String = cleaned.chars().filter(|c| *c != '-').collect();
    if !body.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    let normalized = match (body.rfind('.'), body.rfind(',')) {
        // Both separators: the one that comes last marks the decimals.
        (Some(dot), Some(comma)) if comma > dot => body.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => body.replace(',', ""),
        (None, Some(_)) => {
            if body.matches(',').count() > 1 && is_grouped(&body, ',') {
                body.replace(',', "")
            } else {
                body.replace(',', ".")
            }
        }
        (Some(_), None) => {
            if is_grouped(&body, '.') {
                body.replace('.', "")
            } else {
                body
            }
        }
        (None, None) => body,
    };

    let value = Decimal::from_str(&normalized).ok()?;
    Some(if negative { -value } else { value })
}

/// Parse price text, treating anything unreadable as zero.
pub fn parse_price(text: &str) -> Decimal {
    try_parse_price(text).unwrap_or(Decimal::ZERO)
}

/// True when `text` looks like an integer split into thousands groups by `sep`.
fn is_grouped(text: &str, sep: char) -> bool {
    let mut parts = text.split(sep);
    let head = match parts.next() {
        Some(head) => head,
        None => return false,
    };
    if head.is_empty() || head.len() > 3 {
        return false;
    }
    let mut tail_count = 0;
    for part in parts {
        if part.len() != 3 || !part.chars().all(|c| c.is_ascii_digit()) {
            return false;
        }
        tail_count += 1;
    }
    tail_count > 0
}

/// Format a price in Turkish style with two decimals: `1234.5` -> `1.234,50`.
pub fn format_price(value: Decimal) -> String {
    let rounded = value.round_dp(2);
    let plain = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}{grouped},{frac_part}")
}

/// Format a percentage change with two decimals and a comma: `-1.254` -> `-1,25`.
pub fn format_percent(value: Decimal) -> String {
    format!("{:.2}", value.round_dp(2)).replace('.', ",")
}
