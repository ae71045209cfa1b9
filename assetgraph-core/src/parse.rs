//! Typed value parsers for request text.

use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;

use crate::error::ValidationError;

/// Human-readable description of the accepted amount syntax.
pub const AMOUNT_FORMAT: &str = "a plain decimal number such as 12.47";

/// Human-readable description of the accepted timestamp syntax.
pub const TIMESTAMP_FORMAT: &str = "dd/MM/yyyy or dd/MM/yyyy HH:mm";

static AMOUNT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^-?[0-9]+(\.[0-9]+)?$").expect("Invalid amount regex")
});

static TIMESTAMP_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9]{2})/([0-9]{2})/([0-9]{4})(?: ([0-9]{2}):([0-9]{2}))?$")
        .expect("Invalid timestamp regex")
});

/// Parse an exact decimal amount.
///
/// Only `-?digits(.digits)?` is accepted. Exponents, thousands separators, a
/// leading `+` and surrounding whitespace are all rejected.
pub fn parse_amount(text: &str, field: &str) -> Result<Decimal, ValidationError> {
    if !AMOUNT_RE.is_match(text) {
        return Err(ValidationError::bad_format(field, AMOUNT_FORMAT));
    }
    let amount =
        Decimal::from_str(text).map_err(|_| ValidationError::bad_format(field, AMOUNT_FORMAT))?;

    // from_str rounds fractions beyond 28 digits instead of failing.
    let fraction_digits = text.split_once('.').map_or(0, |(_, frac)| frac.len());
    if amount.scale() as usize != fraction_digits {
        return Err(ValidationError::bad_format(field, AMOUNT_FORMAT));
    }
    Ok(amount)
}

/// Parse a `dd/MM/yyyy[ HH:mm]` timestamp. A bare date is midnight.
pub fn parse_timestamp(text: &str, field: &str) -> Result<NaiveDateTime, ValidationError> {
    let bad_format = || ValidationError::bad_format(field, TIMESTAMP_FORMAT);

    let caps = TIMESTAMP_RE.captures(text).ok_or_else(bad_format)?;
    let number = |idx: usize| -> Result<u32, ValidationError> {
        caps.get(idx)
            .map(|m| m.as_str())
            .unwrap_or("0")
            .parse::<u32>()
            .map_err(|_| bad_format())
    };

    let day = number(1)?;
    let month = number(2)?;
    let year = i32::try_from(number(3)?).map_err(|_| bad_format())?;
    let hour = number(4)?;
    let minute = number(5)?;

    let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(bad_format)?;
    let time = NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(bad_format)?;
    Ok(NaiveDateTime::new(date, time))
}
