//! Policy expiration expressed as seconds or a relative time phrase.
//!
//! The relative form accepts one or more signed amounts with units, e.g.
//! `"+6 hours"`, `"+1 day 12 hours"`, `"30 minutes"`, or `"-1 hour"`. A bare
//! integer, as a number or a string, is a seconds count.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{UploadError, UploadResult};

/// Shortest accepted policy lifetime in seconds.
pub const MIN_EXPIRY_SECONDS: i64 = 1;

/// Longest accepted policy lifetime in seconds (7 days).
pub const MAX_EXPIRY_SECONDS: i64 = 604_800;

/// How long a signed policy stays valid.
///
/// # Examples
///
/// ```
/// use directupload_core::Expiry;
///
/// assert_eq!(Expiry::from("+6 hours").seconds().unwrap(), 21_600);
/// assert_eq!(Expiry::from(90_i64).seconds().unwrap(), 90);
/// assert!(Expiry::from("next tuesday").seconds().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Expiry {
    /// A number of seconds from now.
    Seconds(i64),
    /// A relative time phrase such as `"+6 hours"`.
    Relative(String),
}

impl Expiry {
    /// The offset from now in seconds, which may be zero or negative.
    ///
    /// # Errors
    /// Returns [`UploadError::InvalidExpiry`] if the phrase cannot be parsed or
    /// overflows.
    pub fn seconds(&self) -> UploadResult<i64> {
        match self {
            Self::Seconds(seconds) => Ok(*seconds),
            Self::Relative(phrase) => parse_relative(phrase),
        }
    }

    /// The absolute expiration relative to `now`, bounded to 1..=604800 seconds.
    ///
    /// # Errors
    /// Returns [`UploadError::InvalidExpiry`] if the phrase is invalid or the
    /// offset falls outside the accepted window.
    pub fn expiration_from(&self, now: DateTime<Utc>) -> UploadResult<DateTime<Utc>> {
        let seconds = self.seconds()?;
        if !(MIN_EXPIRY_SECONDS..=MAX_EXPIRY_SECONDS).contains(&seconds) {
            return Err(UploadError::InvalidExpiry(format!(
                "expiry must be between {MIN_EXPIRY_SECONDS} and {MAX_EXPIRY_SECONDS} seconds, got {seconds}"
            )));
        }
        Ok(now + Duration::seconds(seconds))
    }
}

impl Default for Expiry {
    fn default() -> Self {
        Self::Relative("+6 hours".to_owned())
    }
}

impl fmt::Display for Expiry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Seconds(seconds) => write!(f, "{seconds}"),
            Self::Relative(phrase) => f.write_str(phrase),
        }
    }
}

impl From<i64> for Expiry {
    fn from(seconds: i64) -> Self {
        Self::Seconds(seconds)
    }
}

impl From<&str> for Expiry {
    fn from(phrase: &str) -> Self {
        Self::Relative(phrase.to_owned())
    }
}

impl From<String> for Expiry {
    fn from(phrase: String) -> Self {
        Self::Relative(phrase)
    }
}

/// Seconds per unit name, or `None` for an unknown unit.
fn unit_seconds(unit: &str) -> Option<i64> {
    let seconds = match unit.to_ascii_lowercase().as_str() {
        "s" | "sec" | "secs" | "second" | "seconds" => 1,
        "m" | "min" | "mins" | "minute" | "minutes" => 60,
        "h" | "hr" | "hrs" | "hour" | "hours" => 3_600,
        "d" | "day" | "days" => 86_400,
        "w" | "week" | "weeks" => 604_800,
        "fortnight" | "fortnights" => 1_209_600,
        _ => return None,
    };
    Some(seconds)
}

fn parse_relative(phrase: &str) -> UploadResult<i64> {
    let invalid = || UploadError::InvalidExpiry(format!("cannot parse expiry {phrase:?}"));

    let trimmed = phrase.trim();
    // A lone integer is a count of seconds; every other term needs a unit.
    if let Ok(seconds) = trimmed.parse::<i64>() {
        return Ok(seconds);
    }

    let mut chars = trimmed.chars().peekable();
    if chars.peek().is_none() {
        return Err(invalid());
    }

    let mut total: i64 = 0;
    while chars.peek().is_some() {
        let mut negative = false;
        if let Some(&sign @ ('+' | '-')) = chars.peek() {
            negative = sign == '-';
            chars.next();
        }
        while chars.next_if(|c| c.is_whitespace()).is_some() {}

        let mut digits = String::new();
        while let Some(c) = chars.next_if(char::is_ascii_digit) {
            digits.push(c);
        }
        let amount: i64 = digits.parse().map_err(|_| invalid())?;

        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        let mut unit = String::new();
        while let Some(c) = chars.next_if(char::is_ascii_alphabetic) {
            unit.push(c);
        }
        while chars.next_if(|c| c.is_whitespace()).is_some() {}

        let seconds = amount
            .checked_mul(unit_seconds(&unit).ok_or_else(invalid)?)
            .ok_or_else(invalid)?;
        let signed = if negative { -seconds } else { seconds };
        total = total.checked_add(signed).ok_or_else(invalid)?;
    }

    Ok(total)
}
