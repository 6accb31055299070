use chrono::FixedOffset;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use thiserror::Error;

/// A UTC offset in the `±HH:MM` notation the geolocation service uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimezoneOffset(FixedOffset);

#[derive(Error, Debug, PartialEq)]
#[error("invalid UTC offset '{0}', expected ±HH:MM")]
pub struct InvalidTimezoneOffset(String);

impl FromStr for TimezoneOffset {
    type Err = InvalidTimezoneOffset;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidTimezoneOffset(s.to_string());

        let (sign, rest) = match s.as_bytes().first() {
            Some(b'+') => (1, &s[1..]),
            Some(b'-') => (-1, &s[1..]),
            _ => return Err(invalid()),
        };

        let (hours, minutes) = rest.split_once(':').ok_or_else(invalid)?;
        let is_two_digits = |part: &str| part.len() == 2 && part.bytes().all(|b| b.is_ascii_digit());
        if !is_two_digits(hours) || !is_two_digits(minutes) {
            return Err(invalid());
        }

        let hours: i32 = hours.parse().map_err(|_| invalid())?;
        let minutes: i32 = minutes.parse().map_err(|_| invalid())?;
        if hours > 14 || minutes > 59 {
            return Err(invalid());
        }

        FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
            .map(TimezoneOffset)
            .ok_or_else(invalid)
    }
}

impl Display for TimezoneOffset {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
