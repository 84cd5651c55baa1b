//! Mobile number normalization.

use crate::error::InputError;
use serde::{Deserialize, Serialize};
use std::fmt;

const MIN_DIGITS: usize = 7;
const MAX_DIGITS: usize = 15;
const MAX_COUNTRY_CODE_DIGITS: usize = 3;

/// International dialing code (e.g. "1", "44") used for numbers typed
/// without a leading `+`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryCode(String);

impl CountryCode {
    /// Accepts "44" or "+44".
    pub fn parse(input: &str) -> Result<Self, InputError> {
        let digits = input.trim().strip_prefix('+').unwrap_or(input.trim());

        if digits.is_empty()
            || digits.len() > MAX_COUNTRY_CODE_DIGITS
            || !digits.chars().all(|c| c.is_ascii_digit())
            || digits.starts_with('0')
        {
            return Err(InputError::InvalidMobile(format!(
                "'{}' is not a country code",
                input
            )));
        }

        Ok(Self(digits.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A mobile number in E.164 form (e.g. "+15551234567").
///
/// Only constructed through [`Mobile::parse`] or
/// [`Mobile::parse_with_default_country`], so two equal numbers typed
/// differently compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Mobile(String);

impl Mobile {
    /// Normalize international input (leading `+`) to E.164.
    pub fn parse(input: &str) -> Result<Self, InputError> {
        Self::parse_with_default_country(input, None)
    }

    /// Normalize to E.164, treating input without a leading `+` as a
    /// national number in `default_country`. One trunk `0` is dropped from
    /// national numbers.
    pub fn parse_with_default_country(
        input: &str,
        default_country: Option<&CountryCode>,
    ) -> Result<Self, InputError> {
        normalize(input, default_country)
            .map(Mobile)
            .map_err(InputError::InvalidMobile)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn normalize(number: &str, default_country: Option<&CountryCode>) -> Result<String, String> {
    let trimmed = number.trim();
    let has_plus = trimmed.starts_with('+');

    if trimmed
        .chars()
        .any(|c| !(c.is_ascii_digit() || matches!(c, '+' | ' ' | '-' | '(' | ')' | '.')))
    {
        return Err("Phone number contains invalid characters".into());
    }
    if trimmed.chars().skip(1).any(|c| c == '+') {
        return Err("'+' is only allowed as the first character".into());
    }

    let digits: String = trimmed.chars().filter(|c| c.is_ascii_digit()).collect();

    if digits.is_empty() {
        return Err("Phone number must contain at least one digit".into());
    }

    let digits = if has_plus {
        digits
    } else {
        match default_country {
            Some(country) => {
                let national = digits.strip_prefix('0').unwrap_or(&digits);
                format!("{}{}", country.as_str(), national)
            }
            None => return Err("Phone number must include country code".into()),
        }
    };

    if digits.starts_with('0') {
        return Err("Country code cannot start with 0".into());
    }

    if digits.len() < MIN_DIGITS {
        return Err("Phone number too short".into());
    }

    if digits.len() > MAX_DIGITS {
        return Err("Phone number too long".into());
    }

    Ok(format!("+{}", digits))
}

impl fmt::Display for Mobile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Mobile {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Mobile {
    type Error = InputError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Mobile::parse(&value)
    }
}

impl From<Mobile> for String {
    fn from(mobile: Mobile) -> Self {
        mobile.0
    }
}
