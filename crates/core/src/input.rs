// Parsing of free-form admin input
//
// Admin forms send numbers and dates as whatever the user typed. Numbers that
// do not parse fall back to a default or previous value; malformed dates and
// times are rejected.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{PortalError, Result};

/// A numeric field as submitted: a JSON number, a string, or anything else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumericInput {
    Number(i64),
    Text(String),
    Other(serde_json::Value),
}

impl NumericInput {
    /// The submitted value as an `i32`, if it is one.
    pub fn parse(&self) -> Option<i32> {
        match self {
            NumericInput::Number(n) => i32::try_from(*n).ok(),
            NumericInput::Text(s) => s.trim().parse::<i32>().ok(),
            NumericInput::Other(_) => None,
        }
    }

    /// Parse an optional non-negative count, using `fallback` when absent,
    /// unparsable or negative.
    pub fn parse_count_or(input: Option<&NumericInput>, fallback: i32) -> i32 {
        input
            .and_then(NumericInput::parse)
            .filter(|n| *n >= 0)
            .unwrap_or(fallback)
    }

    /// Parse an optional nullable field, keeping `previous` when absent or unparsable.
    pub fn parse_or_keep(input: Option<&NumericInput>, previous: Option<i32>) -> Option<i32> {
        input.and_then(NumericInput::parse).or(previous)
    }
}

impl From<i64> for NumericInput {
    fn from(n: i64) -> Self {
        NumericInput::Number(n)
    }
}

impl From<&str> for NumericInput {
    fn from(s: &str) -> Self {
        NumericInput::Text(s.to_string())
    }
}

/// Parse a `YYYY-MM-DD` date. Blank input means no date.
pub fn parse_optional_date(value: &str) -> Result<Option<NaiveDate>> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| PortalError::invalid_input(format!("invalid date: {value}")))
}

/// Parse an `HH:MM` (or `HH:MM:SS`) time of day. Blank input means no time.
pub fn parse_optional_time(value: &str) -> Result<Option<NaiveTime>> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map(Some)
        .map_err(|_| PortalError::invalid_input(format!("invalid time: {value}")))
}
