//! Primitive value coercion
//!
//! Filter values stay raw strings in the intermediate representation. A consumer
//! that knows the type of a field asks for a conversion here; failures surface as
//! [`ConversionError`], never as a syntax error.

use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Utc};
use uuid::Uuid;

use crate::error::{ConversionCause, ConversionError};
use crate::temporal;

/// Target shape of a conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueShape {
    /// Verbatim character sequence.
    Text,
    /// No special shape (numbers, custom types); returned verbatim for the consumer.
    Passthrough,
    Boolean,
    /// First character, `'\0'` for an empty string.
    Character,
    /// Every character of the string.
    Characters,
    /// `YYYY-MM-DD`
    Date,
    /// `HH:MM[:SS[.fraction]]`
    Time,
    /// `YYYY-MM-DDTHH:MM[:SS[.fraction]]`
    DateTime,
    /// Time of day with an offset.
    OffsetTime,
    /// Date-time with an offset.
    OffsetDateTime,
    /// Date-time with an offset and an optional `[Region/Id]` suffix.
    ZonedDateTime,
    /// Point on the UTC time line.
    Instant,
    /// ISO-8601 `PnDTnHnMn.nS` duration.
    Duration,
    /// Hyphenated 8-4-4-4-12 UUID.
    Uuid,
    /// One of a closed set of case-sensitive constant names.
    Enum(Vec<String>),
}

impl ValueShape {
    pub fn enumeration<I, S>(constants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Enum(constants.into_iter().map(Into::into).collect())
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Passthrough => "passthrough",
            Self::Boolean => "boolean",
            Self::Character => "character",
            Self::Characters => "characters",
            Self::Date => "date",
            Self::Time => "time",
            Self::DateTime => "date-time",
            Self::OffsetTime => "offset time",
            Self::OffsetDateTime => "offset date-time",
            Self::ZonedDateTime => "zoned date-time",
            Self::Instant => "instant",
            Self::Duration => "duration",
            Self::Uuid => "UUID",
            Self::Enum(_) => "enum",
        }
    }
}

impl fmt::Display for ValueShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Enum(constants) => write!(f, "enum [{}]", constants.join(", ")),
            other => f.write_str(other.name()),
        }
    }
}

/// Result of a successful conversion.
#[derive(Debug, Clone, PartialEq)]
pub enum ConvertedValue {
    Text(String),
    Boolean(bool),
    Character(char),
    Characters(Vec<char>),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
    OffsetTime(NaiveTime, FixedOffset),
    OffsetDateTime(DateTime<FixedOffset>),
    Instant(DateTime<Utc>),
    Duration(TimeDelta),
    Uuid(Uuid),
    Enum(String),
}

impl ConvertedValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) | Self::Enum(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

/// Convert `raw` into `shape`.
pub fn convert(shape: &ValueShape, raw: &str) -> Result<ConvertedValue, ConversionError> {
    let fail = |source: ConversionCause| ConversionError {
        shape: shape.clone(),
        value: raw.to_string(),
        source,
    };

    let converted = match shape {
        ValueShape::Text | ValueShape::Passthrough => ConvertedValue::Text(raw.to_string()),
        ValueShape::Boolean => ConvertedValue::Boolean(raw.eq_ignore_ascii_case("true")),
        ValueShape::Character => ConvertedValue::Character(raw.chars().next().unwrap_or('\0')),
        ValueShape::Characters => ConvertedValue::Characters(raw.chars().collect()),
        ValueShape::Date => {
            ConvertedValue::Date(temporal::parse_date(raw).map_err(|e| fail(e.into()))?)
        }
        ValueShape::Time => {
            ConvertedValue::Time(temporal::parse_time(raw).map_err(|e| fail(e.into()))?)
        }
        ValueShape::DateTime => ConvertedValue::DateTime(
            temporal::parse_local_datetime(raw).map_err(|e| fail(e.into()))?,
        ),
        ValueShape::OffsetTime => {
            let (time, offset) = temporal::parse_offset_time(raw).map_err(|e| fail(e.into()))?;
            ConvertedValue::OffsetTime(time, offset)
        }
        ValueShape::OffsetDateTime => ConvertedValue::OffsetDateTime(
            temporal::parse_offset_datetime(raw).map_err(|e| fail(e.into()))?,
        ),
        ValueShape::ZonedDateTime => ConvertedValue::OffsetDateTime(
            temporal::parse_zoned_datetime(raw).map_err(|e| fail(e.into()))?,
        ),
        ValueShape::Instant => ConvertedValue::Instant(
            temporal::parse_offset_datetime(raw)
                .map_err(|e| fail(e.into()))?
                .with_timezone(&Utc),
        ),
        ValueShape::Duration => {
            ConvertedValue::Duration(temporal::parse_duration(raw).ok_or_else(|| {
                fail(ConversionCause::ShapeMismatch(
                    "expected an ISO-8601 duration such as PT15M".to_string(),
                ))
            })?)
        }
        ValueShape::Uuid => ConvertedValue::Uuid(parse_uuid(raw).map_err(fail)?),
        ValueShape::Enum(constants) => {
            if !constants.iter().any(|c| c == raw) {
                return Err(fail(ConversionCause::ShapeMismatch(format!(
                    "expected one of [{}]",
                    constants.join(", ")
                ))));
            }
            ConvertedValue::Enum(raw.to_string())
        }
    };

    Ok(converted)
}

fn parse_uuid(raw: &str) -> Result<Uuid, ConversionCause> {
    let hyphenated = raw.len() == 36
        && raw
            .char_indices()
            .all(|(i, c)| matches!(i, 8 | 13 | 18 | 23) == (c == '-'));
    if !hyphenated {
        return Err(ConversionCause::ShapeMismatch(
            "expected a hyphenated 8-4-4-4-12 UUID".to_string(),
        ));
    }
    Ok(Uuid::parse_str(raw)?)
}
