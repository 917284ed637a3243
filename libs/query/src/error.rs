//! Error types for the query-string compiler
//!
//! Two disjoint families:
//! - [`QueryFormatError`]: syntax-level failures raised while compiling a query string.
//! - [`ConversionError`]: failures raised later, when a consumer coerces a raw filter
//!   value into a typed shape.

use std::fmt;

use thiserror::Error;

use crate::convert::ValueShape;

/// Result type alias
pub type Result<T> = std::result::Result<T, QueryFormatError>;

/// Closed taxonomy of syntax-level failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QueryFormatErrorKind {
    /// The value is not a base-10 integer.
    NotANumber,
    /// The value is a negative integer.
    Negative,
    /// The value does not follow the expected grammar.
    Malformed,
    /// An operator or direction keyword does not exist.
    NoSuchConstant,
}

impl QueryFormatErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotANumber => "NOT_A_NUMBER",
            Self::Negative => "NEGATIVE",
            Self::Malformed => "MALFORMED",
            Self::NoSuchConstant => "NO_SUCH_CONSTANT",
        }
    }
}

impl fmt::Display for QueryFormatErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A query string failed to compile.
///
/// Always carries the query parameter key exactly as the client spelled it
/// (`limit`, `max`, `where`, ...) and, where one exists, the offending raw value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}", render(.key, .value, .kind))]
pub struct QueryFormatError {
    pub key: String,
    pub value: Option<String>,
    pub kind: QueryFormatErrorKind,
}

impl QueryFormatError {
    pub fn new(key: impl Into<String>, value: impl Into<String>, kind: QueryFormatErrorKind) -> Self {
        Self {
            key: key.into(),
            value: Some(value.into()),
            kind,
        }
    }

    pub fn not_a_number(key: &str, value: &str) -> Self {
        Self::new(key, value, QueryFormatErrorKind::NotANumber)
    }

    pub fn negative(key: &str, value: &str) -> Self {
        Self::new(key, value, QueryFormatErrorKind::Negative)
    }

    pub fn malformed(key: &str, value: &str) -> Self {
        Self::new(key, value, QueryFormatErrorKind::Malformed)
    }

    pub fn no_such_constant(key: &str, value: &str) -> Self {
        Self::new(key, value, QueryFormatErrorKind::NoSuchConstant)
    }

    pub fn kind(&self) -> QueryFormatErrorKind {
        self.kind
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

fn render(key: &str, value: &Option<String>, kind: &QueryFormatErrorKind) -> String {
    let what = match kind {
        QueryFormatErrorKind::NotANumber => "is not a number",
        QueryFormatErrorKind::Negative => "is negative",
        QueryFormatErrorKind::Malformed => "is malformed",
        QueryFormatErrorKind::NoSuchConstant => "references a constant that does not exist",
    };
    match value.as_deref() {
        Some(value) => format!("value for '{}' {}: '{}'", key, what, value),
        None => format!("value for '{}' {}", key, what),
    }
}

/// A raw filter value could not be converted into the requested shape.
#[derive(Error, Debug)]
#[error("cannot convert '{value}' to {shape}")]
pub struct ConversionError {
    pub shape: ValueShape,
    pub value: String,
    #[source]
    pub source: ConversionCause,
}

/// Underlying reason a conversion failed.
#[derive(Error, Debug)]
pub enum ConversionCause {
    #[error("date/time parse error: {0}")]
    Temporal(#[from] chrono::ParseError),

    #[error("UUID parse error: {0}")]
    Uuid(#[from] uuid::Error),

    #[error("{0}")]
    ShapeMismatch(String),
}
