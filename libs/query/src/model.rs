//! Intermediate representation produced by the query-string compiler
//!
//! A [`QueryParameters`] value is handed to a store-specific translator, which
//! resolves every `field` (an opaque dot-separated path) against its own schema.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::convert::{convert, ConvertedValue, ValueShape};
use crate::error::ConversionError;

/// Filter comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FilterOperation {
    Eq,
    EqIc,
    Neq,
    NeqIc,
    Like,
    LikeIc,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
    InIc,
    Nin,
    NinIc,
    IsNull,
    IsNotNull,
}

/// Shape of the value an operator carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// No value (`ISNULL`, `ISNOTNULL`).
    Unary,
    /// A single value.
    Scalar,
    /// A list of values (`IN`, `NIN` and their case-insensitive variants).
    List,
}

impl FilterOperation {
    pub const ALL: [FilterOperation; 16] = [
        Self::Eq,
        Self::EqIc,
        Self::Neq,
        Self::NeqIc,
        Self::Like,
        Self::LikeIc,
        Self::Gt,
        Self::Gte,
        Self::Lt,
        Self::Lte,
        Self::In,
        Self::InIc,
        Self::Nin,
        Self::NinIc,
        Self::IsNull,
        Self::IsNotNull,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "EQ",
            Self::EqIc => "EQIC",
            Self::Neq => "NEQ",
            Self::NeqIc => "NEQIC",
            Self::Like => "LIKE",
            Self::LikeIc => "LIKEIC",
            Self::Gt => "GT",
            Self::Gte => "GTE",
            Self::Lt => "LT",
            Self::Lte => "LTE",
            Self::In => "IN",
            Self::InIc => "INIC",
            Self::Nin => "NIN",
            Self::NinIc => "NINIC",
            Self::IsNull => "ISNULL",
            Self::IsNotNull => "ISNOTNULL",
        }
    }

    /// Case-insensitive keyword lookup.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|op| op.as_str().eq_ignore_ascii_case(value))
    }

    pub fn arity(self) -> Arity {
        match self {
            Self::IsNull | Self::IsNotNull => Arity::Unary,
            Self::In | Self::InIc | Self::Nin | Self::NinIc => Arity::List,
            _ => Arity::Scalar,
        }
    }

    pub fn is_unary(self) -> bool {
        self.arity() == Arity::Unary
    }

    pub fn is_list(self) -> bool {
        self.arity() == Arity::List
    }

    /// Whether the comparison ignores letter case (`*IC` variants).
    pub fn is_case_insensitive(self) -> bool {
        matches!(
            self,
            Self::EqIc | Self::NeqIc | Self::LikeIc | Self::InIc | Self::NinIc
        )
    }
}

impl fmt::Display for FilterOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned by `FromStr` for operator and direction keywords.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no such constant: '{0}'")]
pub struct UnknownConstant(pub String);

impl FromStr for FilterOperation {
    type Err = UnknownConstant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| UnknownConstant(s.to_string()))
    }
}

/// Sort direction (default: ascending).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderDirection {
    #[default]
    Asc,
    Desc,
}

impl OrderDirection {
    pub fn parse(value: &str) -> Option<Self> {
        if value.eq_ignore_ascii_case("asc") {
            Some(Self::Asc)
        } else if value.eq_ignore_ascii_case("desc") {
            Some(Self::Desc)
        } else {
            None
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }

    pub fn is_ascending(self) -> bool {
        self == Self::Asc
    }
}

impl fmt::Display for OrderDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderDirection {
    type Err = UnknownConstant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| UnknownConstant(s.to_string()))
    }
}

/// Value carried by a filter; exactly one representation is populated.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FilterValue {
    /// Unary operator, or a pass-through scalar filter without a value.
    #[default]
    None,
    Scalar(String),
    /// Typed `dt'...'` literal.
    Date(DateTime<Utc>),
    List(Vec<String>),
}

/// One `field:operator[:value]` clause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryFilter {
    field: String,
    operation: FilterOperation,
    value: FilterValue,
}

impl QueryFilter {
    pub fn new(field: impl Into<String>, operation: FilterOperation, value: FilterValue) -> Self {
        Self {
            field: field.into(),
            operation,
            value,
        }
    }

    pub fn unary(field: impl Into<String>, operation: FilterOperation) -> Self {
        Self::new(field, operation, FilterValue::None)
    }

    pub fn scalar(
        field: impl Into<String>,
        operation: FilterOperation,
        value: impl Into<String>,
    ) -> Self {
        Self::new(field, operation, FilterValue::Scalar(value.into()))
    }

    pub fn date(field: impl Into<String>, operation: FilterOperation, value: DateTime<Utc>) -> Self {
        Self::new(field, operation, FilterValue::Date(value))
    }

    pub fn list(field: impl Into<String>, operation: FilterOperation, values: Vec<String>) -> Self {
        Self::new(field, operation, FilterValue::List(values))
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn operation(&self) -> FilterOperation {
        self.operation
    }

    pub fn filter_value(&self) -> &FilterValue {
        &self.value
    }

    /// Scalar value, if any.
    pub fn value(&self) -> Option<&str> {
        match &self.value {
            FilterValue::Scalar(v) => Some(v),
            _ => None,
        }
    }

    /// Date literal value, if any.
    pub fn date_value(&self) -> Option<DateTime<Utc>> {
        match &self.value {
            FilterValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// List values; empty unless the filter carries a list.
    pub fn values(&self) -> &[String] {
        match &self.value {
            FilterValue::List(vs) => vs,
            _ => &[],
        }
    }

    /// A scalar operation without a value. Translators treat it as a no-op.
    pub fn is_pass_through(&self) -> bool {
        self.operation.arity() == Arity::Scalar && self.value == FilterValue::None
    }

    /// Convert the scalar value into `shape`. `Ok(None)` when there is no scalar value.
    pub fn convert_value(
        &self,
        shape: &ValueShape,
    ) -> std::result::Result<Option<ConvertedValue>, ConversionError> {
        self.value().map(|v| convert(shape, v)).transpose()
    }

    /// Convert every list value into `shape`, stopping at the first failure.
    pub fn convert_values(
        &self,
        shape: &ValueShape,
    ) -> std::result::Result<Vec<ConvertedValue>, ConversionError> {
        self.values().iter().map(|v| convert(shape, v)).collect()
    }
}

/// One `field [direction]` sort item. Identity is the field alone.
#[derive(Debug, Clone, Serialize)]
pub struct QueryOrder {
    field: String,
    order: OrderDirection,
}

impl QueryOrder {
    pub fn new(field: impl Into<String>, order: OrderDirection) -> Self {
        Self {
            field: field.into(),
            order,
        }
    }

    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, OrderDirection::Asc)
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, OrderDirection::Desc)
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn order(&self) -> OrderDirection {
        self.order
    }
}

impl PartialEq for QueryOrder {
    fn eq(&self, other: &Self) -> bool {
        self.field == other.field
    }
}

impl Eq for QueryOrder {}

impl Hash for QueryOrder {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.field.hash(state);
    }
}

/// Compiled query string.
///
/// Collections are never absent, only empty. Filters are AND-combined in order;
/// order items are most-significant first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QueryParameters {
    pub(crate) limit: Option<u64>,
    pub(crate) offset: Option<u64>,
    pub(crate) order: Vec<QueryOrder>,
    pub(crate) fields: Vec<String>,
    pub(crate) filters: Vec<QueryFilter>,
}

impl QueryParameters {
    pub fn limit(&self) -> Option<u64> {
        self.limit
    }

    pub fn offset(&self) -> Option<u64> {
        self.offset
    }

    pub fn order(&self) -> &[QueryOrder] {
        &self.order
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn filters(&self) -> &[QueryFilter] {
        &self.filters
    }

    pub fn is_empty(&self) -> bool {
        self.limit.is_none()
            && self.offset.is_none()
            && self.order.is_empty()
            && self.fields.is_empty()
            && self.filters.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operation_keywords_are_case_insensitive() {
        assert_eq!(FilterOperation::parse("eq"), Some(FilterOperation::Eq));
        assert_eq!(FilterOperation::parse("IsNotNull"), Some(FilterOperation::IsNotNull));
        assert_eq!(FilterOperation::parse("ninic"), Some(FilterOperation::NinIc));
        assert_eq!(FilterOperation::parse("equal"), None);
        assert!("bogus".parse::<FilterOperation>().is_err());
    }

    #[test]
    fn operation_arity() {
        assert_eq!(FilterOperation::IsNull.arity(), Arity::Unary);
        assert_eq!(FilterOperation::InIc.arity(), Arity::List);
        assert_eq!(FilterOperation::LikeIc.arity(), Arity::Scalar);
        assert!(FilterOperation::NeqIc.is_case_insensitive());
        assert!(!FilterOperation::Gte.is_case_insensitive());
    }

    #[test]
    fn order_identity_is_field_only() {
        assert_eq!(QueryOrder::asc("name"), QueryOrder::desc("name"));
        assert_ne!(QueryOrder::asc("name"), QueryOrder::asc("email"));
    }

    #[test]
    fn filter_accessors_follow_value_shape() {
        let f = QueryFilter::list("id", FilterOperation::In, vec!["1".into(), "2".into()]);
        assert_eq!(f.values(), ["1", "2"]);
        assert!(f.value().is_none());
        assert!(f.date_value().is_none());

        let f = QueryFilter::new("name", FilterOperation::Eq, FilterValue::None);
        assert!(f.is_pass_through());
        assert!(f.values().is_empty());

        assert!(!QueryFilter::unary("deleted_at", FilterOperation::IsNull).is_pass_through());
    }

    #[test]
    fn default_parameters_are_empty() {
        let params = QueryParameters::default();
        assert!(params.is_empty());
        assert!(params.filters().is_empty());
        assert!(params.order().is_empty());
    }
}
