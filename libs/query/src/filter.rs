//! Filter grammar parsing
//!
//! ```text
//! filter_string := clause (SEP clause)*          SEP: runs of ' ' or '+' outside quotes
//! clause        := field ':' operator (':' value)?
//! value         := '[' items ']' | "dt'" ISO-8601 "'" | "'" text "'" | bare
//! ```
//!
//! Clause policy:
//! - 2 tokens: the operator is validated; a unary operator yields a filter without a
//!   value, any other known operator drops the clause without consulting the
//!   allow-list.
//! - 3 tokens: the value is classified by the operator's arity.
//! - any other token count drops the clause.

use std::collections::HashSet;

use chrono::Utc;

use crate::error::{QueryFormatError, Result};
use crate::model::{Arity, FilterOperation, FilterValue, QueryFilter};
use crate::split::{split_unquoted, split_unquoted_nonempty, strip_quotes};
use crate::temporal::parse_zoned_datetime;

fn is_clause_separator(c: char) -> bool {
    c == ' ' || c == '+'
}

/// Parse a filter string. `allow` decides which structurally valid filters are kept.
pub fn parse_filters<F>(key: &str, value: &str, allow: F) -> Result<Vec<QueryFilter>>
where
    F: Fn(&QueryFilter) -> bool,
{
    tracing::trace!(key, value, "Parsing filter string");

    let mut filters = Vec::new();
    for clause in split_unquoted_nonempty(value, is_clause_separator) {
        let Some(filter) = parse_clause(key, clause)? else {
            continue;
        };
        if !allow(&filter) {
            tracing::trace!(field = filter.field(), "Filter rejected by allow-list");
            continue;
        }
        filters.push(filter);
    }
    Ok(filters)
}

fn parse_clause(key: &str, clause: &str) -> Result<Option<QueryFilter>> {
    let mut tokens = split_unquoted(clause, |c| c == ':').into_iter();
    let field = tokens.next().unwrap_or_default();
    let rest: Vec<&str> = tokens.filter(|t| !t.is_empty()).collect();

    if field.is_empty() {
        if rest.is_empty() {
            return Ok(None);
        }
        tracing::debug!(key, clause, "Filter clause has an empty field");
        return Err(QueryFormatError::malformed(key, clause));
    }

    match rest.as_slice() {
        [operator] => {
            let operation = parse_operation(key, operator)?;
            if operation.is_unary() {
                Ok(Some(QueryFilter::unary(field, operation)))
            } else {
                tracing::trace!(clause, "Dropping non-unary filter clause without a value");
                Ok(None)
            }
        }
        [operator, raw] => {
            let operation = parse_operation(key, operator)?;
            let value = parse_value(key, operation, raw)?;
            Ok(Some(QueryFilter::new(field, operation, value)))
        }
        _ => {
            tracing::trace!(clause, "Dropping filter clause with unsupported token count");
            Ok(None)
        }
    }
}

fn parse_operation(key: &str, operator: &str) -> Result<FilterOperation> {
    FilterOperation::parse(operator).ok_or_else(|| {
        tracing::debug!(key, operator, "Unknown filter operation");
        QueryFormatError::no_such_constant(key, operator)
    })
}

fn parse_value(key: &str, operation: FilterOperation, raw: &str) -> Result<FilterValue> {
    match operation.arity() {
        Arity::Unary => return Ok(FilterValue::None),
        Arity::List => {
            if let Some(items) = raw.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
                return Ok(FilterValue::List(parse_list(items)));
            }
        }
        Arity::Scalar => {}
    }

    if let Some(literal) = raw.strip_prefix("dt'").and_then(|s| s.strip_suffix('\'')) {
        let date = parse_zoned_datetime(literal).map_err(|err| {
            tracing::debug!(key, literal, error = %err, "Malformed date literal");
            QueryFormatError::malformed(key, raw)
        })?;
        return Ok(FilterValue::Date(date.with_timezone(&Utc)));
    }

    Ok(FilterValue::Scalar(strip_quotes(raw).to_string()))
}

fn parse_list(items: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut values: Vec<String> = Vec::new();
    for item in split_unquoted(items, |c| c == ',') {
        if item.is_empty() {
            continue;
        }
        let item = strip_quotes(item);
        if seen.insert(item) {
            values.push(item.to_string());
        }
    }
    values
}
