//! Field projection and pagination parsing

use std::collections::HashSet;

use crate::error::{QueryFormatError, Result};

/// Parse a comma-separated field list. Empty elements are skipped, duplicates
/// removed (first occurrence wins) and `allow` filters individual names.
pub fn parse_fields<F>(value: &str, allow: F) -> Vec<String>
where
    F: Fn(&str) -> bool,
{
    tracing::trace!(value, "Parsing fields string");

    let mut seen = HashSet::new();
    let mut fields: Vec<String> = Vec::new();
    for field in value.split(',') {
        if field.is_empty() || !allow(field) {
            continue;
        }
        if seen.insert(field) {
            fields.push(field.to_string());
        }
    }
    fields
}

/// Parse a non-negative base-10 integer.
pub fn parse_count(key: &str, value: &str) -> Result<u64> {
    let parsed: i64 = value.parse().map_err(|_| {
        tracing::debug!(key, value, "Pagination value is not a number");
        QueryFormatError::not_a_number(key, value)
    })?;
    u64::try_from(parsed).map_err(|_| {
        tracing::debug!(key, value, "Pagination value is negative");
        QueryFormatError::negative(key, value)
    })
}

/// Parse a limit, silently clamped to `max_limit` when one is configured.
pub fn parse_limit(key: &str, value: &str, max_limit: Option<u64>) -> Result<u64> {
    let limit = parse_count(key, value)?;
    Ok(match max_limit {
        Some(max) if limit > max => {
            tracing::trace!(limit, max, "Clamping limit");
            max
        }
        _ => limit,
    })
}

pub fn parse_offset(key: &str, value: &str) -> Result<u64> {
    parse_count(key, value)
}
