//! Order grammar parsing: `field[ DIRECTION](,field[ DIRECTION])*`

use std::collections::HashSet;

use crate::error::{QueryFormatError, Result};
use crate::model::{OrderDirection, QueryOrder};

/// Parse an order string. Items are deduplicated by field (first occurrence wins)
/// after `allow` has been applied.
pub fn parse_order<F>(key: &str, value: &str, allow: F) -> Result<Vec<QueryOrder>>
where
    F: Fn(&QueryOrder) -> bool,
{
    tracing::trace!(key, value, "Parsing order string");

    let mut seen = HashSet::new();
    let mut out: Vec<QueryOrder> = Vec::new();
    for item in value.split(',') {
        if item.is_empty() {
            continue;
        }
        let order = parse_order_item(key, item)?;
        if !allow(&order) {
            tracing::trace!(field = order.field(), "Order rejected by allow-list");
            continue;
        }
        if seen.insert(order.field().to_string()) {
            out.push(order);
        }
    }
    Ok(out)
}

fn parse_order_item(key: &str, item: &str) -> Result<QueryOrder> {
    // Trailing separators carry nothing.
    let mut parts = item.trim_end_matches([' ', '+']).split([' ', '+']);
    let field = parts.next().unwrap_or_default();
    if field.is_empty() {
        tracing::debug!(key, item, "Order item has an empty field");
        return Err(QueryFormatError::malformed(key, item));
    }

    let order = match parts.find(|p| !p.is_empty()) {
        None => OrderDirection::Asc,
        Some(direction) => OrderDirection::parse(direction).ok_or_else(|| {
            tracing::debug!(key, direction, "Unknown order direction");
            QueryFormatError::no_such_constant(key, item)
        })?,
    };

    Ok(QueryOrder::new(field, order))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QueryFormatErrorKind;

    fn parse(value: &str) -> Result<Vec<QueryOrder>> {
        parse_order("order", value, |_| true)
    }

    #[test]
    fn defaults_to_ascending() {
        let order = parse("username").unwrap();
        assert_eq!(order[0].field(), "username");
        assert_eq!(order[0].order(), OrderDirection::Asc);
    }

    #[test]
    fn direction_is_case_insensitive() {
        let order = parse("username desc,lastname+Asc").unwrap();
        assert_eq!(order[0].order(), OrderDirection::Desc);
        assert_eq!(order[1].field(), "lastname");
        assert_eq!(order[1].order(), OrderDirection::Asc);
    }

    #[test]
    fn first_occurrence_wins() {
        let order = parse("a,b,a DESC").unwrap();
        assert_eq!(order.len(), 2);
        assert_eq!(order[0].field(), "a");
        assert_eq!(order[0].order(), OrderDirection::Asc);
        assert_eq!(order[1].field(), "b");
    }

    #[test]
    fn empty_items_are_skipped() {
        let order = parse(",,name DESC,").unwrap();
        assert_eq!(order.len(), 1);
    }

    #[test]
    fn leading_separator_is_malformed() {
        let err = parse(" DESC").unwrap_err();
        assert_eq!(err.kind, QueryFormatErrorKind::Malformed);
        assert_eq!(err.key, "order");
    }

    #[test]
    fn trailing_separator_is_ignored() {
        let order = parse("name ,email+").unwrap();
        assert_eq!(order.len(), 2);
        assert!(order.iter().all(|o| o.order() == OrderDirection::Asc));
    }

    #[test]
    fn separator_runs_collapse() {
        let order = parse("name  +DESC").unwrap();
        assert_eq!(order[0].order(), OrderDirection::Desc);
    }

    #[test]
    fn unknown_direction() {
        let err = parse("name DOWN").unwrap_err();
        assert_eq!(err.kind, QueryFormatErrorKind::NoSuchConstant);
    }
}
