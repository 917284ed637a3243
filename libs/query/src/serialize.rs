//! Canonical query-string rendering of [`QueryParameters`].
//!
//! The output is not percent-encoded. Parsing it again with
//! [`crate::parse`] reproduces the same parameters as long as no value contains
//! `&` or `'`, and no field name contains `:`, `,` or a clause separator.

use std::fmt;

use chrono::SecondsFormat;

use crate::model::{FilterValue, QueryFilter, QueryParameters};
use crate::pairs::QueryKey;

impl QueryParameters {
    /// Render as `limit=..&offset=..&order=..&fields=..&filter=..`, omitting
    /// absent and empty parts.
    pub fn to_query_string(&self) -> String {
        let mut pairs: Vec<(QueryKey, String)> = Vec::new();

        if let Some(limit) = self.limit {
            pairs.push((QueryKey::Limit, limit.to_string()));
        }
        if let Some(offset) = self.offset {
            pairs.push((QueryKey::Offset, offset.to_string()));
        }
        if !self.order.is_empty() {
            let order = self
                .order
                .iter()
                .map(|o| format!("{} {}", o.field(), o.order()))
                .collect::<Vec<_>>()
                .join(",");
            pairs.push((QueryKey::Order, order));
        }
        if !self.fields.is_empty() {
            pairs.push((QueryKey::Fields, self.fields.join(",")));
        }
        if !self.filters.is_empty() {
            let filters = self
                .filters
                .iter()
                .map(render_filter)
                .collect::<Vec<_>>()
                .join(" ");
            pairs.push((QueryKey::Filter, filters));
        }

        pairs
            .into_iter()
            .map(|(key, value)| format!("{}={}", key.canonical(), value))
            .collect::<Vec<_>>()
            .join("&")
    }
}

impl fmt::Display for QueryParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_query_string())
    }
}

fn render_filter(filter: &QueryFilter) -> String {
    let head = format!("{}:{}", filter.field(), filter.operation());
    match filter.filter_value() {
        FilterValue::None => head,
        FilterValue::Scalar(value) => format!("{}:{}", head, quote_if_needed(value, false)),
        FilterValue::Date(date) => format!(
            "{}:dt'{}'",
            head,
            date.to_rfc3339_opts(SecondsFormat::AutoSi, true)
        ),
        FilterValue::List(values) => format!(
            "{}:[{}]",
            head,
            values
                .iter()
                .map(|v| quote_if_needed(v, true))
                .collect::<Vec<_>>()
                .join(",")
        ),
    }
}

fn quote_if_needed(value: &str, in_list: bool) -> String {
    let needs_quotes = value.is_empty()
        || value.contains([' ', '+', ':'])
        || (in_list && value.contains([',', '[', ']']))
        || (!in_list && (value.starts_with('[') || value.starts_with("dt'")));
    if needs_quotes {
        format!("'{}'", value)
    } else {
        value.to_string()
    }
}
