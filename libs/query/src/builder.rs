//! Parse configuration and the per-request builder
//!
//! [`QueryDefaults`] is built once (or loaded from the host's configuration),
//! shared freely across threads and used to start any number of parse runs.
//! [`QueryStringBuilder`] holds a single run: it is consumed by
//! [`QueryStringBuilder::build`], so per-request input can never leak into
//! another request.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{QueryFormatError, QueryFormatErrorKind, Result};
use crate::fields::{parse_fields, parse_limit, parse_offset};
use crate::filter::parse_filters;
use crate::model::{QueryFilter, QueryOrder, QueryParameters};
use crate::order::parse_order;
use crate::pairs::{decode, extract_query, QueryKey, QueryPairs};

/// Allow-list predicate over parsed filters.
pub type FilterPredicate = Arc<dyn Fn(&QueryFilter) -> bool + Send + Sync>;
/// Allow-list predicate over parsed order items.
pub type OrderPredicate = Arc<dyn Fn(&QueryOrder) -> bool + Send + Sync>;
/// Allow-list predicate over projected field names.
pub type FieldPredicate = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Default upper bound on the length of a query string, in bytes.
pub const DEFAULT_MAX_QUERY_LENGTH: usize = 8192;

/// Reusable parse configuration.
///
/// `Default` gives a page size of 10 (at most 100) starting at offset 0 with every
/// grammar enabled. Deserializing fills omitted settings from `Default`; predicates
/// can only be set in code.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryDefaults {
    pub pagination_enabled: bool,
    pub filters_enabled: bool,
    pub order_enabled: bool,
    pub fields_enabled: bool,
    pub max_limit: Option<u64>,
    pub default_limit: Option<u64>,
    pub default_offset: Option<u64>,
    pub max_query_length: usize,
    #[serde(skip)]
    filter_predicate: Option<FilterPredicate>,
    #[serde(skip)]
    order_predicate: Option<OrderPredicate>,
    #[serde(skip)]
    field_predicate: Option<FieldPredicate>,
}

impl Default for QueryDefaults {
    fn default() -> Self {
        Self {
            max_limit: Some(100),
            default_limit: Some(10),
            default_offset: Some(0),
            ..Self::unbounded()
        }
    }
}

impl fmt::Debug for QueryDefaults {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryDefaults")
            .field("pagination_enabled", &self.pagination_enabled)
            .field("filters_enabled", &self.filters_enabled)
            .field("order_enabled", &self.order_enabled)
            .field("fields_enabled", &self.fields_enabled)
            .field("max_limit", &self.max_limit)
            .field("default_limit", &self.default_limit)
            .field("default_offset", &self.default_offset)
            .field("max_query_length", &self.max_query_length)
            .field("filter_predicate", &self.filter_predicate.is_some())
            .field("order_predicate", &self.order_predicate.is_some())
            .field("field_predicate", &self.field_predicate.is_some())
            .finish()
    }
}

impl QueryDefaults {
    /// Configuration without default paging and without a maximum limit.
    pub fn unbounded() -> Self {
        Self {
            pagination_enabled: true,
            filters_enabled: true,
            order_enabled: true,
            fields_enabled: true,
            max_limit: None,
            default_limit: None,
            default_offset: None,
            max_query_length: DEFAULT_MAX_QUERY_LENGTH,
            filter_predicate: None,
            order_predicate: None,
            field_predicate: None,
        }
    }

    pub fn enable_pagination(mut self, enable: bool) -> Self {
        self.pagination_enabled = enable;
        self
    }

    pub fn enable_filters(mut self, enable: bool) -> Self {
        self.filters_enabled = enable;
        self
    }

    pub fn enable_order(mut self, enable: bool) -> Self {
        self.order_enabled = enable;
        self
    }

    pub fn enable_fields(mut self, enable: bool) -> Self {
        self.fields_enabled = enable;
        self
    }

    pub fn max_limit(mut self, limit: u64) -> Self {
        self.max_limit = Some(limit);
        self
    }

    pub fn default_limit(mut self, limit: u64) -> Self {
        self.default_limit = Some(limit);
        self
    }

    pub fn default_offset(mut self, offset: u64) -> Self {
        self.default_offset = Some(offset);
        self
    }

    /// Signed variant of [`Self::max_limit`]; negative values are rejected.
    pub fn try_max_limit(self, limit: i64) -> Result<Self> {
        Ok(self.max_limit(non_negative_setting("max_limit", limit)?))
    }

    /// Signed variant of [`Self::default_limit`]; negative values are rejected.
    pub fn try_default_limit(self, limit: i64) -> Result<Self> {
        Ok(self.default_limit(non_negative_setting("default_limit", limit)?))
    }

    /// Signed variant of [`Self::default_offset`]; negative values are rejected.
    pub fn try_default_offset(self, offset: i64) -> Result<Self> {
        Ok(self.default_offset(non_negative_setting("default_offset", offset)?))
    }

    pub fn max_query_length(mut self, bytes: usize) -> Self {
        self.max_query_length = bytes;
        self
    }

    pub fn allow_filter<P>(mut self, predicate: P) -> Self
    where
        P: Fn(&QueryFilter) -> bool + Send + Sync + 'static,
    {
        self.filter_predicate = Some(Arc::new(predicate));
        self
    }

    pub fn allow_order<P>(mut self, predicate: P) -> Self
    where
        P: Fn(&QueryOrder) -> bool + Send + Sync + 'static,
    {
        self.order_predicate = Some(Arc::new(predicate));
        self
    }

    pub fn allow_field<P>(mut self, predicate: P) -> Self
    where
        P: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.field_predicate = Some(Arc::new(predicate));
        self
    }

    /// Start a parse run preconfigured with these settings.
    pub fn builder(&self) -> QueryStringBuilder {
        QueryStringBuilder {
            config: self.clone(),
            query: None,
        }
    }

    /// Shorthand for `self.builder().query(query).build()`.
    pub fn parse(&self, query: &str) -> Result<QueryParameters> {
        self.builder().query(query).build()
    }

    fn allows_filter(&self, filter: &QueryFilter) -> bool {
        self.filter_predicate.as_ref().map_or(true, |p| p(filter))
    }

    fn allows_order(&self, order: &QueryOrder) -> bool {
        self.order_predicate.as_ref().map_or(true, |p| p(order))
    }

    fn allows_field(&self, field: &str) -> bool {
        self.field_predicate.as_ref().map_or(true, |p| p(field))
    }
}

fn non_negative_setting(name: &str, value: i64) -> Result<u64> {
    u64::try_from(value).map_err(|_| QueryFormatError::negative(name, &value.to_string()))
}

/// A single parse run.
///
/// ```
/// use lynx_query::{FilterOperation, QueryStringBuilder};
///
/// let params = QueryStringBuilder::new()
///     .max_limit(50)
///     .query("limit=200&filter=name:eq:'John Doe'")
///     .build()
///     .unwrap();
///
/// assert_eq!(params.limit(), Some(50));
/// assert_eq!(params.filters()[0].operation(), FilterOperation::Eq);
/// assert_eq!(params.filters()[0].value(), Some("John Doe"));
/// ```
#[derive(Debug, Clone)]
pub struct QueryStringBuilder {
    config: QueryDefaults,
    query: Option<String>,
}

impl Default for QueryStringBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryStringBuilder {
    /// A run with every grammar enabled, no default paging and no maximum limit.
    pub fn new() -> Self {
        QueryDefaults::unbounded().builder()
    }

    /// Query string that is already decoded.
    pub fn query(mut self, query: &str) -> Self {
        tracing::trace!(query, "Setting query string");
        self.query = Some(query.to_string());
        self
    }

    /// Percent-encoded query string.
    pub fn query_encoded(self, query: &str) -> Self {
        let decoded = decode(query).into_owned();
        self.query(&decoded)
    }

    /// Full URI (or path with query); only the query component is parsed. A URI
    /// without a query leaves the run with defaults only.
    pub fn uri(mut self, uri: &str) -> Self {
        tracing::trace!(uri, "Setting URI string");
        self.query = extract_query(uri).map(str::to_string);
        self
    }

    /// Percent-encoded URI.
    pub fn uri_encoded(self, uri: &str) -> Self {
        let decoded = decode(uri).into_owned();
        self.uri(&decoded)
    }

    /// Parsed URL; its raw (still encoded) query component is used as-is.
    ///
    /// `Url` percent-encodes quotes and spaces in the query, so quoted filter
    /// values only survive through [`Self::url_encoded`].
    pub fn url(mut self, url: &url::Url) -> Self {
        tracing::trace!(url = %url, "Setting URL");
        self.query = url.query().map(str::to_string);
        self
    }

    /// Parsed URL whose query component is percent-decoded before parsing.
    pub fn url_encoded(mut self, url: &url::Url) -> Self {
        tracing::trace!(url = %url, "Setting encoded URL");
        self.query = url.query().map(|q| decode(q).into_owned());
        self
    }

    pub fn enable_pagination(mut self, enable: bool) -> Self {
        self.config = self.config.enable_pagination(enable);
        self
    }

    pub fn enable_filters(mut self, enable: bool) -> Self {
        self.config = self.config.enable_filters(enable);
        self
    }

    pub fn enable_order(mut self, enable: bool) -> Self {
        self.config = self.config.enable_order(enable);
        self
    }

    pub fn enable_fields(mut self, enable: bool) -> Self {
        self.config = self.config.enable_fields(enable);
        self
    }

    pub fn max_limit(mut self, limit: u64) -> Self {
        self.config = self.config.max_limit(limit);
        self
    }

    pub fn default_limit(mut self, limit: u64) -> Self {
        self.config = self.config.default_limit(limit);
        self
    }

    pub fn default_offset(mut self, offset: u64) -> Self {
        self.config = self.config.default_offset(offset);
        self
    }

    pub fn try_max_limit(mut self, limit: i64) -> Result<Self> {
        self.config = self.config.try_max_limit(limit)?;
        Ok(self)
    }

    pub fn try_default_limit(mut self, limit: i64) -> Result<Self> {
        self.config = self.config.try_default_limit(limit)?;
        Ok(self)
    }

    pub fn try_default_offset(mut self, offset: i64) -> Result<Self> {
        self.config = self.config.try_default_offset(offset)?;
        Ok(self)
    }

    pub fn max_query_length(mut self, bytes: usize) -> Self {
        self.config = self.config.max_query_length(bytes);
        self
    }

    pub fn allow_filter<P>(mut self, predicate: P) -> Self
    where
        P: Fn(&QueryFilter) -> bool + Send + Sync + 'static,
    {
        self.config = self.config.allow_filter(predicate);
        self
    }

    pub fn allow_order<P>(mut self, predicate: P) -> Self
    where
        P: Fn(&QueryOrder) -> bool + Send + Sync + 'static,
    {
        self.config = self.config.allow_order(predicate);
        self
    }

    pub fn allow_field<P>(mut self, predicate: P) -> Self
    where
        P: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.config = self.config.allow_field(predicate);
        self
    }

    /// Compile the query string over the configured defaults.
    ///
    /// Pagination keys overwrite (last occurrence wins); each occurrence of
    /// `order`, `fields` or `filter` replaces the whole collection.
    pub fn build(self) -> Result<QueryParameters> {
        let config = &self.config;
        let mut params = QueryParameters::default();

        if config.pagination_enabled {
            params.limit = config.default_limit;
            params.offset = config.default_offset;
        }

        let Some(query) = self.query.as_deref().filter(|q| !q.is_empty()) else {
            return Ok(params);
        };

        tracing::trace!(query, "Building query parameters");

        if query.len() > config.max_query_length {
            tracing::debug!(
                length = query.len(),
                max = config.max_query_length,
                "Query string exceeds maximum length"
            );
            return Err(QueryFormatError {
                key: "query".to_string(),
                value: None,
                kind: QueryFormatErrorKind::Malformed,
            });
        }

        for (key, value) in QueryPairs::new(query) {
            let Some(query_key) = QueryKey::resolve(key) else {
                tracing::trace!(key, "Ignoring unknown query parameter");
                continue;
            };

            match query_key {
                QueryKey::Limit if config.pagination_enabled => {
                    params.limit = Some(parse_limit(key, value, config.max_limit)?);
                }
                QueryKey::Offset if config.pagination_enabled => {
                    params.offset = Some(parse_offset(key, value)?);
                }
                QueryKey::Order if config.order_enabled => {
                    params.order = parse_order(key, value, |o| config.allows_order(o))?;
                }
                QueryKey::Fields if config.fields_enabled => {
                    params.fields = parse_fields(value, |f| config.allows_field(f));
                }
                QueryKey::Filter if config.filters_enabled => {
                    params.filters = parse_filters(key, value, |f| config.allows_filter(f))?;
                }
                disabled => {
                    tracing::trace!(key = disabled.canonical(), "Ignoring disabled query parameter");
                }
            }
        }

        Ok(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_query() {
        let params = QueryDefaults::default().parse("").unwrap();
        assert_eq!(params.limit(), Some(10));
        assert_eq!(params.offset(), Some(0));
    }

    #[test]
    fn fresh_builder_has_no_defaults() {
        let params = QueryStringBuilder::new().query("").build().unwrap();
        assert!(params.is_empty());
    }

    #[test]
    fn negative_settings_are_rejected() {
        let err = QueryDefaults::default().try_max_limit(-1).unwrap_err();
        assert_eq!(err.kind, QueryFormatErrorKind::Negative);
        assert_eq!(err.key, "max_limit");

        let builder = QueryStringBuilder::new().try_default_offset(5).unwrap();
        assert_eq!(builder.query("").build().unwrap().offset(), Some(5));
    }

    #[test]
    fn overlong_query_is_rejected() {
        let err = QueryStringBuilder::new()
            .max_query_length(8)
            .query("limit=1234567")
            .build()
            .unwrap_err();
        assert_eq!(err.kind, QueryFormatErrorKind::Malformed);
        assert_eq!(err.key, "query");
    }

    #[test]
    fn debug_hides_predicates() {
        let defaults = QueryDefaults::default().allow_field(|f| f == "id");
        let rendered = format!("{:?}", defaults);
        assert!(rendered.contains("field_predicate: true"));
        assert!(rendered.contains("order_predicate: false"));
    }
}
