#![forbid(unsafe_code)]

//! Lynx query-string compiler
//!
//! Compiles the compact query DSL used by REST collection endpoints into a
//! validated, store-independent intermediate representation:
//!
//! ```text
//! ?limit=20&offset=40&order=lastname DESC,firstname&fields=id,email
//!  &filter=lastname:likeic:'van %' age:gte:18 id:in:[1,2,3] created:lt:dt'2024-01-01T00:00:00Z'
//!      |
//!   QueryPairs (split on '&', alias resolution)
//!      |
//!   pagination / order / fields / filter grammars
//!      |
//!   QueryParameters -> store-specific translator
//! ```
//!
//! The compiler checks syntax and primitive value shape only. Field names are
//! opaque dot-separated paths resolved by the consumer, which may later coerce
//! raw filter values with [`convert()`].

pub mod builder;
pub mod convert;
pub mod error;
pub mod fields;
pub mod filter;
pub mod model;
pub mod order;
pub mod pairs;
mod serialize;
mod split;
mod temporal;

// Re-export main types
pub use builder::{
    FieldPredicate, FilterPredicate, OrderPredicate, QueryDefaults, QueryStringBuilder,
    DEFAULT_MAX_QUERY_LENGTH,
};
pub use convert::{convert, ConvertedValue, ValueShape};
pub use error::{ConversionCause, ConversionError, QueryFormatError, QueryFormatErrorKind, Result};
pub use model::{
    Arity, FilterOperation, FilterValue, OrderDirection, QueryFilter, QueryOrder, QueryParameters,
    UnknownConstant,
};
pub use pairs::QueryKey;

/// Parse an already decoded query string with no defaults applied.
pub fn parse(query: &str) -> Result<QueryParameters> {
    QueryStringBuilder::new().query(query).build()
}

/// Parse a percent-encoded query string with no defaults applied.
pub fn parse_encoded(query: &str) -> Result<QueryParameters> {
    QueryStringBuilder::new().query_encoded(query).build()
}

/// Parse the query component of a URI string with no defaults applied.
pub fn parse_uri(uri: &str) -> Result<QueryParameters> {
    QueryStringBuilder::new().uri(uri).build()
}

/// Parse the query component of a percent-encoded URI string with no defaults applied.
pub fn parse_uri_encoded(uri: &str) -> Result<QueryParameters> {
    QueryStringBuilder::new().uri_encoded(uri).build()
}
