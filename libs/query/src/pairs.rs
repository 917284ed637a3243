//! Query string tokenization
//!
//! Splits a raw query string into `key=value` pairs and maps each key (or its
//! alias) onto the sub-grammar that handles it.

use std::borrow::Cow;

/// Recognized query parameter, each with a canonical spelling and one alias.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKey {
    Limit,
    Offset,
    Order,
    Fields,
    Filter,
}

impl QueryKey {
    pub const ALL: [QueryKey; 5] = [
        Self::Limit,
        Self::Offset,
        Self::Order,
        Self::Fields,
        Self::Filter,
    ];

    pub fn canonical(self) -> &'static str {
        match self {
            Self::Limit => "limit",
            Self::Offset => "offset",
            Self::Order => "order",
            Self::Fields => "fields",
            Self::Filter => "filter",
        }
    }

    pub fn alias(self) -> &'static str {
        match self {
            Self::Limit => "max",
            Self::Offset => "skip",
            Self::Order => "sort",
            Self::Fields => "select",
            Self::Filter => "where",
        }
    }

    /// Case-sensitive lookup of a canonical key or alias.
    pub fn resolve(key: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|k| k.canonical() == key || k.alias() == key)
    }
}

/// Iterator over the non-empty `(key, value)` pairs of a query string.
///
/// Pairs are separated by `&` regardless of quoting. A chunk without `=` is a bare
/// key with an empty value. Pairs with an empty key or an empty value are skipped.
pub struct QueryPairs<'a> {
    chunks: std::str::Split<'a, char>,
}

impl<'a> QueryPairs<'a> {
    pub fn new(query: &'a str) -> Self {
        Self {
            chunks: query.split('&'),
        }
    }
}

impl<'a> Iterator for QueryPairs<'a> {
    type Item = (&'a str, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        for chunk in self.chunks.by_ref() {
            let (key, value) = chunk.split_once('=').unwrap_or((chunk, ""));
            if key.is_empty() || value.is_empty() {
                tracing::trace!(pair = chunk, "Skipping query pair without key or value");
                continue;
            }
            return Some((key, value));
        }
        None
    }
}

/// Percent-decode a query string (`+` is a space). Input that does not decode to
/// valid UTF-8 is returned unchanged.
pub fn decode(input: &str) -> Cow<'_, str> {
    if !input.contains(['%', '+']) {
        return Cow::Borrowed(input);
    }
    let spaced = input.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => Cow::Owned(decoded.into_owned()),
        Err(err) => {
            tracing::debug!(error = %err, "Query string is not valid UTF-8 after decoding; using raw input");
            Cow::Borrowed(input)
        }
    }
}

/// Query component of a URI string: text after the first `?`, up to the first `#`.
///
/// `None` when the string has no `?`; an empty query when the fragment starts
/// before the `?`.
pub fn extract_query(uri: &str) -> Option<&str> {
    let query_start = uri.find('?')?;
    match uri.find('#') {
        None => Some(&uri[query_start + 1..]),
        Some(fragment) if fragment < query_start => Some(""),
        Some(fragment) => Some(&uri[query_start + 1..fragment]),
    }
}
