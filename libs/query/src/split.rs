//! Quote-aware splitting.
//!
//! A delimiter inside a single-quoted span (`'John Doe'`) is part of the value.
//! A `'` only opens a span when another `'` follows it, so an unmatched
//! apostrophe (`O'Brien`) is plain text.

pub(crate) fn split_unquoted<F>(input: &str, is_sep: F) -> Vec<&str>
where
    F: Fn(char) -> bool,
{
    let mut out = Vec::new();
    let mut start = 0usize;
    let mut quoted = false;
    let last_quote = input.rfind('\'');
    for (i, c) in input.char_indices() {
        if c == '\'' {
            if quoted {
                quoted = false;
            } else if last_quote.is_some_and(|last| last > i) {
                quoted = true;
            }
        } else if !quoted && is_sep(c) {
            out.push(&input[start..i]);
            start = i + c.len_utf8();
        }
    }
    out.push(&input[start..]);
    out
}

/// Like [`split_unquoted`] but runs of delimiters collapse and empty segments are dropped.
pub(crate) fn split_unquoted_nonempty<F>(input: &str, is_sep: F) -> Vec<&str>
where
    F: Fn(char) -> bool,
{
    split_unquoted(input, is_sep)
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect()
}

/// Remove one leading and one trailing single quote, independently.
pub(crate) fn strip_quotes(value: &str) -> &str {
    let value = value.strip_prefix('\'').unwrap_or(value);
    value.strip_suffix('\'').unwrap_or(value)
}
