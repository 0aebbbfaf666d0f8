//! Positional placeholder handling for SQL text.
//!
//! Every parameter is marked with `%s`. A literal percent sign is written
//! `%%`; any other use of `%` is malformed.

use crate::query::dialect::Dialect;
use model::core::value::Value;
use std::borrow::Cow;

pub const PLACEHOLDER: &str = "%s";

/// Counts the `%s` markers in `sql`.
pub fn count_placeholders(sql: &str) -> Result<usize, String> {
    let mut count = 0;
    let mut chars = sql.char_indices();
    while let Some((offset, c)) = chars.next() {
        if c != '%' {
            continue;
        }
        match chars.next() {
            Some((_, 's')) => count += 1,
            Some((_, '%')) => {}
            Some((_, other)) => {
                return Err(format!("unexpected '%{other}' at offset {offset}"));
            }
            None => return Err(format!("dangling '%' at offset {offset}")),
        }
    }
    Ok(count)
}

pub fn escape_percent(text: &str) -> Cow<'_, str> {
    if text.contains('%') {
        Cow::Owned(text.replace('%', "%%"))
    } else {
        Cow::Borrowed(text)
    }
}

/// Replaces the n-th marker with `replacement(n)` and unescapes `%%`.
pub fn substitute<F>(sql: &str, mut replacement: F) -> String
where
    F: FnMut(usize) -> String,
{
    let mut out = String::with_capacity(sql.len());
    let mut index = 0;
    let mut chars = sql.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.peek() {
            Some('s') => {
                chars.next();
                out.push_str(&replacement(index));
                index += 1;
            }
            Some('%') => {
                chars.next();
                out.push('%');
            }
            _ => out.push('%'),
        }
    }
    out
}

/// Writes `params` into `sql` as literals. For logs and debugging only.
pub fn inline(sql: &str, params: &[Value]) -> String {
    substitute(sql, |i| match params.get(i) {
        Some(value) => value.to_string(),
        None => PLACEHOLDER.to_string(),
    })
}

/// Rewrites markers into the dialect's numbered placeholders.
pub fn to_native(sql: &str, dialect: &dyn Dialect) -> String {
    substitute(sql, |i| dialect.get_placeholder(i))
}
