use std::fmt::Write;

/// Wraps `s` in single quotes, doubling any quote inside it.
pub fn quote_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');

    for ch in s.chars() {
        if ch == '\'' {
            out.push('\'');
        }
        out.push(ch);
    }

    out.push('\'');
    out
}

pub fn encode_bytea(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(2 + 2 * bytes.len());
    out.push_str("\\x");
    for b in bytes {
        // Writing into a String cannot fail.
        let _ = write!(&mut out, "{b:02x}");
    }
    out
}
