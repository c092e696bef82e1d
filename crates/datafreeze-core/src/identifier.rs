//! Conversion of schema-supplied names into bare code identifiers.

use crate::error::{Error, Result};

/// Build a bare identifier out of an arbitrary name.
///
/// Only ASCII letters and digits survive, and digits are dropped until the
/// first letter has been kept, so `"123Foo_Bar"` becomes `"FooBar"`.
///
/// # Errors
///
/// Returns [`Error::InvalidIdentifier`] when nothing is left.
pub fn sanitize_identifier(raw: &str) -> Result<String> {
    let mut out = String::with_capacity(raw.len());

    for ch in raw.chars() {
        if ch.is_ascii_alphabetic() {
            out.push(ch);
        } else if ch.is_ascii_digit() && !out.is_empty() {
            out.push(ch);
        }
    }

    if out.is_empty() {
        return Err(Error::InvalidIdentifier(raw.to_string()));
    }

    Ok(out)
}

/// True when `name` can be used verbatim as a C# identifier.
pub(crate) fn is_plain_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}
