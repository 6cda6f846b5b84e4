//! Key and name helpers
//!
//! Scripts address values as `"section.key"`. These helpers split such keys,
//! normalize section names and turn caller-supplied store names into safe
//! file names. They are pure and do no I/O.

/// Replace every character outside `[A-Za-z0-9_-]` with `_`
///
/// The result is always a single path component, so a store name can never
/// escape the cache directory.
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Cut a section name at its first `.`
pub fn truncate_section(section: &str) -> &str {
    match section.find('.') {
        Some(dot) => &section[..dot],
        None => section,
    }
}

/// Split `"section.key"` into `(section, key)`
///
/// Only the first `.` separates; the remainder may contain further dots.
/// A key without a dot, or with an empty prefix (`".key"`), resolves to
/// `default_section`.
pub fn split_key<'a>(key: &'a str, default_section: &'a str) -> (&'a str, &'a str) {
    match key.find('.') {
        Some(dot) => {
            let section = &key[..dot];
            let rest = &key[dot + 1..];
            if section.is_empty() {
                (default_section, rest)
            } else {
                (section, rest)
            }
        }
        None => (default_section, key),
    }
}
