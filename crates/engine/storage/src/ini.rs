//! Ini-style backing file format
//!
//! ```text
//! [audio]
//! volume=80
//!
//! [camera]
//! position=1 2 3
//! ```
//!
//! - Blank lines and lines starting with `#` or `;` are ignored
//! - `[name]` opens a section; keys before any header land in the unnamed
//!   section `""`
//! - Other lines split on the first unescaped `=`; spaces and tabs around
//!   key and value are ignored
//! - Section names, keys and values are escaped on write so that any string
//!   survives a save and reload:
//!
//! | text | escape |
//! |---|---|
//! | `\` | `\\` |
//! | newline, CR, tab | `\n`, `\r`, `\t` |
//! | `=` | `\=` |
//! | leading/trailing space | `\s` |
//! | leading `[`, `#`, `;` | `\[`, `\#`, `\;` |
//!
//! Unknown escapes in hand-written files are kept verbatim.

use std::collections::BTreeMap;

use tracing::debug;

/// Section name -> key -> raw value
pub type Sections = BTreeMap<String, BTreeMap<String, String>>;

/// Parse file content into sections
pub fn parse(content: &str) -> Sections {
    let mut sections = Sections::new();
    let mut current = String::new();

    for (index, line) in content.lines().enumerate() {
        let line = trim_blank(line);
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            current = unescape(trim_blank(name));
            sections.entry(current.clone()).or_default();
            continue;
        }

        match split_entry(line) {
            Some((key, value)) => {
                sections
                    .entry(current.clone())
                    .or_default()
                    .insert(unescape(trim_blank(key)), unescape(trim_blank(value)));
            }
            None => debug!("Skipping line {} without '=': {:?}", index + 1, line),
        }
    }

    sections
}

/// Serialize sections in sorted order
///
/// The unnamed section is written first without a header so that it parses
/// back into the same place.
pub fn serialize(sections: &Sections) -> String {
    let mut out = String::new();

    for (name, entries) in sections {
        if name.is_empty() {
            if entries.is_empty() {
                continue;
            }
        } else {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push('[');
            out.push_str(&escape(name));
            out.push_str("]\n");
        }

        for (key, value) in entries {
            out.push_str(&escape(key));
            out.push('=');
            out.push_str(&escape(value));
            out.push('\n');
        }
    }

    out
}

/// Spaces and tabs only; escaped blanks are never trimmed
fn trim_blank(text: &str) -> &str {
    text.trim_matches([' ', '\t'])
}

/// Split `key=value` on the first `=` that is not escaped
fn split_entry(line: &str) -> Option<(&str, &str)> {
    let mut escaped = false;
    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' => return Some((&line[..i], &line[i + 1..])),
            _ => {}
        }
    }
    None
}

fn escape(text: &str) -> String {
    let last = text.chars().count().saturating_sub(1);
    let mut out = String::with_capacity(text.len());
    for (i, c) in text.chars().enumerate() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '=' => out.push_str("\\="),
            ' ' if i == 0 || i == last => out.push_str("\\s"),
            '[' | '#' | ';' if i == 0 => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('s') => out.push(' '),
            Some(c @ ('\\' | '=' | '[' | '#' | ';')) => out.push(c),
            // unknown escapes are kept verbatim
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
