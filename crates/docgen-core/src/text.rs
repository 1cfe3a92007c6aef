//! Whitespace and blank-line normalisation shared by both command languages

use std::sync::OnceLock;

use regex::Regex;

/// Runs of two or more blank lines (lines holding only spaces, tabs, or a stray `\r`)
fn blank_line_runs() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"\n(?:[ \t\r]*\n){2,}").ok())
        .as_ref()
}

/// Collapse every whitespace run into a single space and trim both ends.
#[must_use]
pub fn simplify_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Collapse two or more consecutive blank lines down to exactly one blank line.
#[must_use]
pub fn collapse_blank_lines(s: &str) -> String {
    match blank_line_runs() {
        Some(re) => re.replace_all(s, "\n\n").into_owned(),
        None => s.to_string(),
    }
}

/// Strip one layer of enclosing `()`, `[]`, `{}` or `""` when the first and last
/// characters form a matching pair. The input is trimmed first.
#[must_use]
pub fn unwrap_enclosing(s: &str) -> &str {
    let s = s.trim();
    let bytes = s.as_bytes();
    if bytes.len() < 2 {
        return s;
    }
    let close = match bytes[0] {
        b'(' => b')',
        b'[' => b']',
        b'{' => b'}',
        b'"' => b'"',
        _ => return s,
    };
    if bytes[bytes.len() - 1] == close {
        &s[1..s.len() - 1]
    } else {
        s
    }
}

/// Remove one layer of enclosing double quotes, if present.
#[must_use]
pub fn unquote(s: &str) -> &str {
    let s = s.trim();
    s.strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(s)
}

/// Identifier characters for the lexical derivations: ASCII alphanumerics and `_`.
#[must_use]
pub const fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Returns true if `name` is a valid command name: an uppercase ASCII letter
/// followed by ASCII alphanumerics or underscores.
#[must_use]
pub fn is_command_name(name: &str) -> bool {
    let mut bytes = name.bytes();
    bytes.next().is_some_and(|b| b.is_ascii_uppercase()) && bytes.all(is_ident_byte)
}
