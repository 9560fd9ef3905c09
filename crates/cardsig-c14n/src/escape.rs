#![forbid(unsafe_code)]

//! Character escaping for canonical output.
//!
//! - Text nodes: `&` → `&amp;`, `<` → `&lt;`, `>` → `&gt;`, CR → `&#xD;`
//! - Attribute values: `&`, `<`, `"`, TAB, LF and CR
//! - Processing-instruction data: CR only

/// Append text node content, escaped.
pub fn push_text(out: &mut Vec<u8>, s: &str) {
    push_escaped(out, s, |ch| match ch {
        '&' => Some("&amp;"),
        '<' => Some("&lt;"),
        '>' => Some("&gt;"),
        '\r' => Some("&#xD;"),
        _ => None,
    });
}

/// Append an attribute value, escaped.
pub fn push_attr(out: &mut Vec<u8>, s: &str) {
    push_escaped(out, s, |ch| match ch {
        '&' => Some("&amp;"),
        '<' => Some("&lt;"),
        '"' => Some("&quot;"),
        '\t' => Some("&#x9;"),
        '\n' => Some("&#xA;"),
        '\r' => Some("&#xD;"),
        _ => None,
    });
}

/// Append processing-instruction data, escaped.
pub fn push_pi(out: &mut Vec<u8>, s: &str) {
    push_escaped(out, s, |ch| (ch == '\r').then_some("&#xD;"));
}

fn push_escaped(out: &mut Vec<u8>, s: &str, replace: impl Fn(char) -> Option<&'static str>) {
    let mut start = 0;
    for (i, ch) in s.char_indices() {
        if let Some(entity) = replace(ch) {
            out.extend_from_slice(s[start..i].as_bytes());
            out.extend_from_slice(entity.as_bytes());
            start = i + ch.len_utf8();
        }
    }
    out.extend_from_slice(s[start..].as_bytes());
}
