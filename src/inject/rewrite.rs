//! HTML asset injection.
//!
//! # Responsibilities
//! - Insert the style block before the first closing head tag
//! - Insert the script block before the first closing body tag
//!
//! # Design Decisions
//! - Tag matching is ASCII case-insensitive
//! - A missing tag skips that insertion; rewriting never fails
//! - Only the first occurrence of each tag is targeted

use crate::inject::assets::InjectionPayload;

/// Splice the payload into an HTML document.
///
/// Everything outside the two insertion points is byte-identical to the
/// input.
pub fn inject(html: &str, payload: &InjectionPayload) -> String {
    let mut insertions: Vec<(usize, String)> = Vec::with_capacity(2);

    if let Some(at) = find_ci(html, "</head>") {
        insertions.push((at, format!("<style>{}</style>\n", payload.style)));
    }
    if let Some(at) = find_ci(html, "</body>") {
        insertions.push((at, format!("<script>{}</script>\n", payload.script)));
    }
    insertions.sort_by_key(|(at, _)| *at);

    let extra: usize = insertions.iter().map(|(_, text)| text.len()).sum();
    let mut out = String::with_capacity(html.len() + extra);
    let mut cursor = 0;
    for (at, text) in insertions {
        out.push_str(&html[cursor..at]);
        out.push_str(&text);
        cursor = at;
    }
    out.push_str(&html[cursor..]);
    out
}

/// Byte offset of the first ASCII case-insensitive occurrence of `needle`.
///
/// The needles here are plain ASCII tags, so a match offset always lands on
/// a UTF-8 character boundary.
fn find_ci(haystack: &str, needle: &str) -> Option<usize> {
    let haystack = haystack.as_bytes();
    let needle = needle.as_bytes();
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle))
}
