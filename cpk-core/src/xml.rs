// cpk-core/src/xml.rs
//! Just enough XML handling for PDSC and PIDX files: comment stripping,
//! element text, start-tag attributes and entity escaping.

use std::borrow::Cow;
use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref COMMENT_RE: Regex = Regex::new(r"(?s)<!--.*?-->").unwrap();
    static ref ATTRIBUTE_RE: Regex =
        Regex::new(r#"([A-Za-z_][\w:.-]*)\s*=\s*(?:"([^"]*)"|'([^']*)')"#).unwrap();
}

pub(crate) fn strip_comments(xml: &str) -> Cow<'_, str> {
    COMMENT_RE.replace_all(xml, "")
}

/// Trimmed, unescaped text of the first match of `element_re`, whose first
/// capture group must be the element body.
pub(crate) fn element_text(xml: &str, element_re: &Regex) -> Option<String> {
    element_re
        .captures(xml)
        .and_then(|caps| caps.get(1))
        .map(|body| unescape(body.as_str().trim()))
        .filter(|text| !text.is_empty())
}

/// Parses `name="value"` pairs of a start tag body, unescaping values.
pub(crate) fn attributes(tag_body: &str) -> HashMap<String, String> {
    ATTRIBUTE_RE
        .captures_iter(tag_body)
        .filter_map(|caps| {
            let name = caps.get(1)?.as_str().to_string();
            let value = caps.get(2).or_else(|| caps.get(3))?.as_str();
            Some((name, unescape(value)))
        })
        .collect()
}

pub(crate) fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

pub(crate) fn unescape(value: &str) -> String {
    value
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
