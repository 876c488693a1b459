//! Attribute whitespace minification

use lazy_static::lazy_static;
use regex::{Captures, Regex};

lazy_static! {
    static ref TAG_RE: Regex = Regex::new(r"<[A-Za-z][^<>]*>").unwrap();
    static ref ATTR_VALUE_RE: Regex = Regex::new(r#"=\s*"([^"]*)""#).unwrap();
    static ref WHITESPACE_RE: Regex = Regex::new(r"\s+").unwrap();
}

/// Trim and collapse whitespace inside double-quoted attribute values
///
/// Text between tags is left alone.
pub fn minify_attribute_whitespace(html: &str) -> String {
    TAG_RE
        .replace_all(html, |tag: &Captures| {
            ATTR_VALUE_RE
                .replace_all(&tag[0], |attr: &Captures| {
                    let value = WHITESPACE_RE.replace_all(attr[1].trim(), " ");
                    format!("=\"{}\"", value)
                })
                .into_owned()
        })
        .into_owned()
}
