//! Entry model

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::frontmatter::{FrontMatter, FrontMatterError};
use crate::config::DateFallback;

/// Canonical metadata of an entry, after defaults are applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Short summary, empty when not supplied
    pub excerpt: String,

    /// Entry title, the identifier when not supplied
    pub title: String,

    /// Tags, sorted ascending
    pub tags: Vec<String>,

    /// Publication date as given in front-matter, or the configured fallback
    pub date: String,

    /// Identifier derived from the file name
    pub identifier: String,
}

impl Metadata {
    /// Turn raw front-matter into canonical metadata
    pub fn normalize(
        identifier: &str,
        front_matter: &FrontMatter,
        fallback: &DateFallback,
    ) -> Result<Self, FrontMatterError> {
        let date = match front_matter.date_string()? {
            Some(date) => date,
            None => fallback.resolve(),
        };

        let mut tags = front_matter.tags.clone();
        tags.sort();

        Ok(Self {
            excerpt: front_matter.excerpt.clone().unwrap_or_default(),
            title: front_matter
                .title
                .clone()
                .unwrap_or_else(|| identifier.to_string()),
            tags,
            date,
            identifier: identifier.to_string(),
        })
    }
}

/// A single blog entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    pub identifier: String,
    pub metadata: Metadata,

    /// Raw document text following the front-matter
    pub body: String,

    /// Front-matter fields beyond the known ones
    #[serde(default)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed() -> DateFallback {
        DateFallback::Fixed("1970-01-01".to_string())
    }

    #[test]
    fn test_defaults() {
        let meta = Metadata::normalize("hello", &FrontMatter::default(), &fixed()).unwrap();
        assert_eq!(
            meta,
            Metadata {
                excerpt: String::new(),
                title: "hello".to_string(),
                tags: Vec::new(),
                date: "1970-01-01".to_string(),
                identifier: "hello".to_string(),
            }
        );
    }

    #[test]
    fn test_tags_are_sorted() {
        let fm = FrontMatter {
            tags: vec!["z".into(), "a".into(), "m".into()],
            ..Default::default()
        };
        let meta = Metadata::normalize("x", &fm, &fixed()).unwrap();
        assert_eq!(meta.tags, vec!["a", "m", "z"]);
    }

    #[test]
    fn test_supplied_date_wins_over_fallback() {
        let fm = FrontMatter {
            date: Some(serde_yaml::Value::String("2023-01-01".into())),
            ..Default::default()
        };
        let meta = Metadata::normalize("x", &fm, &DateFallback::Now).unwrap();
        assert_eq!(meta.date, "2023-01-01");
    }

    #[test]
    fn test_now_fallback_is_rfc3339() {
        let meta = Metadata::normalize("x", &FrontMatter::default(), &DateFallback::Now).unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(&meta.date).is_ok());
    }
}
