//! Site configuration (_config.yml)

use chrono::Local;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::render::Plugin;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub author: String,

    // URL
    pub url: String,
    pub root: String,

    // Directory
    pub content_dir: String,
    pub public_dir: String,
    pub static_dir: String,

    // Writing
    pub date_fallback: DateFallback,
    #[serde(default)]
    pub highlight: HighlightConfig,
    pub plugins: Vec<Plugin>,

    // Store any additional fields for templates
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Blog".to_string(),
            description: String::new(),
            author: String::new(),

            url: "http://example.com".to_string(),
            root: "/".to_string(),

            content_dir: "blogs".to_string(),
            public_dir: "public".to_string(),
            static_dir: "static".to_string(),

            date_fallback: DateFallback::Now,
            highlight: HighlightConfig::default(),
            plugins: Plugin::default_pipeline(),

            extra: HashMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| Error::from_io(path, e))?;
        let config: SiteConfig = serde_yaml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        Ok(config)
    }
}

/// Date given to entries whose front-matter has no `date`
///
/// Written in `_config.yml` as `date_fallback: now` or as a literal date string.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DateFallback {
    /// The moment the entry is loaded (RFC 3339, local time)
    #[default]
    Now,
    /// A fixed string, identical for every undated entry
    Fixed(String),
}

impl DateFallback {
    /// Resolve the fallback into the date string stored on an entry
    pub fn resolve(&self) -> String {
        match self {
            DateFallback::Now => Local::now().to_rfc3339(),
            DateFallback::Fixed(date) => date.clone(),
        }
    }
}

impl From<String> for DateFallback {
    fn from(value: String) -> Self {
        if value.trim().eq_ignore_ascii_case("now") {
            DateFallback::Now
        } else {
            DateFallback::Fixed(value)
        }
    }
}

impl From<DateFallback> for String {
    fn from(value: DateFallback) -> Self {
        match value {
            DateFallback::Now => "now".to_string(),
            DateFallback::Fixed(date) => date,
        }
    }
}

/// Syntax highlighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub theme: String,
    pub line_number: bool,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            theme: "base16-ocean.dark".to_string(),
            line_number: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.content_dir, "blogs");
        assert_eq!(config.date_fallback, DateFallback::Now);
        assert_eq!(config.plugins, Plugin::default_pipeline());
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
title: My Blog
author: Test User
content_dir: posts
date_fallback: 1970-01-01
highlight:
  theme: InspiredGitHub
plugins:
  - syntax-highlight
  - heading-anchors
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.title, "My Blog");
        assert_eq!(config.content_dir, "posts");
        assert_eq!(
            config.date_fallback,
            DateFallback::Fixed("1970-01-01".to_string())
        );
        assert_eq!(config.highlight.theme, "InspiredGitHub");
        assert!(!config.highlight.line_number);
        assert_eq!(
            config.plugins,
            vec![Plugin::SyntaxHighlight, Plugin::HeadingAnchors]
        );
    }

    #[test]
    fn test_date_fallback_now_keyword() {
        let config: SiteConfig = serde_yaml::from_str("date_fallback: NOW").unwrap();
        assert_eq!(config.date_fallback, DateFallback::Now);
    }

    #[test]
    fn test_fixed_fallback_is_stable() {
        let fallback = DateFallback::Fixed("2000-01-01".to_string());
        assert_eq!(fallback.resolve(), fallback.resolve());
    }

    #[test]
    fn test_unknown_plugin_is_rejected() {
        let result = serde_yaml::from_str::<SiteConfig>("plugins: [sparkles]");
        assert!(result.is_err());
    }
}
