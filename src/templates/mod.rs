//! Built-in page templates using the Tera template engine
//!
//! Templates are embedded in the binary.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

use crate::config::SiteConfig;
use crate::content::{Catalog, Entry};
use crate::error::Result;
use crate::page::PageView;

/// Template renderer with the embedded theme
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        // Rendered content is already HTML; text fields are escaped in the templates
        tera.autoescape_on(vec![]);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("theme/layout.html")),
            ("index.html", include_str!("theme/index.html")),
            ("post.html", include_str!("theme/post.html")),
            ("404.html", include_str!("theme/404.html")),
        ])?;

        tera.register_filter("date_format", date_format_filter);

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }

    /// Render the entry listing
    pub fn render_index(&self, site: &SiteData, catalog: &Catalog) -> Result<String> {
        let entries: Vec<EntryData> = catalog
            .iter()
            .map(|entry| EntryData::new(entry, &site.root))
            .collect();

        let mut context = base_context(site);
        context.insert("entries", &entries);
        self.render("index.html", &context)
    }

    /// Render a single entry page
    pub fn render_post(&self, site: &SiteData, page: &PageView) -> Result<String> {
        let mut context = base_context(site);
        context.insert("page", page);
        self.render("post.html", &context)
    }

    pub fn render_not_found(&self, site: &SiteData) -> Result<String> {
        self.render("404.html", &base_context(site))
    }
}

fn base_context(site: &SiteData) -> Context {
    let mut context = Context::new();
    context.insert("site", site);
    context.insert("current_year", &chrono::Local::now().year());
    context
}

/// URL path of an entry page
pub fn entry_path(root: &str, identifier: &str) -> String {
    format!("{}blog/{}/", root, identifier)
}

/// Tera filter: format a date string as "March 1, 2024"
///
/// Values that are not a plain date or an RFC 3339 timestamp are returned as-is.
fn date_format_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("date_format", "value", String, value);
    let format = match args.get("format") {
        Some(val) => tera::try_get_value!("date_format", "format", String, val),
        None => "%B %-d, %Y".to_string(),
    };

    let date = NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok().or_else(|| {
        chrono::DateTime::parse_from_rfc3339(s.trim())
            .ok()
            .map(|dt| dt.date_naive())
    });

    match date {
        Some(date) => Ok(tera::Value::String(date.format(&format).to_string())),
        None => Ok(tera::Value::String(s)),
    }
}

/// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub description: String,
    pub author: String,
    pub url: String,
    pub root: String,
}

impl From<&SiteConfig> for SiteData {
    fn from(config: &SiteConfig) -> Self {
        Self {
            title: config.title.clone(),
            description: config.description.clone(),
            author: config.author.clone(),
            url: config.url.clone(),
            root: config.root.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EntryData {
    pub title: String,
    pub date: String,
    pub excerpt: String,
    pub tags: Vec<String>,
    pub path: String,
}

impl EntryData {
    fn new(entry: &Entry, root: &str) -> Self {
        Self {
            title: entry.metadata.title.clone(),
            date: entry.metadata.date.clone(),
            excerpt: entry.metadata.excerpt.clone(),
            tags: entry.metadata.tags.clone(),
            path: entry_path(root, &entry.identifier),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Metadata;
    use crate::render::RenderResult;

    fn site() -> SiteData {
        SiteData::from(&SiteConfig::default())
    }

    fn entry(id: &str, title: &str, date: &str) -> Entry {
        Entry {
            identifier: id.to_string(),
            metadata: Metadata {
                excerpt: format!("About {}", title),
                title: title.to_string(),
                tags: vec!["rust".to_string()],
                date: date.to_string(),
                identifier: id.to_string(),
            },
            body: String::new(),
            extra: HashMap::new(),
        }
    }

    #[test]
    fn test_render_index() {
        let renderer = TemplateRenderer::new().unwrap();
        let catalog = Catalog::from_entries(vec![
            entry("old", "Old <Post>", "2020-01-01"),
            entry("new", "New Post", "2024-03-01"),
        ]);

        let html = renderer.render_index(&site(), &catalog).unwrap();
        assert!(html.contains(r#"href="/blog/new/""#));
        assert!(html.contains("March 1, 2024"));
        assert!(html.contains("Old &lt;Post&gt;"));
        assert!(html.find("New Post").unwrap() < html.find("Old &lt;Post&gt;").unwrap());
    }

    #[test]
    fn test_render_empty_index() {
        let renderer = TemplateRenderer::new().unwrap();
        let html = renderer.render_index(&site(), &Catalog::default()).unwrap();
        assert!(html.contains("Nothing here yet."));
    }

    #[test]
    fn test_render_post_keeps_content_html() {
        let renderer = TemplateRenderer::new().unwrap();
        let page = PageView {
            rendered_content: RenderResult {
                html: "<h2 id=\"a\">A</h2>".to_string(),
                headings: Vec::new(),
            },
            metadata: entry("a", "Title", "not a date").metadata,
            extra: HashMap::new(),
        };

        let html = renderer.render_post(&site(), &page).unwrap();
        assert!(html.contains("<h2 id=\"a\">A</h2>"));
        assert!(html.contains("<title>Title - Blog</title>"));
        assert!(html.contains("not a date"));
    }

    #[test]
    fn test_entry_path() {
        assert_eq!(entry_path("/", "hello"), "/blog/hello/");
        assert_eq!(entry_path("/sub/", "hello"), "/sub/blog/hello/");
    }
}
