//! Page generator - turns catalog entries into page view-models

use serde::Serialize;
use std::collections::HashMap;

use crate::content::{CatalogBuilder, Entry, Metadata};
use crate::error::Result;
use crate::render::{PluginConfig, RenderResult, Renderer};

/// Everything a template needs to display one entry
#[derive(Debug, Clone, Serialize)]
pub struct PageView {
    pub rendered_content: RenderResult,
    pub metadata: Metadata,
    /// Extra front-matter fields of the entry
    pub extra: HashMap<String, serde_yaml::Value>,
}

/// Identifiers the page framework may serve
///
/// There is no fallback route: anything not listed here is not found.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Routes {
    identifiers: Vec<String>,
}

impl Routes {
    pub fn new(identifiers: Vec<String>) -> Self {
        Self { identifiers }
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.identifiers.iter().any(|id| id == identifier)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.identifiers.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.identifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identifiers.is_empty()
    }
}

/// Builds page view-models from the catalog and a renderer
pub struct PageGenerator<R> {
    catalog: CatalogBuilder,
    renderer: R,
    plugins: PluginConfig,
}

impl<R: Renderer> PageGenerator<R> {
    pub fn new(catalog: CatalogBuilder, renderer: R, plugins: PluginConfig) -> Self {
        Self {
            catalog,
            renderer,
            plugins,
        }
    }

    pub fn catalog(&self) -> &CatalogBuilder {
        &self.catalog
    }

    /// Route table: one route per entry identifier
    pub fn enumerate_routes(&self) -> Result<Routes> {
        Ok(Routes::new(self.catalog.list_identifiers()?))
    }

    /// Load and render a single entry
    pub fn build_page(&self, identifier: &str) -> Result<PageView> {
        let entry = self.catalog.load_entry(identifier)?;
        self.render_entry(&entry)
    }

    /// Render an entry that is already loaded, keeping its metadata as is
    pub fn render_entry(&self, entry: &Entry) -> Result<PageView> {
        let rendered_content = self.renderer.render(&entry.body, &self.plugins)?;

        tracing::debug!(
            "Rendered {:?} ({} headings)",
            entry.identifier,
            rendered_content.headings.len()
        );

        Ok(PageView {
            rendered_content,
            metadata: entry.metadata.clone(),
            extra: entry.extra.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DateFallback;
    use crate::error::Error;
    use crate::render::{MarkdownRenderer, Plugin, RenderError};
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Records every call and echoes the body back
    #[derive(Default)]
    struct EchoRenderer {
        calls: Mutex<Vec<(String, PluginConfig)>>,
    }

    impl Renderer for EchoRenderer {
        fn render(&self, text: &str, plugins: &PluginConfig) -> Result<RenderResult, RenderError> {
            self.calls
                .lock()
                .unwrap()
                .push((text.to_string(), plugins.clone()));
            Ok(RenderResult {
                html: text.to_string(),
                headings: Vec::new(),
            })
        }
    }

    struct FailingRenderer;

    impl Renderer for FailingRenderer {
        fn render(&self, _: &str, _: &PluginConfig) -> Result<RenderResult, RenderError> {
            Err(RenderError::Failed("boom".to_string()))
        }
    }

    fn site() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("hello.mdx"),
            "---\ntitle: Hello\ndate: \"2024-03-01\"\n---\n# Hi\n",
        )
        .unwrap();
        fs::write(dir.path().join("other.mdx"), "plain").unwrap();
        dir
    }

    fn catalog(dir: &TempDir) -> CatalogBuilder {
        CatalogBuilder::new(dir.path(), DateFallback::Fixed("2000-01-01".to_string()))
    }

    #[test]
    fn test_enumerate_routes() {
        let dir = site();
        let generator = PageGenerator::new(catalog(&dir), EchoRenderer::default(), PluginConfig::none());

        let routes = generator.enumerate_routes().unwrap();
        assert_eq!(routes.len(), 2);
        assert!(routes.contains("hello"));
        assert!(routes.contains("other"));
        assert!(!routes.contains("missing"));
    }

    #[test]
    fn test_build_page_passes_body_and_plugins() {
        let dir = site();
        let plugins = PluginConfig::new(vec![Plugin::SyntaxHighlight]);
        let generator = PageGenerator::new(catalog(&dir), EchoRenderer::default(), plugins.clone());

        let page = generator.build_page("hello").unwrap();
        assert_eq!(page.metadata.title, "Hello");
        assert_eq!(page.metadata.date, "2024-03-01");
        assert_eq!(page.rendered_content.html, "# Hi\n");

        let calls = generator.renderer.calls.lock().unwrap();
        assert_eq!(calls.as_slice(), &[("# Hi\n".to_string(), plugins)]);
    }

    #[test]
    fn test_render_entry_keeps_loaded_metadata() {
        let dir = site();
        let builder = CatalogBuilder::new(dir.path(), DateFallback::Now);
        let catalog = builder.load_all().unwrap();
        let generator = PageGenerator::new(builder, EchoRenderer::default(), PluginConfig::none());

        let entry = catalog.get("other").unwrap();
        let page = generator.render_entry(entry).unwrap();
        assert_eq!(page.metadata, entry.metadata);
        assert_eq!(page.rendered_content.html, "plain");
    }

    #[test]
    fn test_build_page_missing_entry() {
        let dir = site();
        let generator = PageGenerator::new(catalog(&dir), EchoRenderer::default(), PluginConfig::none());

        let err = generator.build_page("missing").unwrap_err();
        assert!(err.is_not_found());
        assert!(generator.renderer.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_render_errors_propagate() {
        let dir = site();
        let generator = PageGenerator::new(catalog(&dir), FailingRenderer, PluginConfig::none());

        let err = generator.build_page("hello").unwrap_err();
        assert!(matches!(err, Error::Render(RenderError::Failed(_))));
    }

    #[test]
    fn test_build_page_with_markdown_renderer() {
        let dir = site();
        let generator = PageGenerator::new(
            catalog(&dir),
            MarkdownRenderer::new(),
            PluginConfig::default(),
        );

        let page = generator.build_page("hello").unwrap();
        assert!(page.rendered_content.html.contains(r#"<h1 id="hi">"#));
        assert_eq!(page.metadata.identifier, "hello");
    }
}
