//! Generator module - writes the static site using the built-in templates

use anyhow::{Context as _, Result};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

use crate::page::PageGenerator;
use crate::render::MarkdownRenderer;
use crate::templates::{SiteData, TemplateRenderer};
use crate::Blog;

/// Counts of what a build produced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub pages: usize,
    pub assets: usize,
}

/// Static site generator
pub struct Generator {
    blog: Blog,
    pages: PageGenerator<MarkdownRenderer>,
    templates: TemplateRenderer,
    site: SiteData,
}

impl Generator {
    /// Create a new generator
    pub fn new(blog: &Blog) -> Result<Self> {
        Ok(Self {
            blog: blog.clone(),
            pages: blog.page_generator(),
            templates: TemplateRenderer::new()?,
            site: SiteData::from(&blog.config),
        })
    }

    /// Generate the entire site
    pub fn generate(&self) -> Result<BuildReport> {
        let public_dir = &self.blog.public_dir;
        fs::create_dir_all(public_dir)
            .with_context(|| format!("Failed to create dir {:?}", public_dir))?;

        // Pages and the index share one load of the catalog
        let catalog = self.pages.catalog().load_all()?;

        for entry in &catalog {
            let page = self
                .pages
                .render_entry(entry)
                .with_context(|| format!("Failed to build page {:?}", entry.identifier))?;
            let html = self.templates.render_post(&self.site, &page)?;

            let output_path = public_dir
                .join("blog")
                .join(&entry.identifier)
                .join("index.html");
            write_file(&output_path, &html)?;
            tracing::debug!("Generated entry: {:?}", output_path);
        }

        let index = self.templates.render_index(&self.site, &catalog)?;
        write_file(&public_dir.join("index.html"), &index)?;

        let not_found = self.templates.render_not_found(&self.site)?;
        write_file(&public_dir.join("404.html"), &not_found)?;

        self.generate_catalog_json(&catalog)?;
        let assets = self.copy_static_assets()?;

        Ok(BuildReport {
            pages: catalog.len(),
            assets,
        })
    }

    /// Write the metadata of every entry, newest first
    fn generate_catalog_json(&self, catalog: &crate::content::Catalog) -> Result<()> {
        let metadata: Vec<_> = catalog.iter().map(|e| &e.metadata).collect();

        let output_path = self.blog.public_dir.join("catalog.json");
        let json = serde_json::to_string_pretty(&metadata)?;
        write_file(&output_path, &json)?;
        tracing::info!("Generated catalog.json");

        Ok(())
    }

    /// Copy static assets (images, styles) to the public directory
    fn copy_static_assets(&self) -> Result<usize> {
        let static_dir = &self.blog.static_dir;
        if !static_dir.is_dir() {
            return Ok(0);
        }

        let mut copied = 0;
        for entry in WalkDir::new(static_dir).follow_links(true) {
            let entry = entry?;
            let path = entry.path();
            if !entry.file_type().is_file() {
                continue;
            }

            let relative = path.strip_prefix(static_dir)?;
            let dest = self.blog.public_dir.join(relative);

            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(path, &dest)
                .with_context(|| format!("Failed to copy {:?} to {:?}", path, dest))?;
            copied += 1;
        }

        Ok(copied)
    }
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create dir {:?}", parent))?;
    }
    fs::write(path, content).with_context(|| format!("Failed to write {:?}", path))
}
