//! mdx-blog: a small static blog generator for MDX entries
//!
//! Entries are `<identifier>.mdx` files in a flat content directory. The
//! [`content::CatalogBuilder`] discovers and loads them, the
//! [`page::PageGenerator`] renders one entry through a [`render::Renderer`], and
//! the static [`generator::Generator`] or the dev [`server`] turn the result
//! into HTML.

pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod generator;
pub mod page;
pub mod render;
pub mod server;
pub mod templates;

use anyhow::Result;
use std::path::{Path, PathBuf};

use content::CatalogBuilder;
use page::PageGenerator;
use render::{MarkdownRenderer, PluginConfig};

/// The blog application
#[derive(Clone)]
pub struct Blog {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Directory holding the `.mdx` entries
    pub content_dir: PathBuf,
    /// Public (output) directory
    pub public_dir: PathBuf,
    /// Static assets copied verbatim into the output
    pub static_dir: PathBuf,
}

impl Blog {
    /// Create a new blog instance from a directory
    ///
    /// Reads `_config.yml` from `base_dir` when present.
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        Ok(Self::with_config(base_dir, config))
    }

    /// Create a blog instance from an already loaded configuration
    pub fn with_config(base_dir: PathBuf, config: config::SiteConfig) -> Self {
        let content_dir = base_dir.join(&config.content_dir);
        let public_dir = base_dir.join(&config.public_dir);
        let static_dir = base_dir.join(&config.static_dir);

        Self {
            config,
            base_dir,
            content_dir,
            public_dir,
            static_dir,
        }
    }

    /// Catalog builder over the configured content directory
    pub fn catalog_builder(&self) -> CatalogBuilder {
        CatalogBuilder::new(&self.content_dir, self.config.date_fallback.clone())
    }

    /// Page generator using the built-in markdown renderer
    pub fn page_generator(&self) -> PageGenerator<MarkdownRenderer> {
        let renderer = MarkdownRenderer::with_options(
            &self.config.highlight.theme,
            self.config.highlight.line_number,
        );
        PageGenerator::new(
            self.catalog_builder(),
            renderer,
            PluginConfig::new(self.config.plugins.clone()),
        )
    }

    /// Generate the static site
    pub fn generate(&self) -> Result<()> {
        commands::generate::run(self)
    }

    /// Clean the public directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }
}
