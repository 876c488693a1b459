//! Document rendering
//!
//! The page generator only depends on the [`Renderer`] trait; [`MarkdownRenderer`]
//! is the built-in implementation.

mod markdown;
mod minify;

pub use markdown::MarkdownRenderer;
pub use minify::minify_attribute_whitespace;

use serde::{Deserialize, Serialize};

/// Turns a document body into renderable output
pub trait Renderer: Send + Sync {
    fn render(&self, text: &str, plugins: &PluginConfig) -> Result<RenderResult, RenderError>;
}

/// A post-processing transform applied while rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Plugin {
    /// Give every heading an `id` derived from its text
    HeadingAnchors,
    /// Wrap heading content in a link to the heading's own `id`
    WrapHeadingLinks,
    /// Highlight fenced code blocks
    SyntaxHighlight,
    /// Trim and collapse whitespace inside HTML attribute values
    MinifyAttributeWhitespace,
}

impl Plugin {
    /// The standard blog pipeline, in order
    pub fn default_pipeline() -> Vec<Plugin> {
        vec![
            Plugin::HeadingAnchors,
            Plugin::WrapHeadingLinks,
            Plugin::SyntaxHighlight,
            Plugin::MinifyAttributeWhitespace,
        ]
    }
}

/// Ordered list of plugins handed to a renderer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginConfig {
    plugins: Vec<Plugin>,
}

impl PluginConfig {
    pub fn new(plugins: Vec<Plugin>) -> Self {
        Self { plugins }
    }

    /// No transforms at all
    pub fn none() -> Self {
        Self::new(Vec::new())
    }

    pub fn contains(&self, plugin: Plugin) -> bool {
        self.plugins.contains(&plugin)
    }

    /// Position of `plugin` in the pipeline
    pub fn position(&self, plugin: Plugin) -> Option<usize> {
        self.plugins.iter().position(|p| *p == plugin)
    }

    pub fn iter(&self) -> impl Iterator<Item = Plugin> + '_ {
        self.plugins.iter().copied()
    }
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self::new(Plugin::default_pipeline())
    }
}

/// Output of a renderer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderResult {
    /// Rendered HTML fragment
    pub html: String,

    /// Headings in document order
    pub headings: Vec<Heading>,
}

/// A heading found while rendering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    pub level: u8,
    pub id: Option<String>,
    pub text: String,
}

/// Errors raised by a renderer
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("unknown highlight theme: {0}")]
    UnknownTheme(String),

    #[error("render failed: {0}")]
    Failed(String),
}
