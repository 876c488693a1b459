//! Markdown rendering with syntax highlighting

use lazy_static::lazy_static;
use pulldown_cmark::{
    html, CodeBlockKind, CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd,
};
use regex::Regex;
use std::collections::HashMap;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

use super::{
    minify_attribute_whitespace, Heading, Plugin, PluginConfig, RenderError, RenderResult,
    Renderer,
};

lazy_static! {
    // Letters, marks, numbers, connector punctuation, hyphen and space survive
    static ref SLUG_STRIP_RE: Regex = Regex::new(r"[^\p{L}\p{M}\p{N}\p{Pc} -]").unwrap();
}

/// Markdown renderer with syntax highlighting
///
/// JSX and raw HTML in the body pass through as HTML.
pub struct MarkdownRenderer {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    theme_name: String,
    line_numbers: bool,
}

impl MarkdownRenderer {
    /// Create a new markdown renderer
    pub fn new() -> Self {
        Self::with_options("base16-ocean.dark", false)
    }

    /// Create with custom settings
    pub fn with_options(theme: &str, line_numbers: bool) -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            theme_name: theme.to_string(),
            line_numbers,
        }
    }

    fn theme(&self) -> Result<&Theme, RenderError> {
        self.theme_set
            .themes
            .get(&self.theme_name)
            .ok_or_else(|| RenderError::UnknownTheme(self.theme_name.clone()))
    }

    /// Highlight a code block
    fn highlight_code(&self, code: &str, lang: Option<&str>, theme: &Theme) -> String {
        let lang = lang.unwrap_or("text");

        // Try to find syntax for the language
        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        match highlighted_html_for_string(code, &self.syntax_set, syntax, theme) {
            Ok(highlighted) => {
                if self.line_numbers {
                    self.add_line_numbers(&highlighted, lang)
                } else {
                    format!(
                        r#"<figure class="highlight {}">{}</figure>"#,
                        html_escape(lang),
                        highlighted
                    )
                }
            }
            Err(e) => {
                tracing::debug!("Highlighting {} failed, emitting plain code: {}", lang, e);
                plain_code_block(code, Some(lang))
            }
        }
    }

    /// Add line numbers to highlighted code
    fn add_line_numbers(&self, code: &str, lang: &str) -> String {
        let lines: Vec<&str> = code.lines().collect();
        let line_count = lines.len();

        let mut gutter = String::new();
        let mut code_lines = String::new();

        for (i, line) in lines.iter().enumerate() {
            gutter.push_str(&format!(r#"<span class="line-number">{}</span>"#, i + 1));
            if i < line_count - 1 {
                gutter.push('\n');
            }

            code_lines.push_str(line);
            if i < line_count - 1 {
                code_lines.push('\n');
            }
        }

        format!(
            r#"<figure class="highlight {}"><table><tr><td class="gutter"><pre>{}</pre></td><td class="code"><pre>{}</pre></td></tr></table></figure>"#,
            html_escape(lang),
            gutter,
            code_lines
        )
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for MarkdownRenderer {
    fn render(&self, text: &str, plugins: &PluginConfig) -> Result<RenderResult, RenderError> {
        // Front-matter is split off before rendering, so no metadata blocks here
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_SMART_PUNCTUATION
            | Options::ENABLE_HEADING_ATTRIBUTES
            | Options::ENABLE_GFM;
        let parser = Parser::new_ext(text, options);

        let highlight_theme = if plugins.contains(Plugin::SyntaxHighlight) {
            Some(self.theme()?)
        } else {
            None
        };
        let anchors = plugins.contains(Plugin::HeadingAnchors);
        // Generated ids are only visible to the link wrapper when anchors run first
        let wrap_generated = matches!(
            (
                plugins.position(Plugin::HeadingAnchors),
                plugins.position(Plugin::WrapHeadingLinks),
            ),
            (Some(a), Some(w)) if a < w
        );
        let wrap = plugins.contains(Plugin::WrapHeadingLinks);

        let mut events: Vec<Event> = Vec::new();
        let mut headings = Vec::new();
        let mut slugs = SlugCounter::default();

        let mut code_block: Option<(Option<String>, String)> = None;
        let mut heading: Option<OpenHeading> = None;

        for event in parser {
            if code_block.is_some() {
                match event {
                    Event::Text(text) => {
                        if let Some((_, content)) = code_block.as_mut() {
                            content.push_str(&text);
                        }
                    }
                    Event::End(TagEnd::CodeBlock) => {
                        if let Some((lang, content)) = code_block.take() {
                            let html = match highlight_theme {
                                Some(theme) => {
                                    self.highlight_code(&content, lang.as_deref(), theme)
                                }
                                None => plain_code_block(&content, lang.as_deref()),
                            };
                            push_event(
                                &mut events,
                                &mut heading,
                                Event::Html(CowStr::from(html)),
                            );
                        }
                    }
                    _ => {}
                }
                continue;
            }

            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    let lang = match kind {
                        CodeBlockKind::Fenced(info) => {
                            info.split_whitespace().next().map(str::to_string)
                        }
                        CodeBlockKind::Indented => None,
                    };
                    code_block = Some((lang, String::new()));
                }
                Event::Start(Tag::Heading {
                    level,
                    id,
                    classes,
                    attrs,
                }) => {
                    heading = Some(OpenHeading {
                        level,
                        explicit_id: id.map(|id| id.to_string()),
                        classes: classes.iter().map(|c| c.to_string()).collect(),
                        attrs: attrs
                            .iter()
                            .map(|(k, v)| (k.to_string(), v.as_ref().map(|v| v.to_string())))
                            .collect(),
                        text: String::new(),
                        inner: Vec::new(),
                    });
                }
                Event::End(TagEnd::Heading(_)) => {
                    if let Some(open) = heading.take() {
                        let explicit_id = open.explicit_id.as_deref().map(|id| slugs.claim(id));
                        let generated = if anchors && explicit_id.is_none() {
                            slugs.next(&open.text)
                        } else {
                            None
                        };

                        let link_target = match (&explicit_id, &generated) {
                            (Some(id), _) => Some(id.clone()),
                            (None, Some(id)) if wrap_generated => Some(id.clone()),
                            _ => None,
                        }
                        .filter(|_| wrap);

                        let id = explicit_id.or(generated);
                        let html = open.to_html(id.as_deref(), link_target.as_deref());
                        headings.push(Heading {
                            level: open.level as u8,
                            id,
                            text: open.text,
                        });
                        events.push(Event::Html(CowStr::from(html)));
                    }
                }
                Event::Text(ref text) | Event::Code(ref text) => {
                    if let Some(open) = heading.as_mut() {
                        open.text.push_str(text);
                    }
                    push_event(&mut events, &mut heading, event);
                }
                other => push_event(&mut events, &mut heading, other),
            }
        }

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());

        if plugins.contains(Plugin::MinifyAttributeWhitespace) {
            html_output = minify_attribute_whitespace(&html_output);
        }

        Ok(RenderResult {
            html: html_output,
            headings,
        })
    }
}

/// Heading whose closing tag has not been seen yet
struct OpenHeading {
    level: HeadingLevel,
    explicit_id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<(String, Option<String>)>,
    text: String,
    inner: Vec<Event<'static>>,
}

impl OpenHeading {
    fn to_html(&self, id: Option<&str>, link_target: Option<&str>) -> String {
        let mut inner = String::new();
        html::push_html(&mut inner, self.inner.iter().cloned());

        let mut out = format!("<{}", self.level);
        if let Some(id) = id {
            out.push_str(&format!(r#" id="{}""#, html_escape(id)));
        }
        if !self.classes.is_empty() {
            out.push_str(&format!(r#" class="{}""#, html_escape(&self.classes.join(" "))));
        }
        for (key, value) in &self.attrs {
            match value {
                Some(value) => out.push_str(&format!(r#" {}="{}""#, key, html_escape(value))),
                None => out.push_str(&format!(" {}", key)),
            }
        }
        out.push('>');

        match link_target {
            Some(target) => out.push_str(&format!(
                r##"<a href="#{}">{}</a>"##,
                html_escape(target),
                inner
            )),
            None => out.push_str(&inner),
        }

        out.push_str(&format!("</{}>\n", self.level));
        out
    }
}

fn push_event<'a>(
    events: &mut Vec<Event<'a>>,
    heading: &mut Option<OpenHeading>,
    event: Event<'a>,
) {
    match heading.as_mut() {
        Some(open) => open.inner.push(event.into_static()),
        None => events.push(event),
    }
}

/// GitHub-style heading slugs, unique within one document
#[derive(Default)]
struct SlugCounter {
    seen: HashMap<String, usize>,
}

impl SlugCounter {
    /// Slug for heading text, `None` when nothing survives
    fn next(&mut self, text: &str) -> Option<String> {
        let base = github_slug(text);
        if base.is_empty() {
            return None;
        }
        Some(self.claim(&base))
    }

    /// Take `base`, or the first free `base-N` when it is already used
    fn claim(&mut self, base: &str) -> String {
        let mut count = self.seen.get(base).copied().unwrap_or(0);
        let mut candidate = base.to_string();
        while self.seen.contains_key(&candidate) {
            count += 1;
            candidate = format!("{}-{}", base, count);
        }

        self.seen.insert(base.to_string(), count);
        self.seen.entry(candidate.clone()).or_insert(0);
        candidate
    }
}

fn github_slug(text: &str) -> String {
    SLUG_STRIP_RE
        .replace_all(&text.to_lowercase(), "")
        .replace(' ', "-")
}

fn plain_code_block(code: &str, lang: Option<&str>) -> String {
    match lang {
        Some(lang) => format!(
            r#"<pre><code class="language-{}">{}</code></pre>"#,
            html_escape(lang),
            html_escape(code)
        ),
        None => format!("<pre><code>{}</code></pre>", html_escape(code)),
    }
}

/// Simple HTML escaping
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
