//! Markdown engine abstraction used by page rendering.

use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};

use crate::html::HtmlBackend;
use crate::link::LinkRewriter;
use crate::renderer::{MarkdownRenderer, RenderResult};

/// Converts Markdown source into HTML plus its heading list.
///
/// Engines are shared across rendering threads.
pub trait MarkdownEngine: Send + Sync {
    /// Convert `source`, passing link and image URLs through `rewriter`.
    fn convert(&self, source: &str, rewriter: Option<&dyn LinkRewriter>) -> RenderResult;
}

/// pulldown-cmark engine with GitHub-flavored extensions.
#[derive(Clone, Copy, Debug)]
pub struct PulldownEngine {
    options: Options,
}

impl PulldownEngine {
    /// Engine with tables, strikethrough, task lists and `{#id}` heading attributes.
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(
            Options::ENABLE_TABLES
                | Options::ENABLE_STRIKETHROUGH
                | Options::ENABLE_TASKLISTS
                | Options::ENABLE_HEADING_ATTRIBUTES,
        )
    }

    /// Engine with an explicit set of parser extensions.
    #[must_use]
    pub fn with_options(options: Options) -> Self {
        Self { options }
    }
}

impl Default for PulldownEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownEngine for PulldownEngine {
    fn convert(&self, source: &str, rewriter: Option<&dyn LinkRewriter>) -> RenderResult {
        let parser = Parser::new_ext(source, self.options);
        let mut renderer = MarkdownRenderer::<HtmlBackend>::new();
        if let Some(rewriter) = rewriter {
            renderer = renderer.with_link_rewriter(rewriter);
        }
        renderer.render(parser)
    }
}

/// Plain text of the first level-1 heading, if any.
///
/// Empty headings are skipped.
///
/// # Examples
///
/// ```
/// use folio_renderer::extract_title;
///
/// assert_eq!(extract_title("Intro\n\n# Welcome to *Folio*\n").as_deref(), Some("Welcome to Folio"));
/// assert_eq!(extract_title("## Test"), None);
/// ```
#[must_use]
pub fn extract_title(markdown: &str) -> Option<String> {
    let mut text: Option<String> = None;

    for event in Parser::new_ext(markdown, Options::ENABLE_HEADING_ATTRIBUTES) {
        match event {
            Event::Start(Tag::Heading {
                level: HeadingLevel::H1,
                ..
            }) => text = Some(String::new()),
            Event::Text(t) | Event::Code(t) => {
                if let Some(buf) = text.as_mut() {
                    buf.push_str(&t);
                }
            }
            Event::End(TagEnd::Heading(HeadingLevel::H1)) => {
                if let Some(title) = text.take() {
                    let title = title.trim();
                    if !title.is_empty() {
                        return Some(title.to_owned());
                    }
                }
            }
            _ => {}
        }
    }

    None
}
