//! Trait-based markdown renderer with link rewriting.
//!
//! This crate provides a generic [`MarkdownRenderer`] that produces HTML
//! through the [`RenderBackend`] trait, and the [`MarkdownEngine`] capability
//! pages are rendered with.
//!
//! # Architecture
//!
//! - [`HtmlBackend`]: semantic HTML5 for code blocks, blockquotes and images
//! - [`LinkRewriter`]: hook receiving every link `href` and image `src`
//!   (including those in raw HTML) before it is written
//! - [`PulldownEngine`]: default [`MarkdownEngine`] wiring pulldown-cmark,
//!   the renderer and an optional rewriter together
//!
//! Every heading gets a unique anchor id and a [`TocEntry`];
//! [`build_toc_tree`] nests them.
//!
//! # Example
//!
//! ```
//! use folio_renderer::{MarkdownEngine, PulldownEngine, build_toc_tree};
//!
//! let result = PulldownEngine::new().convert("# Hello\n\n## Usage\n\n**Bold** text", None);
//! let toc = build_toc_tree(&result.toc);
//!
//! assert_eq!(result.title.as_deref(), Some("Hello"));
//! assert_eq!(toc[0].children[0].anchor_id, "usage");
//! ```

mod backend;
mod engine;
mod html;
mod link;
mod renderer;
mod state;
mod toc;
mod util;

pub use backend::RenderBackend;
pub use engine::{MarkdownEngine, PulldownEngine, extract_title};
pub use html::HtmlBackend;
pub use link::{BrokenLink, LinkKind, LinkOutcome, LinkRewriter};
pub use renderer::{MarkdownRenderer, RenderResult};
pub use state::{TocEntry, escape_html, slugify};
pub use toc::{TocItem, build_toc_tree};
