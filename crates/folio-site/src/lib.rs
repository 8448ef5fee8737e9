//! Pages, navigation and site rendering for Folio.
//!
//! This crate provides:
//! - [`Page`]: a documentation file with its front matter, resolved title and
//!   absolute, canonical and edit URLs
//! - [`CatalogLinkRewriter`]: turns links between source files into links
//!   between output pages
//! - [`Navigation`]: page order and sections, from `[[nav]]` or the directory
//!   layout
//! - [`Site`]: loads all of the above and renders pages in parallel
//!
//! # Quick Start
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use folio_config::Config;
//! use folio_renderer::PulldownEngine;
//! use folio_site::Site;
//!
//! let config = Config::load(None, None)?;
//! let mut site = Site::load(&config)?;
//! for outcome in site.render_all(&PulldownEngine::new())? {
//!     println!("{}: {} broken links", outcome.page, outcome.broken_links.len());
//! }
//! # Ok(())
//! # }
//! ```

mod link;
mod meta;
mod nav;
mod page;
mod site;
mod url;

pub use link::CatalogLinkRewriter;
pub use meta::{FrontMatter, parse_front_matter};
pub use nav::{NavItem, Navigation, PageId, Section, SectionId};
pub use page::{
    Page, PageConfig, PageError, RenderError, RenderOutcome, TITLE_PRECEDENCE, TitleSource,
};
pub use site::{Site, SiteError};
