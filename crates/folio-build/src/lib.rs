//! Static site output for Folio.
//!
//! [`StaticSiteBuilder`] renders a loaded [`Site`](folio_site::Site) into
//! `site_dir`: one HTML file per page, plus verbatim copies of static pages
//! and media files. Output is staged and swapped into place atomically.

mod builder;
mod template;

pub use builder::{BuildConfig, BuildError, BuildReport, BuildWarning, StaticSiteBuilder};
