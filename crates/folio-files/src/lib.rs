//! Source file discovery, classification and URL resolution for Folio.
//!
//! This crate provides:
//! - [`FileRecord`]: identity of one source file and its computed output path
//! - [`FileCatalog`]: the ordered, indexed set of files discovered for one build
//! - [`urls`]: pure path and URL arithmetic shared by pages and link rewriting
//!
//! # Example
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::path::Path;
//! use folio_files::{ExcludePatterns, build_catalog};
//!
//! let exclude = ExcludePatterns::new(["drafts/", "*.tmp"])?;
//! let catalog = build_catalog(Path::new("docs"), &exclude)?;
//! for file in catalog.documentation_pages() {
//!     println!("{} -> {}", file.input_path(), file.output_path());
//! }
//! # Ok(())
//! # }
//! ```

mod catalog;
mod exclude;
mod file;
pub mod urls;

pub use catalog::{CatalogError, FileCatalog, OutputCollision, build_catalog, sort_files};
pub use exclude::ExcludePatterns;
pub use file::{FileKind, FileRecord, MediaKind};
