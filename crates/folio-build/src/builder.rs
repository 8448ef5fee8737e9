//! Static site builder.
//!
//! Renders every page of a [`Site`], wraps it in the page shell and writes
//! it to the output directory together with copies of static pages and media
//! files.
//!
//! The output is assembled in a staging directory next to `site_dir` and
//! moved into place only once every file was written. A failed build leaves
//! the previous `site_dir` as it was.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use folio_config::Config;
use folio_files::urls::{INDEX_FILE, output_url, relative_url};
use folio_files::{FileCatalog, OutputCollision};
use folio_renderer::{MarkdownEngine, PulldownEngine};
use folio_site::{NavItem, Page, PageId, RenderError, Site};
use tempfile::TempDir;

use crate::template::{LinkData, NavItemData, PageData, render_page};

/// Configuration for static site building.
#[derive(Clone, Debug)]
pub struct BuildConfig {
    /// Directory the site is published to.
    pub site_dir: PathBuf,
    /// Site name shown in titles and the sidebar.
    pub site_name: String,
}

impl BuildConfig {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            site_dir: config.docs_resolved.site_dir.clone(),
            site_name: config.site.name.clone(),
        }
    }
}

/// Error returned by the static site builder.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Render(#[from] RenderError),
    /// Several source files produce the same output file (strict mode).
    #[error("Output file '{output_path}' is produced by several source files: {}", input_paths.join(", "))]
    OutputCollision {
        output_path: String,
        input_paths: Vec<String>,
    },
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> BuildError + '_ {
    move |source| BuildError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Problem that did not stop a permissive build.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BuildWarning {
    BrokenLink { page: String, target: String },
    OutputCollision(OutputCollision),
}

impl fmt::Display for BuildWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BrokenLink { page, target } => write!(
                f,
                "Documentation file '{page}' contains a link to '{target}' which does not exist in the docs directory"
            ),
            Self::OutputCollision(collision) => write!(
                f,
                "Output file '{}' is produced by several source files: {}",
                collision.output_path,
                collision.input_paths.join(", ")
            ),
        }
    }
}

/// Summary of a finished build.
#[derive(Debug, Default)]
pub struct BuildReport {
    /// Pages rendered and written.
    pub pages: usize,
    /// Static pages and media files copied.
    pub copied: usize,
    pub warnings: Vec<BuildWarning>,
}

/// Builds a static documentation site.
pub struct StaticSiteBuilder {
    config: BuildConfig,
    engine: Box<dyn MarkdownEngine>,
}

impl StaticSiteBuilder {
    /// Create a builder rendering with [`PulldownEngine`].
    #[must_use]
    pub fn new(config: BuildConfig) -> Self {
        Self {
            config,
            engine: Box::new(PulldownEngine::new()),
        }
    }

    /// Render pages with another Markdown engine.
    #[must_use]
    pub fn with_engine(mut self, engine: Box<dyn MarkdownEngine>) -> Self {
        self.engine = engine;
        self
    }

    /// Render `site` and publish it to `site_dir`.
    ///
    /// # Errors
    ///
    /// Returns `BuildError::OutputCollision` or `BuildError::Render` in
    /// strict mode, `BuildError::Io` if any file cannot be read or written.
    pub fn build(&self, site: &mut Site) -> Result<BuildReport, BuildError> {
        let mut report = BuildReport::default();

        for collision in site.catalog().output_collisions() {
            if site.config().strict {
                return Err(BuildError::OutputCollision {
                    output_path: collision.output_path.clone(),
                    input_paths: collision.input_paths.clone(),
                });
            }
            tracing::warn!(
                output = %collision.output_path,
                inputs = ?collision.input_paths,
                "Several source files produce the same output"
            );
            report
                .warnings
                .push(BuildWarning::OutputCollision(collision.clone()));
        }

        for outcome in site.render_all(self.engine.as_ref())? {
            for link in outcome.broken_links {
                report.warnings.push(BuildWarning::BrokenLink {
                    page: outcome.page.clone(),
                    target: link.target,
                });
            }
        }

        let site_dir = &self.config.site_dir;
        let parent = site_dir
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        fs::create_dir_all(parent).map_err(io_error(parent))?;

        let staging = tempfile::Builder::new()
            .prefix(".folio-build-")
            .tempdir_in(parent)
            .map_err(io_error(parent))?;
        set_public_permissions(staging.path())?;

        report.pages = self.write_pages(site, staging.path())?;
        report.copied = copy_files(site.catalog(), staging.path())?;
        publish(staging.path(), site_dir, parent)?;

        tracing::info!(
            site_dir = %site_dir.display(),
            pages = report.pages,
            copied = report.copied,
            warnings = report.warnings.len(),
            "Site built"
        );
        Ok(report)
    }

    fn write_pages(&self, site: &Site, out_dir: &Path) -> Result<usize, BuildError> {
        let use_directory_urls = site.config().use_directory_urls;
        let home_url = output_url(INDEX_FILE, use_directory_urls);

        for (index, page) in site.pages().iter().enumerate() {
            let neighbour = |id: Option<PageId>| {
                let other = site.page(id?)?;
                Some(LinkData {
                    title: other.title().to_owned(),
                    url: link_from(page, other.abs_url(), use_directory_urls),
                })
            };

            let home = link_from(page, &home_url, use_directory_urls);
            let data = PageData {
                title: page.title(),
                site_name: &self.config.site_name,
                home_url: &home,
                html_content: page.html().unwrap_or_default(),
                canonical_url: page.canonical_url(),
                edit_url: page.edit_url(),
                update_date: page.update_date(),
                previous: neighbour(page.previous()),
                next: neighbour(page.next()),
                toc: page.toc(),
                navigation: nav_data(site, site.navigation().items(), page, index),
            };

            let dest = out_dir.join(page.file().output_path());
            write_file(&dest, render_page(&data).as_bytes())?;
        }

        Ok(site.pages().len())
    }
}

/// Relative link from `page` to a site-absolute URL.
fn link_from(page: &Page, abs_url: &str, use_directory_urls: bool) -> String {
    relative_url(
        abs_url.trim_start_matches('/'),
        page.file().input_path(),
        use_directory_urls,
    )
}

fn nav_data(
    site: &Site,
    items: &[NavItem],
    current: &Page,
    current_index: usize,
) -> Vec<NavItemData> {
    let use_directory_urls = site.config().use_directory_urls;

    items
        .iter()
        .filter_map(|item| match *item {
            NavItem::Page(id) => {
                let page = site.page(id)?;
                Some(NavItemData {
                    title: page.title().to_owned(),
                    url: Some(link_from(current, page.abs_url(), use_directory_urls)),
                    children: Vec::new(),
                    is_active: id.index() == current_index,
                })
            }
            NavItem::Section(id) => {
                let section = site.section(id)?;
                Some(NavItemData {
                    title: section.title.clone(),
                    url: None,
                    children: nav_data(site, &section.children, current, current_index),
                    is_active: false,
                })
            }
        })
        .collect()
}

fn copy_files(catalog: &FileCatalog, out_dir: &Path) -> Result<usize, BuildError> {
    let mut copied = 0;
    for file in catalog.static_pages().chain(catalog.media_files()) {
        let dest = out_dir.join(file.output_path());
        create_parent(&dest)?;
        let source = file.abs_input_path();
        fs::copy(&source, &dest).map_err(io_error(&source))?;
        copied += 1;
    }
    Ok(copied)
}

fn write_file(path: &Path, contents: &[u8]) -> Result<(), BuildError> {
    create_parent(path)?;
    fs::write(path, contents).map_err(io_error(path))
}

fn create_parent(path: &Path) -> Result<(), BuildError> {
    match path.parent() {
        Some(parent) => fs::create_dir_all(parent).map_err(io_error(parent)),
        None => Ok(()),
    }
}

/// Staging directories are created owner-only.
#[cfg(unix)]
fn set_public_permissions(path: &Path) -> Result<(), BuildError> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).map_err(io_error(path))
}

#[cfg(not(unix))]
fn set_public_permissions(_path: &Path) -> Result<(), BuildError> {
    Ok(())
}

/// Swap the staged output into `site_dir`.
///
/// The previous site is moved aside first and restored if the swap fails.
fn publish(staging: &Path, site_dir: &Path, parent: &Path) -> Result<(), BuildError> {
    let previous = if site_dir.exists() {
        let holder = tempfile::Builder::new()
            .prefix(".folio-old-")
            .tempdir_in(parent)
            .map_err(io_error(parent))?;
        let moved = holder.path().join("site");
        fs::rename(site_dir, &moved).map_err(io_error(site_dir))?;
        Some((holder, moved))
    } else {
        None
    };

    if let Err(source) = fs::rename(staging, site_dir) {
        if let Some((holder, moved)) = previous {
            restore_previous(holder, &moved, site_dir);
        }
        return Err(BuildError::Io {
            path: site_dir.to_path_buf(),
            source,
        });
    }

    // Dropping the holder removes the previous site
    drop(previous);
    Ok(())
}

/// Move the previous site back into `site_dir`.
///
/// If that fails too, the holder is kept on disk so the old site survives.
fn restore_previous(holder: TempDir, moved: &Path, site_dir: &Path) {
    if let Err(err) = fs::rename(moved, site_dir) {
        let kept = holder.keep();
        tracing::error!(
            site_dir = %site_dir.display(),
            kept = %kept.join("site").display(),
            error = %err,
            "Could not restore previous site"
        );
    }
}
