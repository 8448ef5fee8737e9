//! Documentation pages.
//!
//! A [`Page`] pairs a catalog [`FileRecord`] with its loaded Markdown, front
//! matter and every URL derived from the configuration. Titles and URLs are
//! resolved once at construction; `html` and `toc` are filled by
//! [`Page::render`].

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use folio_config::Config;
use folio_files::urls::output_url;
use folio_files::{FileCatalog, FileRecord};
use folio_renderer::{BrokenLink, MarkdownEngine, TocItem, build_toc_tree, extract_title};
use serde_json::Value;

use crate::link::CatalogLinkRewriter;
use crate::meta::{FrontMatter, parse_front_matter};
use crate::nav::{PageId, SectionId};
use crate::url;

/// Environment variable pinning the page update date (Unix seconds).
const SOURCE_DATE_EPOCH: &str = "SOURCE_DATE_EPOCH";

/// Settings pages are constructed and rendered with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageConfig {
    /// Address pages by directory (`/guide/`) instead of file.
    pub use_directory_urls: bool,
    /// Public site URL for canonical links.
    pub site_url: Option<String>,
    /// Repository URL for edit links.
    pub repo_url: Option<String>,
    /// Path, query or fragment joined onto `repo_url`.
    pub edit_uri: Option<String>,
    /// Fail rendering on broken links.
    pub strict: bool,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            use_directory_urls: true,
            site_url: None,
            repo_url: None,
            edit_uri: None,
            strict: false,
        }
    }
}

impl PageConfig {
    /// Extract page settings from a loaded configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            use_directory_urls: config.site.use_directory_urls,
            site_url: config.site.url.clone(),
            repo_url: config.repo.url.clone(),
            edit_uri: config.repo.edit_uri.clone(),
            strict: config.site.strict,
        }
    }
}

/// Error returned when a page cannot be loaded.
#[derive(Debug, thiserror::Error)]
pub enum PageError {
    /// Source file does not exist.
    #[error("Source file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// Source file could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Error returned when page rendering fails.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// A link points at a file missing from the catalog (strict mode).
    #[error(
        "Documentation file '{page}' contains a link to '{target}' which does not exist in the docs directory"
    )]
    BrokenLink { page: String, target: String },
}

/// Diagnostics from a successful render.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderOutcome {
    /// Input path of the rendered page.
    pub page: String,
    /// Links whose target was not found, kept as written.
    pub broken_links: Vec<BrokenLink>,
}

/// Where a page title can come from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TitleSource {
    /// Title given by the navigation config.
    Override,
    /// `title` front matter field.
    FrontMatter,
    /// First level-1 heading of the body.
    Heading,
    /// Literal `Home` for the site's home page.
    Home,
    /// Derived from the file name.
    Filename,
}

/// Title sources, highest priority first.
pub const TITLE_PRECEDENCE: [TitleSource; 5] = [
    TitleSource::Override,
    TitleSource::FrontMatter,
    TitleSource::Heading,
    TitleSource::Home,
    TitleSource::Filename,
];

struct TitleInputs<'a> {
    title_override: Option<&'a str>,
    meta: &'a FrontMatter,
    markdown: &'a str,
    file: &'a FileRecord,
}

impl TitleSource {
    fn resolve(self, inputs: &TitleInputs<'_>) -> Option<String> {
        match self {
            Self::Override => inputs.title_override.map(str::to_owned),
            Self::FrontMatter => match inputs.meta.get("title")? {
                Value::Null => None,
                Value::String(s) => Some(s.clone()),
                other => Some(other.to_string()),
            },
            Self::Heading => extract_title(inputs.markdown),
            // Only the root index can be the home page before navigation exists.
            Self::Home => (inputs.file.dir().is_empty() && inputs.file.is_index())
                .then(|| "Home".to_owned()),
            Self::Filename => Some(filename_title(inputs.file.root())),
        }
    }
}

/// Title derived from a file stem.
///
/// `-` and `_` become spaces; an all-lowercase name gets its first letter
/// capitalized, anything else is kept as written.
pub(crate) fn filename_title(root: &str) -> String {
    let title = root.replace(['-', '_'], " ");
    if title.to_lowercase() != title {
        return title;
    }
    let mut chars = title.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => title,
    }
}

/// Append `/` unless already present.
fn slash_terminated(value: &str) -> String {
    if value.ends_with('/') {
        value.to_owned()
    } else {
        format!("{value}/")
    }
}

fn canonical_url(site_url: Option<&str>, abs_url: &str) -> Option<String> {
    let site_url = site_url.filter(|u| !u.is_empty())?;
    Some(format!(
        "{}{}",
        slash_terminated(site_url),
        abs_url.trim_start_matches('/')
    ))
}

fn edit_url(repo_url: Option<&str>, edit_uri: Option<&str>, input_path: &str) -> Option<String> {
    let repo_url = repo_url.filter(|u| !u.is_empty())?;
    let Some(edit_uri) = edit_uri.filter(|u| !u.is_empty()) else {
        return Some(slash_terminated(repo_url));
    };

    // Query and fragment edit URIs attach to the repository URL as written.
    let base = if edit_uri.starts_with(['?', '#']) {
        repo_url.to_owned()
    } else {
        slash_terminated(repo_url)
    };
    let reference = format!("{}{input_path}", slash_terminated(edit_uri));

    Some(url::join(&base, &reference))
}

/// `SOURCE_DATE_EPOCH` as a UTC date, or today.
fn update_date() -> String {
    let pinned = std::env::var(SOURCE_DATE_EPOCH).ok().and_then(|value| {
        let date = value
            .trim()
            .parse::<i64>()
            .ok()
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0));
        if date.is_none() {
            tracing::warn!(value = %value, "Ignoring invalid SOURCE_DATE_EPOCH");
        }
        date
    });
    pinned.unwrap_or_else(Utc::now).format("%Y-%m-%d").to_string()
}

/// A documentation page.
#[derive(Clone, Debug)]
pub struct Page {
    file: Arc<FileRecord>,
    title: String,
    markdown: String,
    meta: FrontMatter,
    abs_url: String,
    canonical_url: Option<String>,
    edit_url: Option<String>,
    update_date: String,
    html: Option<String>,
    toc: Vec<TocItem>,
    pub(crate) parent: Option<SectionId>,
    pub(crate) previous: Option<PageId>,
    pub(crate) next: Option<PageId>,
}

impl Page {
    /// Load a page from its source file.
    ///
    /// # Errors
    ///
    /// Returns `PageError::NotFound` if the source file doesn't exist.
    /// Returns `PageError::Io` if it cannot be read.
    pub fn new(
        title_override: Option<&str>,
        file: Arc<FileRecord>,
        config: &PageConfig,
    ) -> Result<Self, PageError> {
        let path = file.abs_input_path();
        let source = std::fs::read_to_string(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => PageError::NotFound(path.clone()),
            _ => PageError::Io {
                path: path.clone(),
                source: e,
            },
        })?;

        Ok(Self::from_source(title_override, file, config, &source))
    }

    /// Build a page from already loaded source text.
    #[must_use]
    pub fn from_source(
        title_override: Option<&str>,
        file: Arc<FileRecord>,
        config: &PageConfig,
        source: &str,
    ) -> Self {
        let (markdown, meta) = parse_front_matter(source);

        let title = {
            let inputs = TitleInputs {
                title_override,
                meta: &meta,
                markdown: &markdown,
                file: &file,
            };
            TITLE_PRECEDENCE
                .iter()
                .find_map(|source| source.resolve(&inputs))
                .unwrap_or_default()
        };

        let abs_url = output_url(file.output_path(), config.use_directory_urls);
        let canonical_url = canonical_url(config.site_url.as_deref(), &abs_url);
        let edit_url = edit_url(
            config.repo_url.as_deref(),
            config.edit_uri.as_deref(),
            file.input_path(),
        );

        Self {
            file,
            title,
            markdown,
            meta,
            abs_url,
            canonical_url,
            edit_url,
            update_date: update_date(),
            html: None,
            toc: Vec::new(),
            parent: None,
            previous: None,
            next: None,
        }
    }

    /// Render the Markdown body, rewriting links against `catalog`.
    ///
    /// Replaces any previously rendered `html` and `toc`.
    ///
    /// # Errors
    ///
    /// Returns `RenderError::BrokenLink` in strict mode when a link target is
    /// missing from the catalog. In permissive mode broken links are logged
    /// and returned in the outcome.
    pub fn render(
        &mut self,
        config: &PageConfig,
        catalog: &FileCatalog,
        engine: &dyn MarkdownEngine,
    ) -> Result<RenderOutcome, RenderError> {
        let rewriter = CatalogLinkRewriter::new(&self.file, catalog, config.use_directory_urls);
        let result = engine.convert(&self.markdown, Some(&rewriter));

        for link in &result.broken_links {
            tracing::warn!(
                page = %self.file.input_path(),
                target = %link.target,
                "Link target not found in docs directory"
            );
        }
        if config.strict
            && let Some(link) = result.broken_links.first()
        {
            return Err(RenderError::BrokenLink {
                page: self.file.input_path().to_owned(),
                target: link.target.clone(),
            });
        }

        self.html = Some(result.html);
        self.toc = build_toc_tree(&result.toc);

        Ok(RenderOutcome {
            page: self.file.input_path().to_owned(),
            broken_links: result.broken_links,
        })
    }

    #[must_use]
    pub fn file(&self) -> &Arc<FileRecord> {
        &self.file
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Markdown body without front matter.
    #[must_use]
    pub fn markdown(&self) -> &str {
        &self.markdown
    }

    #[must_use]
    pub fn meta(&self) -> &FrontMatter {
        &self.meta
    }

    /// Site-absolute URL, starting with `/`.
    #[must_use]
    pub fn abs_url(&self) -> &str {
        &self.abs_url
    }

    #[must_use]
    pub fn canonical_url(&self) -> Option<&str> {
        self.canonical_url.as_deref()
    }

    #[must_use]
    pub fn edit_url(&self) -> Option<&str> {
        self.edit_url.as_deref()
    }

    /// Date shown as the last update, `YYYY-MM-DD`.
    #[must_use]
    pub fn update_date(&self) -> &str {
        &self.update_date
    }

    /// Rendered HTML, `None` until [`Page::render`] succeeds.
    #[must_use]
    pub fn html(&self) -> Option<&str> {
        self.html.as_deref()
    }

    #[must_use]
    pub fn toc(&self) -> &[TocItem] {
        &self.toc
    }

    #[must_use]
    pub fn parent(&self) -> Option<SectionId> {
        self.parent
    }

    #[must_use]
    pub fn previous(&self) -> Option<PageId> {
        self.previous
    }

    #[must_use]
    pub fn next(&self) -> Option<PageId> {
        self.next
    }

    /// Whether the page is an `index` or `readme` document.
    #[must_use]
    pub fn is_index(&self) -> bool {
        self.file.is_index()
    }

    #[must_use]
    pub fn is_top_level(&self) -> bool {
        self.parent.is_none()
    }

    #[must_use]
    pub fn is_homepage(&self) -> bool {
        self.is_top_level() && self.is_index()
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use folio_renderer::{LinkKind, PulldownEngine};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    fn record(input_path: &str) -> Arc<FileRecord> {
        Arc::new(FileRecord::new(Path::new("/docs"), input_path))
    }

    fn page(input_path: &str, source: &str) -> Page {
        Page::from_source(None, record(input_path), &PageConfig::default(), source)
    }

    #[test]
    fn test_title_from_override() {
        let page = Page::from_source(
            Some("Override"),
            record("index.md"),
            &PageConfig::default(),
            "---\ntitle: Meta\n---\n# Heading",
        );
        assert_eq!(page.title(), "Override");
    }

    #[test]
    fn test_title_from_front_matter() {
        assert_eq!(page("foo.md", "title: Meta\n\n# Heading").title(), "Meta");
        assert_eq!(page("foo.md", "---\ntitle: 42\n---\n# Heading").title(), "42");
    }

    #[test]
    fn test_title_null_front_matter_skipped() {
        assert_eq!(page("foo.md", "---\ntitle:\n---\n# Heading").title(), "Heading");
    }

    #[test]
    fn test_title_from_heading() {
        assert_eq!(page("foo.md", "Intro\n\n# Welcome\n").title(), "Welcome");
    }

    #[test]
    fn test_title_from_filename() {
        assert_eq!(page("page-title.md", "## Test").title(), "Page title");
        assert_eq!(page("sub/page_title.md", "## Test").title(), "Page title");
        assert_eq!(page("pageTitle.md", "## Test").title(), "pageTitle");
        assert_eq!(page("sub/index.md", "## Test").title(), "Index");
    }

    #[test]
    fn test_title_home() {
        assert_eq!(page("index.md", "## Test").title(), "Home");
        assert_eq!(page("README.md", "").title(), "Home");
        assert_eq!(page("index.md", "# Welcome").title(), "Welcome");
    }

    #[test]
    fn test_title_precedence_order() {
        assert_eq!(TITLE_PRECEDENCE[0], TitleSource::Override);
        assert_eq!(TITLE_PRECEDENCE[4], TitleSource::Filename);
    }

    #[test]
    fn test_abs_url() {
        assert_eq!(page("index.md", "").abs_url(), "/");
        assert_eq!(page("foo/bar.md", "").abs_url(), "/foo/bar/");

        let config = PageConfig {
            use_directory_urls: false,
            ..PageConfig::default()
        };
        let page = Page::from_source(None, record("foo/bar.md"), &config, "");
        assert_eq!(page.abs_url(), "/foo/bar/index.html");
    }

    #[test]
    fn test_canonical_url() {
        let config = PageConfig {
            site_url: Some("https://example.com/docs".to_owned()),
            ..PageConfig::default()
        };
        let page = Page::from_source(None, record("testing.md"), &config, "");
        assert_eq!(page.canonical_url(), Some("https://example.com/docs/testing/"));
        assert_eq!(self::page("testing.md", "").canonical_url(), None);
    }

    #[test]
    fn test_edit_url() {
        let cases = [
            ("http://github.com/example/handbook", Some("edit/master/docs/"), "http://github.com/example/handbook/edit/master/docs/testing.md"),
            ("http://example.com", None, "http://example.com/"),
            ("http://example.com", Some(""), "http://example.com/"),
            ("http://example.com", Some("edit/master"), "http://example.com/edit/master/testing.md"),
            ("http://example.com/foo/", Some("edit/master/"), "http://example.com/foo/edit/master/testing.md"),
            ("http://example.com/foo/", Some("/edit/master"), "http://example.com/edit/master/testing.md"),
            ("http://example.com", Some("?query=edit/master"), "http://example.com/?query=edit/master/testing.md"),
            ("http://example.com/", Some("?query=edit/master/"), "http://example.com/?query=edit/master/testing.md"),
            ("http://example.com", Some("#edit/master"), "http://example.com/#edit/master/testing.md"),
            ("http://example.com", Some("#edit/master/"), "http://example.com/#edit/master/testing.md"),
        ];

        for (repo_url, edit_uri, expected) in cases {
            let config = PageConfig {
                repo_url: Some(repo_url.to_owned()),
                edit_uri: edit_uri.map(str::to_owned),
                ..PageConfig::default()
            };
            let page = Page::from_source(None, record("testing.md"), &config, "");
            assert_eq!(page.edit_url(), Some(expected), "{repo_url} + {edit_uri:?}");
        }
    }

    #[test]
    fn test_edit_url_without_repo() {
        assert_eq!(page("testing.md", "").edit_url(), None);
    }

    #[test]
    fn test_edit_url_nested_input_path() {
        let config = PageConfig {
            repo_url: Some("https://example.com/repo".to_owned()),
            edit_uri: Some("blob/main/docs".to_owned()),
            ..PageConfig::default()
        };
        let page = Page::from_source(None, record("guide/setup.md"), &config, "");
        assert_eq!(
            page.edit_url(),
            Some("https://example.com/repo/blob/main/docs/guide/setup.md")
        );
    }

    #[test]
    fn test_filename_title() {
        assert_eq!(filename_title("getting_started-guide"), "Getting started guide");
        assert_eq!(filename_title("API-reference"), "API reference");
        assert_eq!(filename_title(""), "");
    }

    #[test]
    fn test_navigation_booleans() {
        let mut page = page("index.md", "");
        assert!(page.is_index());
        assert!(page.is_top_level());
        assert!(page.is_homepage());

        page.parent = Some(SectionId(0));
        assert!(!page.is_top_level());
        assert!(!page.is_homepage());

        assert!(!self::page("foo.md", "").is_index());
    }

    #[test]
    fn test_new_reads_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("guide.md"), "---\ntitle: Guide\n---\nBody\n").unwrap();

        let file = Arc::new(FileRecord::new(dir.path(), "guide.md"));
        let page = Page::new(None, file, &PageConfig::default()).unwrap();

        assert_eq!(page.title(), "Guide");
        assert_eq!(page.markdown(), "Body\n");
        assert_eq!(page.meta()["title"], "Guide");
        assert_eq!(page.html(), None);
        assert!(page.toc().is_empty());
        assert_eq!(page.update_date().len(), "2024-01-01".len());
    }

    #[test]
    fn test_new_missing_file() {
        let dir = TempDir::new().unwrap();
        let file = Arc::new(FileRecord::new(dir.path(), "missing.md"));
        let result = Page::new(None, file, &PageConfig::default());
        assert!(matches!(result, Err(PageError::NotFound(_))));
    }

    fn catalog(paths: &[&str]) -> FileCatalog {
        FileCatalog::new(
            paths
                .iter()
                .map(|p| FileRecord::new(Path::new("/docs"), p))
                .collect(),
        )
    }

    #[test]
    fn test_render_rewrites_links_and_builds_toc() {
        let catalog = catalog(&["index.md", "guide/install.md", "img/logo.png"]);
        let mut page = page(
            "guide/install.md",
            "# Install\n\n## Steps\n\n[Home](../index.md#top) ![Logo](../img/logo.png)",
        );

        let outcome = page
            .render(&PageConfig::default(), &catalog, &PulldownEngine::new())
            .unwrap();

        assert!(outcome.broken_links.is_empty());
        assert_eq!(outcome.page, "guide/install.md");
        let html = page.html().unwrap();
        assert!(html.contains(r#"<a href="../../#top">Home</a>"#), "{html}");
        assert!(html.contains(r#"<img src="../../img/logo.png" alt="Logo">"#), "{html}");
        assert_eq!(page.toc().len(), 1);
        assert_eq!(page.toc()[0].children[0].anchor_id, "steps");
    }

    #[test]
    fn test_render_broken_link_permissive() {
        let catalog = catalog(&["index.md"]);
        let mut page = page("index.md", r#"<a href="missing.md">x</a>"#);

        let outcome = page
            .render(&PageConfig::default(), &catalog, &PulldownEngine::new())
            .unwrap();

        assert!(page.html().unwrap().contains(r#"<a href="missing.md">x</a>"#));
        assert_eq!(outcome.broken_links.len(), 1);
        assert_eq!(outcome.broken_links[0].target, "missing.md");
        assert_eq!(outcome.broken_links[0].kind, LinkKind::Link);
    }

    #[test]
    fn test_render_broken_link_strict() {
        let catalog = catalog(&["index.md"]);
        let mut page = page("index.md", "[x](sub/missing.md)");
        let config = PageConfig {
            strict: true,
            ..PageConfig::default()
        };

        let err = page
            .render(&config, &catalog, &PulldownEngine::new())
            .unwrap_err();

        let RenderError::BrokenLink { page: source, target } = err;
        assert_eq!(source, "index.md");
        assert_eq!(target, "sub/missing.md");
        assert_eq!(page.html(), None);
    }

    #[test]
    fn test_render_replaces_previous_output() {
        let catalog = catalog(&["index.md"]);
        let mut page = page("index.md", "# One");
        let engine = PulldownEngine::new();

        page.render(&PageConfig::default(), &catalog, &engine).unwrap();
        let first = page.html().map(str::to_owned);
        page.render(&PageConfig::default(), &catalog, &engine).unwrap();

        assert_eq!(page.html().map(str::to_owned), first);
        assert_eq!(page.toc().len(), 1);
    }
}
