//! Site loading and rendering.
//!
//! A [`Site`] owns everything one build works on: the file catalog, the
//! pages built from its documentation files and their navigation. It is
//! loaded in one go and replaced wholesale on rebuild.
//!
//! # Thread Safety
//!
//! [`Site::render_all`] renders pages on the global rayon pool. The catalog
//! and page settings are shared read-only; each page only writes its own
//! output.

use std::collections::HashMap;
use std::sync::Arc;

use folio_config::{Config, NavEntry};
use folio_files::{CatalogError, ExcludePatterns, FileCatalog, build_catalog};
use folio_renderer::MarkdownEngine;
use rayon::prelude::*;

use crate::nav::{Navigation, PageId, Section, SectionId};
use crate::page::{Page, PageConfig, PageError, RenderError, RenderOutcome};

/// Error returned when a site cannot be loaded.
#[derive(Debug, thiserror::Error)]
pub enum SiteError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Page(#[from] PageError),
}

/// Loaded documentation site.
#[derive(Debug)]
pub struct Site {
    config: PageConfig,
    catalog: FileCatalog,
    pages: Vec<Page>,
    navigation: Navigation,
    path_index: HashMap<String, PageId>,
}

impl Site {
    /// Discover source files and load every documentation page.
    ///
    /// # Errors
    ///
    /// Returns `SiteError::Catalog` if the source directory cannot be read
    /// or an exclude pattern is invalid, `SiteError::Page` if a page cannot
    /// be loaded.
    pub fn load(config: &Config) -> Result<Self, SiteError> {
        let docs = &config.docs_resolved;
        let exclude = ExcludePatterns::new(&docs.exclude)?;
        let catalog = build_catalog(&docs.source_dir, &exclude)?;

        Self::from_catalog(catalog, &config.nav, PageConfig::from_config(config))
    }

    /// Load pages for an existing catalog.
    ///
    /// # Errors
    ///
    /// Returns `SiteError::Page` if a page cannot be loaded.
    pub fn from_catalog(
        catalog: FileCatalog,
        nav: &[NavEntry],
        config: PageConfig,
    ) -> Result<Self, SiteError> {
        let mut overrides = HashMap::new();
        collect_title_overrides(nav, &mut overrides);

        let mut pages = Vec::new();
        for file in catalog.documentation_pages() {
            let title = overrides.get(file.input_path()).map(String::as_str);
            pages.push(Page::new(title, Arc::clone(file), &config)?);
        }

        let navigation = Navigation::build(nav, &pages);
        navigation.apply(&mut pages);

        let path_index = pages
            .iter()
            .enumerate()
            .map(|(i, page)| (page.file().input_path().to_owned(), PageId(i)))
            .collect();

        tracing::info!(
            files = catalog.len(),
            pages = pages.len(),
            "Loaded site"
        );

        Ok(Self {
            config,
            catalog,
            pages,
            navigation,
            path_index,
        })
    }

    /// Render every page in parallel.
    ///
    /// Outcomes are returned in page order.
    ///
    /// # Errors
    ///
    /// Returns the first `RenderError` in strict mode.
    pub fn render_all(
        &mut self,
        engine: &dyn MarkdownEngine,
    ) -> Result<Vec<RenderOutcome>, RenderError> {
        let config = &self.config;
        let catalog = &self.catalog;

        self.pages
            .par_iter_mut()
            .map(|page| page.render(config, catalog, engine))
            .collect()
    }

    #[must_use]
    pub fn config(&self) -> &PageConfig {
        &self.config
    }

    #[must_use]
    pub fn catalog(&self) -> &FileCatalog {
        &self.catalog
    }

    #[must_use]
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    #[must_use]
    pub fn page(&self, id: PageId) -> Option<&Page> {
        self.pages.get(id.0)
    }

    /// Page built from the given input path.
    #[must_use]
    pub fn page_by_path(&self, input_path: &str) -> Option<&Page> {
        self.path_index.get(input_path).and_then(|&id| self.page(id))
    }

    #[must_use]
    pub fn navigation(&self) -> &Navigation {
        &self.navigation
    }

    #[must_use]
    pub fn section(&self, id: SectionId) -> Option<&Section> {
        self.navigation.section(id)
    }
}

/// Map nav page paths to their configured titles.
fn collect_title_overrides(entries: &[NavEntry], out: &mut HashMap<String, String>) {
    for entry in entries {
        match (&entry.path, &entry.title) {
            (Some(path), Some(title)) => {
                let path = folio_files::urls::normalize_path(path);
                out.insert(path.trim_start_matches('/').to_owned(), title.clone());
            }
            _ => collect_title_overrides(&entry.children, out),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use folio_renderer::PulldownEngine;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    fn write(root: &Path, path: &str, content: &str) {
        let full = root.join(path);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(full, content).unwrap();
    }

    fn fixture() -> TempDir {
        let dir = TempDir::new().unwrap();
        let docs = dir.path().join("docs");
        write(&docs, "index.md", "# Welcome\n\nSee [install](guide/install.md).\n");
        write(&docs, "guide/install.md", "# Install\n\n[Back](../index.md)\n");
        write(&docs, "guide/broken.md", "[Gone](missing.md)\n");
        write(&docs, "img/logo.png", "png");
        write(&docs, ".hidden/secret.md", "# Secret");
        dir
    }

    fn config(root: &Path) -> Config {
        let mut config = Config::default();
        config.docs_resolved.source_dir = root.join("docs");
        config.docs_resolved.site_dir = root.join("site");
        config
    }

    #[test]
    fn test_load() {
        let dir = fixture();
        let site = Site::load(&config(dir.path())).unwrap();

        assert_eq!(site.catalog().len(), 4);
        let paths: Vec<_> = site.pages().iter().map(|p| p.file().input_path()).collect();
        assert_eq!(paths, ["index.md", "guide/broken.md", "guide/install.md"]);
        assert_eq!(site.page_by_path("index.md").unwrap().title(), "Welcome");
        assert!(site.page_by_path("index.md").unwrap().is_homepage());
        assert_eq!(site.page_by_path("guide/broken.md").unwrap().title(), "Broken");
        assert!(site.page_by_path(".hidden/secret.md").is_none());
    }

    #[test]
    fn test_load_missing_source_dir() {
        let dir = TempDir::new().unwrap();
        let result = Site::load(&config(dir.path()));
        assert!(matches!(result, Err(SiteError::Catalog(_))));
    }

    #[test]
    fn test_load_with_nav_titles() {
        let dir = fixture();
        let mut config = config(dir.path());
        config.nav = vec![
            NavEntry {
                title: Some("Start".to_owned()),
                path: Some("index.md".to_owned()),
                children: Vec::new(),
            },
            NavEntry {
                title: Some("Guide".to_owned()),
                path: None,
                children: vec![NavEntry {
                    title: Some("Installing".to_owned()),
                    path: Some("guide/install.md".to_owned()),
                    children: Vec::new(),
                }],
            },
        ];

        let site = Site::load(&config).unwrap();
        let install = site.page_by_path("guide/install.md").unwrap();

        assert_eq!(site.page_by_path("index.md").unwrap().title(), "Start");
        assert_eq!(install.title(), "Installing");
        assert_eq!(site.section(install.parent().unwrap()).unwrap().title, "Guide");
        assert_eq!(
            site.page(install.previous().unwrap()).unwrap().file().input_path(),
            "index.md"
        );
        assert_eq!(site.page_by_path("guide/broken.md").unwrap().next(), None);
    }

    #[test]
    fn test_render_all_permissive() {
        let dir = fixture();
        let mut site = Site::load(&config(dir.path())).unwrap();

        let outcomes = site.render_all(&PulldownEngine::new()).unwrap();

        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes[1].page, "guide/broken.md");
        assert_eq!(outcomes[1].broken_links[0].target, "guide/missing.md");
        assert!(outcomes[0].broken_links.is_empty());

        let index = site.page_by_path("index.md").unwrap().html().unwrap();
        assert!(index.contains(r#"<a href="guide/install/">install</a>"#), "{index}");
        let install = site.page_by_path("guide/install.md").unwrap().html().unwrap();
        assert!(install.contains(r#"<a href="../../">Back</a>"#), "{install}");
    }

    #[test]
    fn test_render_all_strict() {
        let dir = fixture();
        let mut config = config(dir.path());
        config.site.strict = true;
        let mut site = Site::load(&config).unwrap();

        let err = site.render_all(&PulldownEngine::new()).unwrap_err();

        assert!(err.to_string().contains("guide/missing.md"), "{err}");
    }
}
