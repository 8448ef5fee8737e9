//! Link rewriting against the file catalog.

use folio_files::urls::{normalize_path, output_url, relative_url};
use folio_files::{FileCatalog, FileRecord};
use folio_renderer::{LinkKind, LinkOutcome, LinkRewriter};

use crate::url::UrlParts;

/// Rewrites links between source files into links between output pages.
///
/// A link is resolved against the directory of the page being rendered.
/// Links with a scheme or authority, and fragment- or query-only links, are
/// left alone. Targets missing from the catalog are reported as broken.
pub struct CatalogLinkRewriter<'a> {
    file: &'a FileRecord,
    catalog: &'a FileCatalog,
    use_directory_urls: bool,
}

impl<'a> CatalogLinkRewriter<'a> {
    #[must_use]
    pub fn new(file: &'a FileRecord, catalog: &'a FileCatalog, use_directory_urls: bool) -> Self {
        Self {
            file,
            catalog,
            use_directory_urls,
        }
    }

    /// Input path `path` refers to, relative to the source root.
    fn target_path(&self, path: &str) -> String {
        let dir = self.file.dir();
        let joined = if path.starts_with('/') || dir.is_empty() {
            path.to_owned()
        } else {
            format!("{dir}/{path}")
        };
        normalize_path(&joined).trim_start_matches('/').to_owned()
    }
}

impl LinkRewriter for CatalogLinkRewriter<'_> {
    fn rewrite(&self, url: &str, _kind: LinkKind) -> LinkOutcome {
        let mut parts = UrlParts::parse(url);
        if parts.is_external() || parts.path.is_empty() {
            return LinkOutcome::Unchanged;
        }

        let target = self.target_path(&parts.path);
        let Some(target_file) = self.catalog.get(&target) else {
            return LinkOutcome::Broken { target };
        };

        // Link to the target's URL so directory mode yields `about/`, not `about/index.html`
        let target_url = output_url(target_file.output_path(), self.use_directory_urls);
        parts.path = relative_url(
            target_url.trim_start_matches('/'),
            self.file.input_path(),
            self.use_directory_urls,
        );
        LinkOutcome::Rewritten(parts.compose())
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use pretty_assertions::assert_eq;

    use super::*;

    fn catalog() -> FileCatalog {
        FileCatalog::new(
            [
                "index.md",
                "about.md",
                "guide/index.md",
                "guide/install.md",
                "img/logo.png",
            ]
            .iter()
            .map(|p| FileRecord::new(Path::new("/docs"), p))
            .collect(),
        )
    }

    fn rewrite(from: &str, url: &str, use_directory_urls: bool) -> LinkOutcome {
        let catalog = catalog();
        let file = FileRecord::new(Path::new("/docs"), from);
        CatalogLinkRewriter::new(&file, &catalog, use_directory_urls).rewrite(url, LinkKind::Link)
    }

    fn rewritten(url: &str) -> LinkOutcome {
        LinkOutcome::Rewritten(url.to_owned())
    }

    #[test]
    fn test_external_links_unchanged() {
        for url in [
            "https://example.com/about.md",
            "mailto:someone@example.com",
            "//cdn.example.com/x.js",
            "#section",
            "?page=2",
        ] {
            assert_eq!(rewrite("index.md", url, true), LinkOutcome::Unchanged, "{url}");
        }
    }

    #[test]
    fn test_directory_urls() {
        assert_eq!(rewrite("index.md", "about.md", true), rewritten("about/"));
        assert_eq!(rewrite("about.md", "index.md", true), rewritten("../"));
        assert_eq!(
            rewrite("about.md", "guide/install.md", true),
            rewritten("../guide/install/")
        );
        assert_eq!(
            rewrite("guide/install.md", "../img/logo.png", true),
            rewritten("../../img/logo.png")
        );
        assert_eq!(rewrite("guide/install.md", "index.md", true), rewritten("../"));
    }

    #[test]
    fn test_file_urls() {
        // The page file itself counts as a path level
        assert_eq!(rewrite("index.md", "about.md", false), rewritten("../about/index.html"));
        assert_eq!(rewrite("about.md", "index.md", false), rewritten("../../index.html"));
        assert_eq!(
            rewrite("guide/install.md", "../img/logo.png", false),
            rewritten("../../../img/logo.png")
        );
    }

    #[test]
    fn test_query_and_fragment_preserved() {
        assert_eq!(
            rewrite("index.md", "guide/install.md?v=2#linux", true),
            rewritten("guide/install/?v=2#linux")
        );
    }

    #[test]
    fn test_site_absolute_path() {
        assert_eq!(rewrite("guide/install.md", "/about.md", true), rewritten("../../about/"));
    }

    #[test]
    fn test_self_link() {
        assert_eq!(rewrite("about.md", "about.md#top", true), rewritten("./#top"));
    }

    #[test]
    fn test_backslash_path() {
        assert_eq!(
            rewrite("index.md", "guide\\install.md", true),
            rewritten("guide/install/")
        );
    }

    #[test]
    fn test_missing_target() {
        assert_eq!(
            rewrite("guide/install.md", "../missing.md", true),
            LinkOutcome::Broken {
                target: "missing.md".to_owned()
            }
        );
        assert_eq!(
            rewrite("index.md", "../../outside.md", true),
            LinkOutcome::Broken {
                target: "../../outside.md".to_owned()
            }
        );
    }
}
