//! Navigation tree.
//!
//! Pages and sections are referenced by index: [`PageId`] points into the
//! site's page list, [`SectionId`] into [`Navigation::sections`]. Pages keep
//! only these ids as their `parent`, `previous` and `next` links.

use std::collections::{HashMap, HashSet};

use folio_config::NavEntry;
use folio_files::urls::normalize_path;

use crate::page::{Page, filename_title};

/// Index of a page in the site's page list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageId(pub(crate) usize);

impl PageId {
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Index of a section in [`Navigation::sections`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SectionId(pub(crate) usize);

impl SectionId {
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Entry of the navigation tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavItem {
    Page(PageId),
    Section(SectionId),
}

/// Titled group of navigation items.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Section {
    pub title: String,
    pub parent: Option<SectionId>,
    pub children: Vec<NavItem>,
}

/// Navigation tree over a site's pages.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Navigation {
    items: Vec<NavItem>,
    sections: Vec<Section>,
    /// Pages in reading order with their enclosing section.
    order: Vec<(PageId, Option<SectionId>)>,
}

impl Navigation {
    /// Build navigation from `[[nav]]` entries, or from page order when there
    /// are none.
    #[must_use]
    pub fn build(entries: &[NavEntry], pages: &[Page]) -> Self {
        if entries.is_empty() {
            Self::from_pages(pages)
        } else {
            Self::from_entries(entries, pages)
        }
    }

    /// Build navigation from explicit entries.
    ///
    /// Entries pointing at unknown pages are skipped with a warning, as are
    /// repeated entries for the same page.
    #[must_use]
    pub fn from_entries(entries: &[NavEntry], pages: &[Page]) -> Self {
        let index: HashMap<&str, PageId> = pages
            .iter()
            .enumerate()
            .map(|(i, page)| (page.file().input_path(), PageId(i)))
            .collect();

        let mut nav = Self::default();
        let mut seen = HashSet::new();
        nav.items = nav.add_entries(entries, None, &index, &mut seen);
        nav
    }

    fn add_entries(
        &mut self,
        entries: &[NavEntry],
        parent: Option<SectionId>,
        index: &HashMap<&str, PageId>,
        seen: &mut HashSet<PageId>,
    ) -> Vec<NavItem> {
        let mut items = Vec::with_capacity(entries.len());

        for entry in entries {
            if let Some(path) = &entry.path {
                let path = normalize_path(path);
                let path = path.trim_start_matches('/');
                match index.get(path) {
                    Some(&id) if !seen.insert(id) => {
                        tracing::warn!(path = %path, "Skipping repeated navigation entry");
                    }
                    Some(&id) => {
                        self.order.push((id, parent));
                        items.push(NavItem::Page(id));
                    }
                    None => {
                        tracing::warn!(
                            path = %path,
                            "Navigation entry not found in docs directory"
                        );
                    }
                }
            } else {
                let id = SectionId(self.sections.len());
                self.sections.push(Section {
                    title: entry.title.clone().unwrap_or_default(),
                    parent,
                    children: Vec::new(),
                });
                let children = self.add_entries(&entry.children, Some(id), index, seen);
                self.sections[id.0].children = children;
                items.push(NavItem::Section(id));
            }
        }

        items
    }

    /// Build navigation mirroring the directory layout, in page order.
    ///
    /// Every directory becomes a section titled after its name.
    #[must_use]
    pub fn from_pages(pages: &[Page]) -> Self {
        let mut nav = Self::default();
        let mut dirs: HashMap<String, SectionId> = HashMap::new();

        for (i, page) in pages.iter().enumerate() {
            let id = PageId(i);
            let parent = nav.dir_section(page.file().dir(), &mut dirs);
            nav.push_item(parent, NavItem::Page(id));
            nav.order.push((id, parent));
        }

        nav
    }

    /// Section for `dir`, creating it and its ancestors on first use.
    fn dir_section(
        &mut self,
        dir: &str,
        dirs: &mut HashMap<String, SectionId>,
    ) -> Option<SectionId> {
        if dir.is_empty() {
            return None;
        }
        if let Some(&id) = dirs.get(dir) {
            return Some(id);
        }

        let (parent_dir, name) = dir.rsplit_once('/').unwrap_or(("", dir));
        let parent = self.dir_section(parent_dir, dirs);
        let id = SectionId(self.sections.len());
        self.sections.push(Section {
            title: filename_title(name),
            parent,
            children: Vec::new(),
        });
        self.push_item(parent, NavItem::Section(id));
        dirs.insert(dir.to_owned(), id);
        Some(id)
    }

    fn push_item(&mut self, parent: Option<SectionId>, item: NavItem) {
        match parent.and_then(|id| self.sections.get_mut(id.0)) {
            Some(section) => section.children.push(item),
            None => self.items.push(item),
        }
    }

    /// Set `parent`, `previous` and `next` on every page.
    ///
    /// Pages outside the navigation get no links.
    pub fn apply(&self, pages: &mut [Page]) {
        for page in pages.iter_mut() {
            page.parent = None;
            page.previous = None;
            page.next = None;
        }

        for (pos, &(id, parent)) in self.order.iter().enumerate() {
            let previous = pos.checked_sub(1).map(|p| self.order[p].0);
            let next = self.order.get(pos + 1).map(|&(next, _)| next);
            if let Some(page) = pages.get_mut(id.0) {
                page.parent = parent;
                page.previous = previous;
                page.next = next;
            }
        }
    }

    /// Top-level items.
    #[must_use]
    pub fn items(&self) -> &[NavItem] {
        &self.items
    }

    #[must_use]
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    #[must_use]
    pub fn section(&self, id: SectionId) -> Option<&Section> {
        self.sections.get(id.0)
    }

    /// Pages in reading order.
    pub fn pages(&self) -> impl Iterator<Item = PageId> + '_ {
        self.order.iter().map(|&(id, _)| id)
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::Arc;

    use folio_files::FileRecord;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::page::PageConfig;

    fn pages(paths: &[&str]) -> Vec<Page> {
        paths
            .iter()
            .map(|p| {
                let file = Arc::new(FileRecord::new(Path::new("/docs"), p));
                Page::from_source(None, file, &PageConfig::default(), "")
            })
            .collect()
    }

    fn page_entry(path: &str) -> NavEntry {
        NavEntry {
            title: None,
            path: Some(path.to_owned()),
            children: Vec::new(),
        }
    }

    fn section_entry(title: &str, children: Vec<NavEntry>) -> NavEntry {
        NavEntry {
            title: Some(title.to_owned()),
            path: None,
            children,
        }
    }

    #[test]
    fn test_from_pages_nests_directories() {
        let pages = pages(&["index.md", "about.md", "guide/index.md", "guide/cli/run.md"]);
        let nav = Navigation::build(&[], &pages);

        assert_eq!(
            nav.items(),
            [
                NavItem::Page(PageId(0)),
                NavItem::Page(PageId(1)),
                NavItem::Section(SectionId(0)),
            ]
        );
        assert_eq!(
            nav.sections(),
            [
                Section {
                    title: "Guide".to_owned(),
                    parent: None,
                    children: vec![NavItem::Page(PageId(2)), NavItem::Section(SectionId(1))],
                },
                Section {
                    title: "Cli".to_owned(),
                    parent: Some(SectionId(0)),
                    children: vec![NavItem::Page(PageId(3))],
                },
            ]
        );
        assert_eq!(nav.pages().count(), 4);
    }

    #[test]
    fn test_apply_links() {
        let mut pages = pages(&["index.md", "about.md", "guide/index.md"]);
        let nav = Navigation::build(&[], &pages);
        nav.apply(&mut pages);

        assert_eq!(pages[0].previous(), None);
        assert_eq!(pages[0].next(), Some(PageId(1)));
        assert_eq!(pages[1].previous(), Some(PageId(0)));
        assert_eq!(pages[1].next(), Some(PageId(2)));
        assert_eq!(pages[2].next(), None);
        assert_eq!(pages[2].parent(), Some(SectionId(0)));
        assert!(pages[0].is_homepage());
        assert!(!pages[2].is_homepage());
    }

    #[test]
    fn test_from_entries() {
        let pages = pages(&["index.md", "guide/install.md", "guide/usage.md", "extra.md"]);
        let entries = vec![
            page_entry("index.md"),
            section_entry(
                "Guide",
                vec![page_entry("guide/usage.md"), page_entry("./guide/install.md")],
            ),
        ];
        let mut pages = pages;
        let nav = Navigation::build(&entries, &pages);
        nav.apply(&mut pages);

        assert_eq!(
            nav.pages().collect::<Vec<_>>(),
            [PageId(0), PageId(2), PageId(1)]
        );
        assert_eq!(nav.section(SectionId(0)).unwrap().title, "Guide");
        assert_eq!(pages[2].parent(), Some(SectionId(0)));
        assert_eq!(pages[2].next(), Some(PageId(1)));
        assert_eq!(pages[1].previous(), Some(PageId(2)));

        // Not in the navigation
        assert_eq!(pages[3].previous(), None);
        assert_eq!(pages[3].next(), None);
        assert!(pages[3].is_top_level());
    }

    #[test]
    fn test_from_entries_skips_unknown_and_repeated() {
        let pages = pages(&["index.md", "about.md"]);
        let entries = vec![
            page_entry("index.md"),
            page_entry("missing.md"),
            page_entry("index.md"),
            page_entry("about.md"),
        ];
        let nav = Navigation::build(&entries, &pages);

        assert_eq!(
            nav.items(),
            [NavItem::Page(PageId(0)), NavItem::Page(PageId(1))]
        );
    }

    #[test]
    fn test_apply_resets_previous_links() {
        let mut pages = pages(&["index.md", "about.md"]);
        Navigation::build(&[], &pages).apply(&mut pages);
        Navigation::build(&[page_entry("about.md")], &pages).apply(&mut pages);

        assert_eq!(pages[0].next(), None);
        assert_eq!(pages[1].previous(), None);
    }
}
