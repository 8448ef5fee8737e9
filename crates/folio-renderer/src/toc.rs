//! Nested table of contents.

use crate::state::TocEntry;

/// Table of contents node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TocItem {
    /// Heading text.
    pub text: String,
    /// Anchor id of the heading, without `#`.
    pub anchor_id: String,
    /// Heading level (1-6).
    pub level: u8,
    /// Headings nested below this one.
    pub children: Vec<TocItem>,
}

impl TocItem {
    /// Fragment URL of the heading.
    #[must_use]
    pub fn url(&self) -> String {
        format!("#{}", self.anchor_id)
    }
}

/// Nest a flat heading list into a tree.
///
/// A heading becomes a child of the closest preceding heading with a lower
/// level. Skipped levels (`#` followed by `###`) nest directly.
///
/// # Examples
///
/// ```
/// use folio_renderer::{TocEntry, build_toc_tree};
///
/// let entry = |level, title: &str| TocEntry {
///     level,
///     title: title.to_owned(),
///     id: title.to_lowercase(),
/// };
/// let tree = build_toc_tree(&[entry(1, "Intro"), entry(2, "Setup"), entry(1, "Usage")]);
///
/// assert_eq!(tree.len(), 2);
/// assert_eq!(tree[0].children[0].text, "Setup");
/// ```
#[must_use]
pub fn build_toc_tree(entries: &[TocEntry]) -> Vec<TocItem> {
    let mut roots: Vec<TocItem> = Vec::new();
    // Open items from the outermost to the innermost
    let mut stack: Vec<TocItem> = Vec::new();

    for entry in entries {
        while stack.last().is_some_and(|open| open.level >= entry.level) {
            close_item(&mut stack, &mut roots);
        }
        stack.push(TocItem {
            text: entry.title.clone(),
            anchor_id: entry.id.clone(),
            level: entry.level,
            children: Vec::new(),
        });
    }

    while !stack.is_empty() {
        close_item(&mut stack, &mut roots);
    }

    roots
}

/// Pop the innermost open item into its parent (or the roots).
fn close_item(stack: &mut Vec<TocItem>, roots: &mut Vec<TocItem>) {
    if let Some(item) = stack.pop() {
        match stack.last_mut() {
            Some(parent) => parent.children.push(item),
            None => roots.push(item),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn entry(level: u8, title: &str) -> TocEntry {
        TocEntry {
            level,
            title: title.to_owned(),
            id: title.to_lowercase().replace(' ', "-"),
        }
    }

    fn leaf(level: u8, text: &str) -> TocItem {
        TocItem {
            text: text.to_owned(),
            anchor_id: text.to_lowercase().replace(' ', "-"),
            level,
            children: Vec::new(),
        }
    }

    #[test]
    fn test_empty() {
        assert!(build_toc_tree(&[]).is_empty());
    }

    #[test]
    fn test_nested_headings() {
        let tree = build_toc_tree(&[
            entry(1, "Welcome to Folio"),
            entry(2, "Commands"),
            entry(2, "Project layout"),
            entry(3, "Docs dir"),
        ]);

        assert_eq!(
            tree,
            [TocItem {
                children: vec![
                    leaf(2, "Commands"),
                    TocItem {
                        children: vec![leaf(3, "Docs dir")],
                        ..leaf(2, "Project layout")
                    },
                ],
                ..leaf(1, "Welcome to Folio")
            }]
        );
    }

    #[test]
    fn test_multiple_roots() {
        let tree = build_toc_tree(&[entry(2, "A"), entry(3, "B"), entry(2, "C")]);
        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].children, [leaf(3, "B")]);
        assert_eq!(tree[1], leaf(2, "C"));
    }

    #[test]
    fn test_skipped_level_nests_directly() {
        let tree = build_toc_tree(&[entry(1, "Top"), entry(4, "Deep"), entry(2, "Mid")]);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].children, [leaf(4, "Deep"), leaf(2, "Mid")]);
    }

    #[test]
    fn test_lower_level_after_deeper_heading_is_root() {
        let tree = build_toc_tree(&[entry(3, "Deep"), entry(2, "Higher")]);
        assert_eq!(tree, [leaf(3, "Deep"), leaf(2, "Higher")]);
    }

    #[test]
    fn test_item_url() {
        assert_eq!(leaf(2, "Commands").url(), "#commands");
    }
}
