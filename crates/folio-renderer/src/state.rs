//! State structs tracking context during event processing.

use std::collections::HashMap;

use pulldown_cmark::Alignment;

/// Code block being collected.
#[derive(Default)]
pub(crate) struct CodeBlockState {
    active: bool,
    language: Option<String>,
    buffer: String,
}

impl CodeBlockState {
    /// Begin collecting; `lang` is the fence info string.
    pub(crate) fn start(&mut self, language: Option<String>) {
        self.active = true;
        self.language = language;
        self.buffer.clear();
    }

    /// Stop collecting and take `(lang, content)`.
    pub(crate) fn end(&mut self) -> (Option<String>, String) {
        self.active = false;
        (self.language.take(), std::mem::take(&mut self.buffer))
    }

    pub(crate) fn is_active(&self) -> bool {
        self.active
    }

    pub(crate) fn push_str(&mut self, text: &str) {
        self.buffer.push_str(text);
    }
}

/// Table being rendered: alignments and header/body position.
#[derive(Default)]
pub(crate) struct TableState {
    in_head: bool,
    alignments: Vec<Alignment>,
    cell_index: usize,
}

impl TableState {
    pub(crate) fn start(&mut self, alignments: Vec<Alignment>) {
        self.alignments = alignments;
        self.in_head = false;
        self.cell_index = 0;
    }

    pub(crate) fn start_head(&mut self) {
        self.in_head = true;
        self.cell_index = 0;
    }

    pub(crate) fn end_head(&mut self) {
        self.in_head = false;
    }

    pub(crate) fn start_row(&mut self) {
        self.cell_index = 0;
    }

    pub(crate) fn next_cell(&mut self) {
        self.cell_index += 1;
    }

    pub(crate) fn is_in_head(&self) -> bool {
        self.in_head
    }

    /// Style attribute for the current cell's column alignment.
    pub(crate) fn current_alignment_style(&self) -> &'static str {
        match self.alignments.get(self.cell_index) {
            Some(Alignment::Left) => r#" style="text-align:left""#,
            Some(Alignment::Center) => r#" style="text-align:center""#,
            Some(Alignment::Right) => r#" style="text-align:right""#,
            Some(Alignment::None) | None => "",
        }
    }
}

/// Pending image waiting for its alt text.
#[derive(Default)]
pub(crate) struct ImageState {
    /// Rewritten source and title of the open image.
    pending: Option<(String, String)>,
    alt_text: String,
}

impl ImageState {
    pub(crate) fn start(&mut self, src: String, title: String) {
        self.pending = Some((src, title));
        self.alt_text.clear();
    }

    /// Close the image and return (src, title, alt).
    pub(crate) fn end(&mut self) -> Option<(String, String, String)> {
        let (src, title) = self.pending.take()?;
        Some((src, title, std::mem::take(&mut self.alt_text)))
    }

    pub(crate) fn is_active(&self) -> bool {
        self.pending.is_some()
    }

    pub(crate) fn push_str(&mut self, text: &str) {
        self.alt_text.push_str(text);
    }
}

/// Flat table of contents entry, one per heading in document order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TocEntry {
    /// Heading level (1-6).
    pub level: u8,
    /// Heading text.
    pub title: String,
    /// Fragment id without the `#`.
    pub id: String,
}

/// Heading closed by [`HeadingState::complete_heading`].
pub(crate) struct CompletedHeading {
    pub(crate) level: u8,
    pub(crate) id: String,
    pub(crate) html: String,
}

/// State for tracking headings, anchor ids and the page title.
#[derive(Default)]
pub(crate) struct HeadingState {
    /// Text of the first H1.
    title: Option<String>,
    /// Level of the open heading.
    current_level: Option<u8>,
    /// Explicit `{#id}` of the open heading.
    custom_id: Option<String>,
    /// Plain text of the open heading (table of contents and slug).
    text: String,
    /// HTML of the open heading (with inline formatting).
    html: String,
    toc: Vec<TocEntry>,
    id_counts: HashMap<String, usize>,
}

impl HeadingState {
    pub(crate) fn is_active(&self) -> bool {
        self.current_level.is_some()
    }

    pub(crate) fn start_heading(&mut self, level: u8, custom_id: Option<String>) {
        self.current_level = Some(level);
        self.custom_id = custom_id;
        self.text.clear();
        self.html.clear();
    }

    /// Close the open heading and record its table of contents entry.
    pub(crate) fn complete_heading(&mut self) -> Option<CompletedHeading> {
        let level = self.current_level.take()?;
        let text = std::mem::take(&mut self.text);
        let html = std::mem::take(&mut self.html);
        let title = text.trim().to_owned();

        let base_id = self.custom_id.take().unwrap_or_else(|| slugify(&title));
        let id = self.unique_id(base_id);

        if level == 1 && self.title.is_none() {
            self.title = Some(title.clone());
        }

        self.toc.push(TocEntry {
            level,
            title,
            id: id.clone(),
        });

        Some(CompletedHeading { level, id, html })
    }

    /// Suffix repeated ids with `-1`, `-2`, ...
    fn unique_id(&mut self, base_id: String) -> String {
        let base_id = if base_id.is_empty() {
            "section".to_owned()
        } else {
            base_id
        };
        let count = self.id_counts.entry(base_id.clone()).or_default();
        let id = match *count {
            0 => base_id,
            n => format!("{base_id}-{n}"),
        };
        *count += 1;
        id
    }

    pub(crate) fn push_text(&mut self, text: &str) {
        self.text.push_str(text);
    }

    pub(crate) fn push_html(&mut self, html: &str) {
        self.html.push_str(html);
    }

    pub(crate) fn take_title(&mut self) -> Option<String> {
        self.title.take()
    }

    pub(crate) fn take_toc(&mut self) -> Vec<TocEntry> {
        std::mem::take(&mut self.toc)
    }
}

/// Heading id: lowercase alphanumerics, with runs of whitespace, `-` and `_`
/// collapsed to one dash.
#[must_use]
pub fn slugify(text: &str) -> String {
    let mut result = String::new();
    let mut last_was_dash = true;

    for c in text.trim().chars() {
        if c.is_alphanumeric() {
            result.extend(c.to_lowercase());
            last_was_dash = false;
        } else if !last_was_dash && (c.is_whitespace() || c == '-' || c == '_') {
            result.push('-');
            last_was_dash = true;
        }
    }

    if result.ends_with('-') {
        result.pop();
    }

    result
}

/// Escape `&`, `<`, `>` and both quote characters.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}
