//! Leaf element output.
//!
//! [`MarkdownRenderer`](crate::MarkdownRenderer) walks the document
//! structure; a [`RenderBackend`] writes the elements whose markup a site
//! may want to change.

/// Markup for code blocks, blockquotes, images and a few inline markers.
pub trait RenderBackend {
    /// Write a fenced or indented code block. `lang` is the info string's
    /// first word, if any.
    fn code_block(lang: Option<&str>, content: &str, out: &mut String);

    fn blockquote_start(out: &mut String);

    fn blockquote_end(out: &mut String);

    /// Write an image whose `src` is already rewritten.
    fn image(src: &str, alt: &str, title: &str, out: &mut String);

    fn hard_break(out: &mut String) {
        out.push_str("<br>");
    }

    fn horizontal_rule(out: &mut String) {
        out.push_str("<hr>");
    }

    /// Disabled checkbox for `- [ ]` and `- [x]` items.
    fn task_list_marker(checked: bool, out: &mut String) {
        if checked {
            out.push_str(r#"<input type="checkbox" checked disabled> "#);
        } else {
            out.push_str(r#"<input type="checkbox" disabled> "#);
        }
    }
}
