//! HTML backend for markdown rendering.

use std::fmt::Write;

use crate::backend::RenderBackend;
use crate::state::escape_html;

/// HTML5 render backend.
pub struct HtmlBackend;

impl RenderBackend for HtmlBackend {
    fn code_block(lang: Option<&str>, content: &str, out: &mut String) {
        match lang {
            Some(lang) => {
                let _ = write!(
                    out,
                    r#"<pre><code class="language-{}">{}</code></pre>"#,
                    escape_html(lang),
                    escape_html(content)
                );
            }
            None => {
                let _ = write!(out, "<pre><code>{}</code></pre>", escape_html(content));
            }
        }
    }

    fn blockquote_start(out: &mut String) {
        out.push_str("<blockquote>");
    }

    fn blockquote_end(out: &mut String) {
        out.push_str("</blockquote>");
    }

    fn image(src: &str, alt: &str, title: &str, out: &mut String) {
        let _ = write!(out, r#"<img src="{}" alt="{}""#, escape_html(src), escape_html(alt));
        if !title.is_empty() {
            let _ = write!(out, r#" title="{}""#, escape_html(title));
        }
        out.push('>');
    }
}
