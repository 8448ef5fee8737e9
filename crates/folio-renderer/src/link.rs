//! Link rewriting hook.
//!
//! The renderer hands every link `href` and image `src` to a [`LinkRewriter`]
//! before writing it out. The rewriter decides whether the URL stays as
//! written, is replaced, or points at something that does not exist.
//!
//! Raw HTML `<a href>` and `<img src>` tags embedded in the Markdown source go
//! through the same hook.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::state::escape_html;

static ANCHOR_HREF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(<a\b[^>]*?\shref\s*=\s*)(?:"([^"]*)"|'([^']*)')"#).unwrap()
});

static IMAGE_SRC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(<img\b[^>]*?\ssrc\s*=\s*)(?:"([^"]*)"|'([^']*)')"#).unwrap()
});

/// Kind of reference a URL was found in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkKind {
    /// `href` of an anchor.
    Link,
    /// `src` of an image.
    Image,
}

impl LinkKind {
    /// Attribute the URL is stored in.
    #[must_use]
    pub fn attribute(self) -> &'static str {
        match self {
            Self::Link => "href",
            Self::Image => "src",
        }
    }
}

/// Decision of a [`LinkRewriter`] for one URL.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LinkOutcome {
    /// Keep the URL as written.
    Unchanged,
    /// Replace the URL.
    Rewritten(String),
    /// The URL points at a missing document; it is kept as written.
    Broken {
        /// Resolved target that could not be found.
        target: String,
    },
}

/// Capability to rewrite URLs while a document is rendered.
pub trait LinkRewriter {
    /// Decide what to do with `url`.
    fn rewrite(&self, url: &str, kind: LinkKind) -> LinkOutcome;
}

/// Link whose target could not be resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BrokenLink {
    /// URL as written in the document.
    pub url: String,
    /// Resolved target path.
    pub target: String,
    pub kind: LinkKind,
}

/// Run `url` through an optional rewriter, recording broken links.
pub(crate) fn apply_rewriter(
    rewriter: Option<&dyn LinkRewriter>,
    url: &str,
    kind: LinkKind,
    broken: &mut Vec<BrokenLink>,
) -> Option<String> {
    match rewriter?.rewrite(url, kind) {
        LinkOutcome::Unchanged => None,
        LinkOutcome::Rewritten(new_url) => Some(new_url),
        LinkOutcome::Broken { target } => {
            broken.push(BrokenLink {
                url: url.to_owned(),
                target,
                kind,
            });
            None
        }
    }
}

/// Rewrite `href`/`src` attributes of anchors and images inside raw HTML.
pub(crate) fn rewrite_raw_html<'h>(
    html: &'h str,
    rewriter: Option<&dyn LinkRewriter>,
    broken: &mut Vec<BrokenLink>,
) -> Cow<'h, str> {
    if rewriter.is_none() {
        return Cow::Borrowed(html);
    }

    let mut rewrite_all = |html: Cow<'h, str>, re: &Regex, kind: LinkKind| -> Cow<'h, str> {
        if !re.is_match(&html) {
            return html;
        }
        let replaced = re.replace_all(&html, |caps: &Captures<'_>| {
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .map_or("", |m| m.as_str());
            let url = value.replace("&amp;", "&");
            match apply_rewriter(rewriter, &url, kind, broken) {
                Some(new_url) => format!(r#"{}"{}""#, &caps[1], escape_html(&new_url)),
                None => caps[0].to_owned(),
            }
        });
        Cow::Owned(replaced.into_owned())
    };

    let html = rewrite_all(Cow::Borrowed(html), &ANCHOR_HREF_RE, LinkKind::Link);
    rewrite_all(html, &IMAGE_SRC_RE, LinkKind::Image)
}
