//! URL splitting and RFC 3986 reference resolution.

use std::fmt::Write as _;
use std::sync::LazyLock;

use regex::Regex;

/// RFC 3986 appendix B, restricted to valid scheme names.
static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?s)\A(?:(?P<scheme>[A-Za-z][A-Za-z0-9+.\-]*):)?(?://(?P<authority>[^/?#]*))?(?P<path>[^?#]*)(?:\?(?P<query>[^#]*))?(?:#(?P<fragment>.*))?\z",
    )
    .unwrap()
});

/// Components of a URL reference.
///
/// Empty query and fragment components are treated as absent.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct UrlParts {
    pub scheme: Option<String>,
    pub authority: Option<String>,
    pub path: String,
    pub query: Option<String>,
    pub fragment: Option<String>,
}

impl UrlParts {
    pub(crate) fn parse(url: &str) -> Self {
        let Some(caps) = URL_RE.captures(url) else {
            return Self {
                path: url.to_owned(),
                ..Self::default()
            };
        };
        let part = |name: &str| {
            caps.name(name)
                .map(|m| m.as_str().to_owned())
                .filter(|s| !s.is_empty())
        };

        Self {
            scheme: part("scheme"),
            authority: caps.name("authority").map(|m| m.as_str().to_owned()),
            path: part("path").unwrap_or_default(),
            query: part("query"),
            fragment: part("fragment"),
        }
    }

    /// Whether the reference points outside the current site.
    pub(crate) fn is_external(&self) -> bool {
        self.scheme.is_some() || self.authority.as_deref().is_some_and(|a| !a.is_empty())
    }

    pub(crate) fn compose(&self) -> String {
        let mut out = String::new();
        if let Some(scheme) = &self.scheme {
            let _ = write!(out, "{scheme}:");
        }
        if let Some(authority) = &self.authority {
            let _ = write!(out, "//{authority}");
            if self.path.is_empty() {
                out.push('/');
            }
        }
        out.push_str(&self.path);
        if let Some(query) = &self.query {
            let _ = write!(out, "?{query}");
        }
        if let Some(fragment) = &self.fragment {
            let _ = write!(out, "#{fragment}");
        }
        out
    }
}

/// Resolve `reference` against `base` (RFC 3986 section 5.2).
pub(crate) fn join(base: &str, reference: &str) -> String {
    let base = UrlParts::parse(base);
    let reference = UrlParts::parse(reference);

    let target = if reference.scheme.is_some() {
        UrlParts {
            path: remove_dot_segments(&reference.path),
            ..reference
        }
    } else if reference.authority.is_some() {
        UrlParts {
            scheme: base.scheme,
            path: remove_dot_segments(&reference.path),
            ..reference
        }
    } else if reference.path.is_empty() {
        UrlParts {
            query: reference.query.or(base.query),
            fragment: reference.fragment,
            ..base
        }
    } else {
        let path = if reference.path.starts_with('/') {
            remove_dot_segments(&reference.path)
        } else {
            remove_dot_segments(&merge(&base, &reference.path))
        };
        UrlParts {
            path,
            query: reference.query,
            fragment: reference.fragment,
            ..base
        }
    };

    target.compose()
}

fn merge(base: &UrlParts, path: &str) -> String {
    if base.authority.is_some() && base.path.is_empty() {
        return format!("/{path}");
    }
    match base.path.rfind('/') {
        Some(pos) => format!("{}{path}", &base.path[..=pos]),
        None => path.to_owned(),
    }
}

fn remove_dot_segments(path: &str) -> String {
    let absolute = path.starts_with('/');
    let trailing = path.ends_with('/') || path.ends_with("/.") || path.ends_with("/..");
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            _ => segments.push(segment),
        }
    }

    let mut out = String::new();
    if absolute {
        out.push('/');
    }
    out.push_str(&segments.join("/"));
    if trailing && !segments.is_empty() {
        out.push('/');
    }
    out
}
