//! Front matter parsing.
//!
//! Two metadata styles are recognized at the very top of a document:
//!
//! - a YAML block fenced by `---` and closed by `---` or `...`
//! - MultiMarkdown `key: value` lines, with indented continuation lines,
//!   ending at the first blank line
//!
//! Malformed metadata never fails a build: the document is returned
//! untouched with empty metadata.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

/// Parsed metadata, keyed by field name.
pub type FrontMatter = serde_json::Map<String, Value>;

static YAML_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\A-{3}[ \t]*\n(.*?\n)(?:\.{3}|-{3})[ \t]*\n").unwrap()
});

static META_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[ ]{0,3}(?P<key>[A-Za-z0-9_-]+):\s*(?P<value>.*)").unwrap()
});

static META_MORE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[ ]{4}|\t)\s*(?P<value>.*)").unwrap());

/// Split a document into its Markdown body and front matter.
///
/// Line endings are normalized to `\n`.
///
/// # Examples
///
/// ```
/// use folio_site::parse_front_matter;
///
/// let (body, meta) = parse_front_matter("---\ntitle: Guide\n---\n\n# Body\n");
/// assert_eq!(body, "# Body\n");
/// assert_eq!(meta["title"], "Guide");
/// ```
#[must_use]
pub fn parse_front_matter(source: &str) -> (String, FrontMatter) {
    let source = source.replace("\r\n", "\n");

    if let Some(caps) = YAML_RE.captures(&source) {
        return match serde_yaml::from_str::<Value>(&caps[1]) {
            Ok(Value::Object(data)) => {
                let body = source[caps[0].len()..].trim_start_matches('\n');
                (body.to_owned(), data)
            }
            Ok(_) => (source, FrontMatter::new()),
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring malformed YAML front matter");
                (source, FrontMatter::new())
            }
        };
    }

    parse_multimarkdown(&source)
}

fn parse_multimarkdown(source: &str) -> (String, FrontMatter) {
    let mut values: Vec<(String, Vec<String>)> = Vec::new();
    let mut lines = source.split('\n').peekable();

    while let Some(&line) = lines.peek() {
        if line.trim().is_empty() {
            lines.next();
            break;
        }
        if let Some(caps) = META_RE.captures(line) {
            let key = caps["key"].trim().to_lowercase();
            let value = caps["value"].trim().to_owned();
            match values.iter_mut().find(|(k, _)| *k == key) {
                Some((_, existing)) => existing.push(value),
                None => values.push((key, vec![value])),
            }
        } else if let (Some(caps), Some((_, existing))) =
            (META_MORE_RE.captures(line), values.last_mut())
        {
            existing.push(caps["value"].trim().to_owned());
        } else {
            break;
        }
        lines.next();
    }

    let body = lines.collect::<Vec<_>>().join("\n");
    let data = values
        .into_iter()
        .map(|(key, parts)| (key, Value::String(parts.join(" "))))
        .collect();

    (body.trim_start_matches('\n').to_owned(), data)
}
