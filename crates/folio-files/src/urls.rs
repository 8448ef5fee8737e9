//! Path and URL arithmetic.
//!
//! All functions are pure and accept either `/` or `\` as the path separator.
//! Results always use `/`.
//!
//! Two layouts are supported:
//! - directory URLs (`use_directory_urls = true`): `guide/index.html` is
//!   addressed as `/guide/`
//! - file URLs: the same page is addressed as `/guide/index.html`

use std::borrow::Cow;

/// File stems treated as the index document of their directory.
pub const INDEX_NAMES: [&str; 2] = ["index", "readme"];

/// File name every documentation page is written to.
pub const INDEX_FILE: &str = "index.html";

/// Check whether a file stem is a reserved index name (case-insensitive).
#[must_use]
pub fn is_index_stem(stem: &str) -> bool {
    INDEX_NAMES.iter().any(|name| stem.eq_ignore_ascii_case(name))
}

/// Replace platform separators with `/`.
pub(crate) fn to_slashes(path: &str) -> Cow<'_, str> {
    if path.contains('\\') {
        Cow::Owned(path.replace('\\', "/"))
    } else {
        Cow::Borrowed(path)
    }
}

/// Split a `/`-separated path into its directory and file name.
///
/// The directory has no trailing slash and is empty for top-level files.
pub(crate) fn split_dir(path: &str) -> (&str, &str) {
    match path.rsplit_once('/') {
        Some((dir, name)) => (dir, name),
        None => ("", path),
    }
}

/// Split a file name into stem and extension (including the dot).
///
/// A leading dot does not start an extension: `.md` has stem `.md` and no
/// extension.
pub(crate) fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(pos) if pos > 0 => (&name[..pos], &name[pos..]),
        _ => (name, ""),
    }
}

fn join(dir: &str, name: &str) -> String {
    if dir.is_empty() {
        name.to_owned()
    } else {
        format!("{dir}/{name}")
    }
}

/// Compute the output path for a source file.
///
/// Markdown files become `index.html` documents: index and readme files
/// take over their directory, every other page gets a directory of its own.
/// Other files keep their input path.
///
/// # Examples
///
/// ```
/// use folio_files::urls::output_path;
///
/// assert_eq!(output_path("index.md"), "index.html");
/// assert_eq!(output_path("README.md"), "index.html");
/// assert_eq!(output_path("foo/bar.md"), "foo/bar/index.html");
/// assert_eq!(output_path("foo/bar.jpg"), "foo/bar.jpg");
/// ```
#[must_use]
pub fn output_path(input_path: &str) -> String {
    let path = to_slashes(input_path);
    let (dir, name) = split_dir(&path);
    let (stem, extension) = split_extension(name);

    if !extension.eq_ignore_ascii_case(".md") {
        return path.into_owned();
    }

    if is_index_stem(stem) {
        join(dir, INDEX_FILE)
    } else {
        join(&join(dir, stem), INDEX_FILE)
    }
}

/// Convert an output path into a site-absolute URL.
///
/// With directory URLs a trailing `index.html` is dropped so the URL
/// addresses the directory.
///
/// # Examples
///
/// ```
/// use folio_files::urls::output_url;
///
/// assert_eq!(output_url("foo/index.html", true), "/foo/");
/// assert_eq!(output_url("foo/index.html", false), "/foo/index.html");
/// assert_eq!(output_url("foo\\bar.jpg", true), "/foo/bar.jpg");
/// ```
#[must_use]
pub fn output_url(output_path: &str, use_directory_urls: bool) -> String {
    let path = to_slashes(output_path);
    let path = path.trim_start_matches('/');

    let url = if use_directory_urls && (path == INDEX_FILE || path.ends_with("/index.html")) {
        &path[..path.len() - INDEX_FILE.len()]
    } else {
        path
    };

    format!("/{url}")
}

/// Compute a relative URL from the page built from `from_input_path` to
/// `to_path`.
///
/// `to_path` is a site-root relative location (an output path or an output
/// URL without its leading slash). A trailing slash on `to_path` is kept.
///
/// The page's own URL is taken as its base directory, so with file URLs a
/// link from `foo.md` (served as `/foo/index.html`) climbs one level more than
/// with directory URLs (served as `/foo/`). `..` segments in `to_path` that
/// would climb above the site root are dropped.
///
/// Never returns an empty string: a link to the page's own location is `./`.
///
/// # Examples
///
/// ```
/// use folio_files::urls::relative_url;
///
/// assert_eq!(relative_url("img.jpg", "foo/bar/index.md", true), "../../img.jpg");
/// assert_eq!(relative_url("img.jpg", "foo/bar/index.md", false), "../../../img.jpg");
/// assert_eq!(relative_url("foo/img.jpg", "foo/index.md", true), "img.jpg");
/// ```
#[must_use]
pub fn relative_url(to_path: &str, from_input_path: &str, use_directory_urls: bool) -> String {
    let from_url = output_url(&output_path(from_input_path), use_directory_urls);
    let from_segs: Vec<&str> = from_url.split('/').filter(|s| !s.is_empty()).collect();

    let to = to_slashes(to_path);
    let trailing_slash = to.ends_with('/');
    let to_segs = clamp_to_root(&normalize_segments(&to));

    let common = from_segs
        .iter()
        .zip(&to_segs)
        .take_while(|(a, b)| a == b)
        .count();

    let ups = from_segs.len() - common;
    let remaining = &to_segs[common..];

    let mut result = "../".repeat(ups);
    result.push_str(&remaining.join("/"));
    if trailing_slash && !remaining.is_empty() {
        result.push('/');
    }

    if result.is_empty() {
        "./".to_owned()
    } else {
        result
    }
}

/// Normalize a path: collapse `.` and `..` segments and duplicate separators.
///
/// Leading `..` segments that cannot be collapsed are kept, so a path that
/// escapes its root stays recognizable. A leading `/` is preserved.
///
/// # Examples
///
/// ```
/// use folio_files::urls::normalize_path;
///
/// assert_eq!(normalize_path("foo/./bar/../baz.md"), "foo/baz.md");
/// assert_eq!(normalize_path("foo\\..\\..\\x.md"), "../x.md");
/// assert_eq!(normalize_path("/a//b.md"), "/a/b.md");
/// ```
#[must_use]
pub fn normalize_path(path: &str) -> String {
    let path = to_slashes(path);
    let normalized = normalize_segments(&path).join("/");
    if path.starts_with('/') {
        format!("/{normalized}")
    } else {
        normalized
    }
}

fn normalize_segments(path: &str) -> Vec<&str> {
    let absolute = path.starts_with('/');
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&last) if last != ".." => {
                    segments.pop();
                }
                _ if absolute => {}
                _ => segments.push(".."),
            },
            _ => segments.push(segment),
        }
    }

    segments
}

fn clamp_to_root<'a>(segments: &[&'a str]) -> Vec<&'a str> {
    segments.iter().copied().skip_while(|s| *s == "..").collect()
}
