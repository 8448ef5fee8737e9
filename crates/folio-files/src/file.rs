//! Source file identity and classification.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::urls::{self, is_index_stem, split_dir, split_extension, to_slashes};

/// Sub-classification of media files.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MediaKind {
    JavaScript,
    Css,
    Other,
}

/// Classification of a source file, decided by its lowercased extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FileKind {
    /// Markdown source rendered into an HTML page.
    Documentation,
    /// Pre-rendered HTML copied through unchanged.
    Static,
    /// Any other asset.
    Media(MediaKind),
}

impl FileKind {
    /// Classify a file by its extension (with or without the leading dot).
    #[must_use]
    pub fn from_extension(extension: &str) -> Self {
        let extension = extension.trim_start_matches('.').to_ascii_lowercase();
        match extension.as_str() {
            "md" => Self::Documentation,
            "html" | "htm" => Self::Static,
            "js" => Self::Media(MediaKind::JavaScript),
            "css" => Self::Media(MediaKind::Css),
            _ => Self::Media(MediaKind::Other),
        }
    }
}

/// One source file discovered under the source root.
///
/// The output path is derived once at construction and never recomputed.
/// Records are shared between the catalog and the pages built from them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileRecord {
    source_root: Arc<Path>,
    input_path: String,
    root: String,
    extension: String,
    kind: FileKind,
    output_path: String,
}

impl FileRecord {
    /// Create a record for `input_path`, relative to `source_root`.
    ///
    /// `\` separators in `input_path` are normalized to `/`.
    pub fn new(source_root: impl Into<Arc<Path>>, input_path: &str) -> Self {
        let input_path = to_slashes(input_path).trim_start_matches('/').to_owned();
        debug_assert!(!input_path.is_empty(), "input path must not be empty");

        let (_, name) = split_dir(&input_path);
        let (root, extension) = split_extension(name);
        let extension = extension.to_ascii_lowercase();

        Self {
            source_root: source_root.into(),
            root: root.to_owned(),
            kind: FileKind::from_extension(&extension),
            output_path: urls::output_path(&input_path),
            extension,
            input_path,
        }
    }

    /// Base directory of the source tree.
    pub fn source_root(&self) -> &Path {
        &self.source_root
    }

    /// Path relative to the source root, `/`-separated.
    pub fn input_path(&self) -> &str {
        &self.input_path
    }

    /// Path segments of the input path.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.input_path.split('/')
    }

    /// Directory part of the input path (empty for top-level files).
    pub fn dir(&self) -> &str {
        split_dir(&self.input_path).0
    }

    /// File name without its extension.
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Lowercased extension including the leading dot, or empty.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn kind(&self) -> FileKind {
        self.kind
    }

    /// Output path relative to the site directory, `/`-separated.
    pub fn output_path(&self) -> &str {
        &self.output_path
    }

    /// Absolute location of the source file on disk.
    pub fn abs_input_path(&self) -> PathBuf {
        self.segments()
            .fold(self.source_root.to_path_buf(), |path, segment| {
                path.join(segment)
            })
    }

    /// Location of the output file under `site_dir`.
    pub fn abs_output_path(&self, site_dir: &Path) -> PathBuf {
        self.output_path
            .split('/')
            .fold(site_dir.to_path_buf(), |path, segment| path.join(segment))
    }

    /// Whether the file stem is a reserved index name (`index`, `readme`).
    pub fn is_index(&self) -> bool {
        is_index_stem(&self.root)
    }

    pub fn is_documentation_page(&self) -> bool {
        self.kind == FileKind::Documentation
    }

    pub fn is_static_page(&self) -> bool {
        self.kind == FileKind::Static
    }

    pub fn is_media_file(&self) -> bool {
        matches!(self.kind, FileKind::Media(_))
    }

    pub fn is_javascript(&self) -> bool {
        self.kind == FileKind::Media(MediaKind::JavaScript)
    }

    pub fn is_css(&self) -> bool {
        self.kind == FileKind::Media(MediaKind::Css)
    }
}
