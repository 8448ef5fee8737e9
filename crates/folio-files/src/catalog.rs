//! Source tree discovery and the file catalog.
//!
//! [`build_catalog`] walks the source root once per build and returns an
//! immutable [`FileCatalog`]. Rebuilds create a new catalog; existing ones
//! are never updated in place.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::ExcludePatterns;
use crate::file::{FileKind, FileRecord};
use crate::urls::{is_index_stem, split_dir, split_extension};

/// Error returned when the catalog cannot be built.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// A directory of the source tree could not be read.
    #[error("Cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// An exclude pattern is not a valid glob.
    #[error("Invalid exclude pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
}

/// Two or more input files that produce the same output file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputCollision {
    pub output_path: String,
    /// Colliding input paths in catalog order; the last one wins.
    pub input_paths: Vec<String>,
}

/// Ordered, indexed set of source files for one build.
///
/// Iteration order is the walk order: per directory, index files first and
/// the remaining files by byte-wise path comparison, then subdirectories.
#[derive(Debug, Default)]
pub struct FileCatalog {
    files: Vec<Arc<FileRecord>>,
    by_input_path: HashMap<String, Arc<FileRecord>>,
    collisions: Vec<OutputCollision>,
}

impl FileCatalog {
    /// Create a catalog from files already in catalog order.
    ///
    /// Duplicate input paths collapse to the later record in the index.
    pub fn new(files: Vec<FileRecord>) -> Self {
        let files: Vec<Arc<FileRecord>> = files.into_iter().map(Arc::new).collect();

        let by_input_path = files
            .iter()
            .map(|file| (file.input_path().to_owned(), Arc::clone(file)))
            .collect();

        let collisions = find_collisions(&files);

        Self {
            files,
            by_input_path,
            collisions,
        }
    }

    /// Look up a file by its `/`-separated input path.
    pub fn get(&self, input_path: &str) -> Option<&Arc<FileRecord>> {
        self.by_input_path.get(input_path)
    }

    pub fn contains(&self, input_path: &str) -> bool {
        self.by_input_path.contains_key(input_path)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<FileRecord>> {
        self.files.iter()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Markdown files, in catalog order.
    pub fn documentation_pages(&self) -> impl Iterator<Item = &Arc<FileRecord>> {
        self.files.iter().filter(|f| f.is_documentation_page())
    }

    /// HTML files copied through unchanged.
    pub fn static_pages(&self) -> impl Iterator<Item = &Arc<FileRecord>> {
        self.files.iter().filter(|f| f.is_static_page())
    }

    pub fn media_files(&self) -> impl Iterator<Item = &Arc<FileRecord>> {
        self.files.iter().filter(|f| f.is_media_file())
    }

    pub fn javascript_files(&self) -> impl Iterator<Item = &Arc<FileRecord>> {
        self.files.iter().filter(|f| f.is_javascript())
    }

    pub fn css_files(&self) -> impl Iterator<Item = &Arc<FileRecord>> {
        self.files.iter().filter(|f| f.is_css())
    }

    /// Distinct input files mapping to the same output path.
    pub fn output_collisions(&self) -> &[OutputCollision] {
        &self.collisions
    }
}

impl<'a> IntoIterator for &'a FileCatalog {
    type Item = &'a Arc<FileRecord>;
    type IntoIter = std::slice::Iter<'a, Arc<FileRecord>>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.iter()
    }
}

fn find_collisions(files: &[Arc<FileRecord>]) -> Vec<OutputCollision> {
    let mut by_output: HashMap<&str, Vec<&str>> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();

    for file in files {
        let inputs = by_output.entry(file.output_path()).or_insert_with(|| {
            order.push(file.output_path());
            Vec::new()
        });
        if !inputs.contains(&file.input_path()) {
            inputs.push(file.input_path());
        }
    }

    order
        .into_iter()
        .filter_map(|output| {
            let inputs = by_output.remove(output)?;
            (inputs.len() > 1).then(|| OutputCollision {
                output_path: output.to_owned(),
                input_paths: inputs.into_iter().map(str::to_owned).collect(),
            })
        })
        .collect()
}

/// Sort file names with index files first.
///
/// Index files (`index.*`, `readme.*`) keep their relative order; all other
/// names are compared byte-wise. Only the last path segment decides whether a
/// name is an index file.
///
/// # Examples
///
/// ```
/// use folio_files::sort_files;
///
/// assert_eq!(
///     sort_files(vec!["b.md", "index.html", "a.md", "index.md"]),
///     ["index.html", "index.md", "a.md", "b.md"]
/// );
/// ```
pub fn sort_files<S: AsRef<str>>(mut names: Vec<S>) -> Vec<S> {
    fn is_index_name(name: &str) -> bool {
        let (_, file_name) = split_dir(name);
        is_index_stem(split_extension(file_name).0)
    }

    names.sort_by(|a, b| {
        let (a, b) = (a.as_ref(), b.as_ref());
        match (is_index_name(a), is_index_name(b)) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => a.cmp(b),
        }
    });
    names
}

/// Walk `source_root` and build the catalog.
///
/// Entries matching `exclude` are skipped, excluded directories are not
/// descended into. Symbolic links are followed.
///
/// # Errors
///
/// Returns [`CatalogError::Io`] if the root or any directory below it cannot
/// be read.
pub fn build_catalog(
    source_root: &Path,
    exclude: &ExcludePatterns,
) -> Result<FileCatalog, CatalogError> {
    let root: Arc<Path> = Arc::from(source_root);
    let mut files = Vec::new();
    walk_directory(&root, "", exclude, &mut files)?;

    let catalog = FileCatalog::new(files);
    tracing::info!(
        source = %source_root.display(),
        files = catalog.len(),
        pages = catalog.documentation_pages().count(),
        "Catalog built"
    );
    Ok(catalog)
}

fn walk_directory(
    root: &Arc<Path>,
    rel_dir: &str,
    exclude: &ExcludePatterns,
    files: &mut Vec<FileRecord>,
) -> Result<(), CatalogError> {
    let dir_path = if rel_dir.is_empty() {
        root.to_path_buf()
    } else {
        root.join(rel_dir)
    };

    let io_error = |source| CatalogError::Io {
        path: dir_path.clone(),
        source,
    };

    let mut file_names = Vec::new();
    let mut dir_names = Vec::new();

    for entry in fs::read_dir(&dir_path).map_err(io_error)? {
        let entry = entry.map_err(io_error)?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let rel_path = join_relative(rel_dir, &name);
        // `Path::is_dir` follows symlinks
        let is_dir = entry.path().is_dir();

        if exclude.is_excluded(&name, &rel_path, is_dir) {
            tracing::debug!(path = %rel_path, "Excluded from catalog");
            continue;
        }

        if is_dir {
            dir_names.push(name);
        } else {
            file_names.push(name);
        }
    }

    // Directory listing order is platform dependent
    file_names.sort_unstable();
    dir_names.sort_unstable();

    for name in sort_files(file_names) {
        let record = FileRecord::new(Arc::clone(root), &join_relative(rel_dir, &name));
        if record.kind() == FileKind::Documentation {
            tracing::trace!(input = record.input_path(), output = record.output_path(), "Page");
        }
        files.push(record);
    }

    for name in dir_names {
        walk_directory(root, &join_relative(rel_dir, &name), exclude, files)?;
    }

    Ok(())
}

fn join_relative(dir: &str, name: &str) -> String {
    if dir.is_empty() {
        name.to_owned()
    } else {
        format!("{dir}/{name}")
    }
}
