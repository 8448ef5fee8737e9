//! Gitignore-style exclusion of source paths.

use glob::{MatchOptions, Pattern};

use crate::CatalogError;

/// Patterns applied to every walk regardless of configuration.
///
/// Dotfiles are never part of the site and the root `templates/` directory
/// belongs to the theme.
const ALWAYS_EXCLUDED: [&str; 2] = [".*", "/templates/"];

/// Wildcards never cross a `/`.
const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

#[derive(Debug)]
struct ExcludePattern {
    glob: Pattern,
    /// Pattern ended in `/`: applies to directories only.
    dir_only: bool,
    /// Pattern is matched against the full relative path instead of the basename.
    anchored: bool,
}

impl ExcludePattern {
    fn parse(raw: &str) -> Result<Self, CatalogError> {
        let dir_only = raw.ends_with('/');
        let trimmed = raw.trim_matches('/');
        let anchored = raw.starts_with('/') || trimmed.contains('/');
        let glob = Pattern::new(trimmed).map_err(|source| CatalogError::Pattern {
            pattern: raw.to_owned(),
            source,
        })?;
        Ok(Self {
            glob,
            dir_only,
            anchored,
        })
    }

    fn matches(&self, basename: &str, path: &str, is_dir: bool) -> bool {
        if self.dir_only && !is_dir {
            return false;
        }
        let candidate = if self.anchored { path } else { basename };
        self.glob.matches_with(candidate, MATCH_OPTIONS)
    }
}

/// Compiled exclusion rules for catalog building.
///
/// Rules follow `.gitignore` conventions:
/// - `drafts/` only matches directories
/// - `/notes.md` and `guide/old.md` match the full relative path
/// - anything else (`*.tmp`, `secret.md`) matches the file or directory name
///
/// Dotfiles and the root `templates/` directory are always excluded.
#[derive(Debug)]
pub struct ExcludePatterns {
    patterns: Vec<ExcludePattern>,
}

impl ExcludePatterns {
    /// Compile user patterns on top of the built-in exclusions.
    pub fn new<I, S>(patterns: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut compiled = ALWAYS_EXCLUDED
            .iter()
            .map(|raw| ExcludePattern::parse(raw))
            .collect::<Result<Vec<_>, _>>()?;
        for raw in patterns {
            compiled.push(ExcludePattern::parse(raw.as_ref())?);
        }
        Ok(Self { patterns: compiled })
    }

    /// Check whether an entry must be skipped.
    ///
    /// `path` is the `/`-separated path relative to the source root and
    /// `basename` its last segment.
    pub fn is_excluded(&self, basename: &str, path: &str, is_dir: bool) -> bool {
        self.patterns
            .iter()
            .any(|pattern| pattern.matches(basename, path, is_dir))
    }
}

impl Default for ExcludePatterns {
    fn default() -> Self {
        Self::new(std::iter::empty::<&str>()).unwrap_or(Self {
            patterns: Vec::new(),
        })
    }
}
