//! `folio.toml` loading and validation.
//!
//! [`Config::load`] reads an explicit file or the first `folio.toml` found
//! walking up from the working directory, resolves `docs` paths against the
//! file's directory, applies [`CliSettings`] and validates the result.
//!
//! `site.url`, `repo.url` and `repo.edit_uri` expand `${VAR}` and
//! `${VAR:-default}` references before validation; an unset variable without
//! a default is an error.
//!
//! Repositories hosted on GitHub or Bitbucket get a default `edit_uri` when
//! none is configured.

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override docs source directory.
    pub source_dir: Option<PathBuf>,
    /// Override output directory.
    pub site_dir: Option<PathBuf>,
    /// Override strict mode.
    pub strict: Option<bool>,
    /// Override the URL layout.
    pub use_directory_urls: Option<bool>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "folio.toml";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Site-wide settings.
    pub site: SiteConfig,
    /// Documentation paths (relative strings from TOML).
    docs: DocsConfigRaw,
    /// Source repository settings.
    pub repo: RepoConfig,
    /// Explicit navigation; empty means catalog order.
    pub nav: Vec<NavEntry>,

    /// Resolved docs configuration (set after loading).
    #[serde(skip)]
    pub docs_resolved: DocsConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::rooted_at(Path::new("."))
    }
}

/// Site-wide settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Site name shown in page titles.
    pub name: String,
    /// Public URL of the site, used for canonical links.
    pub url: Option<String>,
    /// Address pages as `/guide/` instead of `/guide/index.html`.
    pub use_directory_urls: bool,
    /// Treat broken links and output collisions as errors.
    pub strict: bool,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: "Documentation".to_owned(),
            url: None,
            use_directory_urls: true,
            strict: false,
        }
    }
}

/// Raw docs configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct DocsConfigRaw {
    source_dir: Option<String>,
    site_dir: Option<String>,
    exclude: Vec<String>,
}

/// Resolved documentation configuration with absolute paths.
#[derive(Debug, Default)]
pub struct DocsConfig {
    /// Source directory for markdown files.
    pub source_dir: PathBuf,
    /// Output directory for the built site.
    pub site_dir: PathBuf,
    /// Exclude patterns applied while discovering source files.
    pub exclude: Vec<String>,
}

/// Source repository settings used for edit links.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct RepoConfig {
    /// Repository URL.
    pub url: Option<String>,
    /// Path, query or fragment appended to `url` for edit links.
    ///
    /// An empty string disables the host-derived default.
    pub edit_uri: Option<String>,
}

impl RepoConfig {
    /// Fill in `edit_uri` for well-known hosts when it was not configured.
    fn apply_host_defaults(&mut self) {
        if self.edit_uri.is_some() {
            return;
        }
        let Some(url) = self.url.as_deref() else {
            return;
        };
        self.edit_uri = match url_host(url).to_ascii_lowercase().as_str() {
            "github.com" => Some("edit/master/docs/".to_owned()),
            "bitbucket.org" => Some("src/default/docs/".to_owned()),
            _ => None,
        };
    }
}

/// Host part of an absolute URL, without userinfo or port.
fn url_host(url: &str) -> &str {
    let Some((_, rest)) = url.split_once("://") else {
        return "";
    };
    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    let host = authority.rsplit_once('@').map_or(authority, |(_, host)| host);
    host.split(':').next().unwrap_or_default()
}

/// Navigation entry from `[[nav]]`.
///
/// An entry with `path` is a page; an entry with `children` is a section.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct NavEntry {
    /// Page title override or section title.
    pub title: Option<String>,
    /// Source path of a page, relative to the docs directory.
    pub path: Option<String>,
    /// Entries of a section.
    #[serde(default)]
    pub children: Vec<NavEntry>,
}

impl NavEntry {
    fn validate(&self, field: &str) -> Result<(), ConfigError> {
        match (&self.path, self.children.is_empty()) {
            (Some(_), false) => Err(ConfigError::Validation(format!(
                "{field} cannot have both path and children"
            ))),
            (Some(path), true) => require_non_empty(path, &format!("{field}.path")),
            (None, true) => Err(ConfigError::Validation(format!(
                "{field} requires either path or children"
            ))),
            (None, false) => {
                let title = self.title.as_deref().unwrap_or_default();
                require_non_empty(title, &format!("{field}.title"))?;
                self.children
                    .iter()
                    .enumerate()
                    .try_for_each(|(i, child)| child.validate(&format!("{field}.children[{i}]")))
            }
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`repo.url`").
        field: String,
        /// Error message (e.g., "${`REPO_URL`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `folio.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values. The merged result
    /// is validated.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails or
    /// the merged configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let file = match config_path {
            Some(path) if !path.exists() => return Err(ConfigError::NotFound(path.to_path_buf())),
            Some(path) => Some(path.to_path_buf()),
            None => std::env::current_dir().ok().and_then(|cwd| find_upwards(&cwd)),
        };
        let mut config = match file {
            Some(path) => Self::load_from_file(&path)?,
            None => Self::rooted_at(&std::env::current_dir().unwrap_or_default()),
        };

        if let Some(settings) = cli_settings {
            config.override_with(settings);
        }

        config.validate()?;
        Ok(config)
    }

    fn override_with(&mut self, cli: &CliSettings) {
        let docs = &mut self.docs_resolved;
        if let Some(dir) = &cli.source_dir {
            docs.source_dir.clone_from(dir);
        }
        if let Some(dir) = &cli.site_dir {
            docs.site_dir.clone_from(dir);
        }
        self.site.strict = cli.strict.unwrap_or(self.site.strict);
        self.site.use_directory_urls = cli
            .use_directory_urls
            .unwrap_or(self.site.use_directory_urls);
    }

    /// Defaults with `docs/` and `site/` under `root`.
    fn rooted_at(root: &Path) -> Self {
        Self {
            site: SiteConfig::default(),
            docs: DocsConfigRaw::default(),
            repo: RepoConfig::default(),
            nav: Vec::new(),
            docs_resolved: DocsConfig {
                source_dir: root.join("docs"),
                site_dir: root.join("site"),
                exclude: Vec::new(),
            },
            config_path: None,
        }
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(&std::fs::read_to_string(path)?)?;

        // host defaults look at the expanded repo.url
        config.expand_env_vars()?;
        config.repo.apply_host_defaults();

        config.resolve_paths(path.parent().unwrap_or(Path::new(".")));
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically by [`Config::load`].
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_site()?;
        self.validate_repo()?;
        self.validate_docs()?;
        self.nav
            .iter()
            .enumerate()
            .try_for_each(|(i, entry)| entry.validate(&format!("nav[{i}]")))
    }

    fn validate_site(&self) -> Result<(), ConfigError> {
        if let Some(url) = &self.site.url {
            require_non_empty(url, "site.url")?;
            require_http_url(url, "site.url")?;
        }
        Ok(())
    }

    fn validate_repo(&self) -> Result<(), ConfigError> {
        if let Some(url) = &self.repo.url {
            require_non_empty(url, "repo.url")?;
            require_http_url(url, "repo.url")?;
        }

        if let Some(edit_uri) = &self.repo.edit_uri {
            if edit_uri.chars().any(char::is_whitespace) {
                return Err(ConfigError::Validation(
                    "repo.edit_uri cannot contain whitespace".to_owned(),
                ));
            }
            if edit_uri.contains("://") {
                return Err(ConfigError::Validation(
                    "repo.edit_uri must be relative to repo.url".to_owned(),
                ));
            }
        }

        Ok(())
    }

    fn validate_docs(&self) -> Result<(), ConfigError> {
        let DocsConfig {
            source_dir,
            site_dir,
            ..
        } = &self.docs_resolved;

        if source_dir == site_dir {
            return Err(ConfigError::Validation(
                "docs.site_dir cannot be the same as docs.source_dir".to_owned(),
            ));
        }
        if site_dir.starts_with(source_dir) {
            return Err(ConfigError::Validation(
                "docs.site_dir cannot be inside docs.source_dir".to_owned(),
            ));
        }
        Ok(())
    }

    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        expand::expand_optional(&mut self.site.url, "site.url")?;
        expand::expand_optional(&mut self.repo.url, "repo.url")?;
        expand::expand_optional(&mut self.repo.edit_uri, "repo.edit_uri")?;
        Ok(())
    }

    /// Resolve `[docs]` directories against the config file's directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let resolve = |path: Option<&str>, default: &str| config_dir.join(path.unwrap_or(default));

        self.docs_resolved = DocsConfig {
            source_dir: resolve(self.docs.source_dir.as_deref(), "docs"),
            site_dir: resolve(self.docs.site_dir.as_deref(), "site"),
            exclude: self.docs.exclude.clone(),
        };
    }
}

/// Nearest `folio.toml` in `start` or one of its ancestors.
fn find_upwards(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(CONFIG_FILENAME))
        .find(|candidate| candidate.is_file())
}
