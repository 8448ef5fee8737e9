//! `folio build` command implementation.

use std::path::PathBuf;

use clap::Args;
use folio_build::{BuildConfig, StaticSiteBuilder};
use folio_config::{CliSettings, Config};
use folio_site::Site;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the build command.
#[derive(Args, Debug)]
pub(crate) struct BuildArgs {
    /// Path to configuration file (default: auto-discover folio.toml).
    #[arg(short, long, env = "FOLIO_CONFIG")]
    pub(crate) config: Option<PathBuf>,

    /// Markdown source directory (overrides config).
    #[arg(short, long)]
    pub(crate) source_dir: Option<PathBuf>,

    /// Output directory (overrides config).
    #[arg(short = 'd', long)]
    pub(crate) site_dir: Option<PathBuf>,

    /// Fail on broken links and output collisions.
    #[arg(long)]
    pub(crate) strict: bool,

    /// Address pages as `page/index.html` instead of `page/`.
    #[arg(long)]
    pub(crate) no_directory_urls: bool,

    /// Enable verbose output (show INFO logs).
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl BuildArgs {
    /// Settings overriding the configuration file.
    fn cli_settings(&self) -> CliSettings {
        CliSettings {
            source_dir: self.source_dir.clone(),
            site_dir: self.site_dir.clone(),
            strict: self.strict.then_some(true),
            use_directory_urls: self.no_directory_urls.then_some(false),
        }
    }

    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let config = Config::load(self.config.as_deref(), Some(&self.cli_settings()))?;
        let docs = &config.docs_resolved;
        output.dir("Source", &docs.source_dir);
        output.dir("Output", &docs.site_dir);

        let mut site = Site::load(&config)?;
        let report = StaticSiteBuilder::new(BuildConfig::from_config(&config)).build(&mut site)?;
        output.report(&report, &docs.site_dir);
        Ok(())
    }
}
