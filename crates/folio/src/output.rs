//! Build progress and diagnostics on the terminal.

use std::fmt::Display;
use std::path::Path;

use console::{Style, Term};
use folio_build::BuildReport;

/// Writes build progress to stderr.
pub(crate) struct Output {
    term: Term,
    ok: Style,
    warn: Style,
    fail: Style,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            ok: Style::new().green(),
            warn: Style::new().yellow(),
            fail: Style::new().red(),
        }
    }

    fn line(&self, style: Option<&Style>, msg: impl Display) {
        let text = match style {
            Some(style) => style.apply_to(msg).to_string(),
            None => msg.to_string(),
        };
        let _ = self.term.write_line(&text);
    }

    /// Print a labelled directory, e.g. `Source: docs`.
    pub(crate) fn dir(&self, label: &str, path: &Path) {
        self.line(None, format_args!("{label}: {}", path.display()));
    }

    /// Print the totals of a finished build.
    ///
    /// Individual warnings are already logged by the build; only their count
    /// is repeated here.
    pub(crate) fn report(&self, report: &BuildReport, site_dir: &Path) {
        let style = if report.warnings.is_empty() {
            &self.ok
        } else {
            &self.warn
        };
        self.line(Some(style), summary(report, site_dir));
    }

    /// Print a fatal error in red.
    pub(crate) fn error(&self, err: impl Display) {
        self.line(Some(&self.fail), format_args!("Error: {err}"));
    }
}

fn summary(report: &BuildReport, site_dir: &Path) -> String {
    let warnings = match report.warnings.len() {
        0 => String::new(),
        1 => " with 1 warning".to_owned(),
        n => format!(" with {n} warnings"),
    };
    format!(
        "Built {} pages and copied {} files to {}{warnings}",
        report.pages,
        report.copied,
        site_dir.display()
    )
}
