mod colors;
mod compact;
mod json;
mod terminal;

pub use compact::CompactReporter;
pub use json::JsonReporter;
pub use terminal::TerminalReporter;

use crate::analysis::ApiFinding;
use miette::Result;
use std::path::PathBuf;

/// Output format for reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportFormat {
    /// Default terminal output
    #[default]
    Terminal,
    /// Compact one-line-per-issue format
    Compact,
    /// JSON machine-readable format
    Json,
}

/// Reporter for outputting guard analysis results
pub struct Reporter {
    format: ReportFormat,
    output_path: Option<PathBuf>,
    base_path: Option<PathBuf>,
}

impl Reporter {
    pub fn new(format: ReportFormat, output_path: Option<PathBuf>) -> Self {
        Self {
            format,
            output_path,
            base_path: None,
        }
    }

    pub fn with_base_path(mut self, base: PathBuf) -> Self {
        self.base_path = Some(base);
        self
    }

    /// Report the findings in the configured format.
    pub fn report(&self, findings: &[ApiFinding]) -> Result<()> {
        match self.format {
            ReportFormat::Terminal => TerminalReporter::new().report(findings),
            ReportFormat::Compact => {
                let mut reporter = CompactReporter::new();
                if let Some(base) = &self.base_path {
                    reporter = reporter.with_base_path(base.clone());
                }
                reporter.report(findings);
                Ok(())
            }
            ReportFormat::Json => JsonReporter::new(self.output_path.clone()).report(findings),
        }
    }
}
