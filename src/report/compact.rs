//! Compact terminal reporter - minimal output format
//!
//! One line per issue, optimized for scanning large result sets

use crate::analysis::ApiFinding;
use crate::report::colors::{BoxChars, SeveritySymbol, StructureColors};
use colored::Colorize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Compact reporter for minimal, scannable output
pub struct CompactReporter {
    /// Base path to strip from file paths for shorter display
    base_path: Option<PathBuf>,
    /// Maximum width for file paths (truncate if longer)
    max_path_width: usize,
}

impl CompactReporter {
    pub fn new() -> Self {
        Self {
            base_path: None,
            max_path_width: 60,
        }
    }

    pub fn with_base_path(mut self, path: PathBuf) -> Self {
        self.base_path = Some(path);
        self
    }

    /// Format a path relative to base path if set
    fn format_path(&self, path: &Path) -> String {
        let display = if let Some(base) = &self.base_path {
            path.strip_prefix(base)
                .unwrap_or(path)
                .display()
                .to_string()
        } else {
            path.display().to_string()
        };

        if display.len() > self.max_path_width {
            format!("...{}", &display[display.len() - self.max_path_width + 3..])
        } else {
            display
        }
    }

    pub fn report(&self, findings: &[ApiFinding]) {
        if findings.is_empty() {
            println!("{}", "No unguarded API calls found!".green().bold());
            return;
        }

        let mut by_file: HashMap<PathBuf, Vec<&ApiFinding>> = HashMap::new();
        for finding in findings {
            by_file
                .entry(finding.location.file.clone())
                .or_default()
                .push(finding);
        }

        let mut files: Vec<_> = by_file.keys().collect();
        files.sort();

        for file in files {
            println!("{}", StructureColors::file_path(&self.format_path(file)));

            let mut items: Vec<_> = by_file[file].iter().collect();
            items.sort_by_key(|f| f.location.line);

            for finding in items {
                let location =
                    format!("{:>5}:{:<3}", finding.location.line, finding.location.column);
                println!(
                    "  {}  {}  {}  '{}' needs API {} (min {})",
                    StructureColors::location(&location),
                    SeveritySymbol::colored(&finding.severity),
                    StructureColors::rule_code(finding.code()),
                    StructureColors::symbol_name(&finding.name),
                    finding.requirement,
                    finding.min_sdk
                );
            }
            println!();
        }

        self.print_summary(findings);
    }

    fn print_summary(&self, findings: &[ApiFinding]) {
        use crate::analysis::Severity;

        let errors = findings
            .iter()
            .filter(|f| matches!(f.severity, Severity::Error))
            .count();
        let warnings = findings
            .iter()
            .filter(|f| matches!(f.severity, Severity::Warning))
            .count();

        println!("{}", BoxChars::heavy_line(50).dimmed());

        let mut parts = Vec::new();
        if errors > 0 {
            parts.push(format!("{} {}", errors, "errors".red()));
        }
        if warnings > 0 {
            parts.push(format!("{} {}", warnings, "warnings".yellow()));
        }

        println!(
            "  {} {} ({})",
            StructureColors::count(&findings.len().to_string()),
            "unguarded calls".bold(),
            parts.join(", ")
        );
    }
}

impl Default for CompactReporter {
    fn default() -> Self {
        Self::new()
    }
}
