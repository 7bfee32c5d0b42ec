//! Terminal reporter with colored output
//!
//! Based on Rust compiler diagnostic design (RFC 1644)

use crate::analysis::ApiFinding;
use crate::report::colors::{SeveritySymbol, StructureColors};
use colored::Colorize;
use miette::Result;
use std::collections::HashMap;
use std::path::PathBuf;

/// Terminal reporter with colored output
pub struct TerminalReporter;

impl TerminalReporter {
    pub fn new() -> Self {
        Self
    }

    pub fn report(&self, findings: &[ApiFinding]) -> Result<()> {
        if findings.is_empty() {
            println!("{}", "No unguarded API calls found!".green().bold());
            return Ok(());
        }

        let mut by_file: HashMap<PathBuf, Vec<&ApiFinding>> = HashMap::new();
        for finding in findings {
            by_file
                .entry(finding.location.file.clone())
                .or_default()
                .push(finding);
        }

        println!();
        println!(
            "Found {} unguarded API calls:",
            StructureColors::count(&findings.len().to_string())
        );
        println!();

        let mut files: Vec<_> = by_file.keys().collect();
        files.sort();

        for file in files {
            println!("{}", StructureColors::file_path(&file.display().to_string()));

            let mut items: Vec<_> = by_file[file].iter().collect();
            items.sort_by_key(|f| f.location.line);

            for finding in items {
                self.print_finding(finding);
            }

            println!();
        }

        Ok(())
    }

    fn print_finding(&self, finding: &ApiFinding) {
        let location = format!("{:>5}:{:<3}", finding.location.line, finding.location.column);

        println!(
            "  {} {} [{}] {}",
            StructureColors::location(&location),
            SeveritySymbol::colored(&finding.severity),
            StructureColors::rule_code(finding.code()),
            finding.message
        );
        println!(
            "    {} call '{}' requires API {}",
            "→".dimmed(),
            StructureColors::symbol_name(&finding.name),
            finding.requirement
        );
    }
}

impl Default for TerminalReporter {
    fn default() -> Self {
        Self::new()
    }
}
