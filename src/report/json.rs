//! JSON machine-readable reporter

use crate::analysis::ApiFinding;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Serialize)]
struct JsonReport<'a> {
    version: &'static str,
    total: usize,
    findings: &'a [ApiFinding],
}

/// Writes findings as JSON to a file or stdout.
pub struct JsonReporter {
    output_path: Option<PathBuf>,
}

impl JsonReporter {
    pub fn new(output_path: Option<PathBuf>) -> Self {
        Self { output_path }
    }

    pub fn report(&self, findings: &[ApiFinding]) -> Result<()> {
        let report = JsonReport {
            version: env!("CARGO_PKG_VERSION"),
            total: findings.len(),
            findings,
        };
        let json = serde_json::to_string_pretty(&report).into_diagnostic()?;

        match &self.output_path {
            Some(path) => {
                std::fs::write(path, json).into_diagnostic()?;
                eprintln!("Report written to {}", path.display());
            }
            None => println!("{json}"),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{ApiFinding, ApiLevel};
    use crate::ast::{Ast, Location, NodeKind};
    use crate::parser::CallSite;

    fn finding() -> ApiFinding {
        let mut ast = Ast::new();
        let node = ast.push_synthetic(NodeKind::Call {
            name: "getDrawable".to_string(),
            args: vec![],
        });
        let call = CallSite {
            node,
            name: "getDrawable".to_string(),
            location: Location {
                file: "A.java".into(),
                line: 4,
                column: 9,
                start_byte: 0,
                end_byte: 0,
            },
        };
        ApiFinding::new(&call, ApiLevel::new(21), ApiLevel::new(19))
    }

    #[test]
    fn test_json_shape() {
        let report = JsonReport {
            version: "0.0.0",
            total: 1,
            findings: &[finding()],
        };
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"total\":1"));
        assert!(json.contains("getDrawable"));
        assert!(json.contains("\"requirement\":21"));
        assert!(json.contains("\"severity\":\"error\""));
    }

    #[test]
    fn test_write_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let reporter = JsonReporter::new(Some(path.clone()));
        reporter.report(&[finding()]).unwrap();

        let text = std::fs::read_to_string(path).unwrap();
        assert!(text.contains("getDrawable"));
    }
}
