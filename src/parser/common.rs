//! Shared parsing surface for the language front-ends
//!
//! Each front-end lowers a tree-sitter parse tree into the closed
//! [`crate::ast::NodeKind`] model and hands back a [`ParsedUnit`] with the
//! call sites, method table and suppression markers already collected.

use crate::ast::{Ast, Location, NodeId, NodeKind};
use crate::resolve::LineSuppressions;
use regex::Regex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to load grammar: {0}")]
    Grammar(String),
    #[error("tree-sitter could not parse {path}")]
    Unparseable { path: PathBuf },
}

/// A call expression found in a compilation unit.
#[derive(Debug, Clone)]
pub struct CallSite {
    pub node: NodeId,
    /// Simple (unqualified) method name
    pub name: String,
    pub location: Location,
}

/// One parsed source file, ready for analysis.
#[derive(Debug)]
pub struct ParsedUnit {
    pub path: PathBuf,
    pub ast: Ast,
    pub calls: Vec<CallSite>,
    /// Method declarations by simple name, for helper-method lookups
    pub methods: HashMap<String, NodeId>,
    pub suppressions: LineSuppressions,
}

/// A language front-end.
pub trait Parser: Sync {
    fn parse_source(&self, path: &Path, source: &str) -> Result<ParsedUnit, ParseError>;

    fn parse_file(&self, path: &Path) -> Result<ParsedUnit, ParseError> {
        let source = std::fs::read_to_string(path).map_err(|source| ParseError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.parse_source(path, &source)
    }
}

/// Pick a front-end from the file extension.
pub fn parser_for_path(path: &Path) -> Option<Box<dyn Parser>> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("java") => Some(Box::new(super::JavaParser::new())),
        Some("kt") | Some("kts") => Some(Box::new(super::KotlinParser::new())),
        _ => None,
    }
}

/// Finalize an arena built by a front-end: resolve parent links, collect
/// call sites and the method table, and scan the source for suppression
/// markers.
pub(crate) fn finish_unit(path: &Path, mut ast: Ast, source: &str) -> ParsedUnit {
    ast.resolve_parents();

    let mut calls = Vec::new();
    let mut methods = HashMap::new();
    for id in ast.ids() {
        match ast.kind(id) {
            NodeKind::Call { name, .. } if !name.is_empty() => {
                calls.push(CallSite {
                    node: id,
                    name: name.clone(),
                    location: ast.location(id).clone(),
                });
            }
            NodeKind::Method { name, .. } => {
                methods.entry(name.clone()).or_insert(id);
            }
            _ => {}
        }
    }

    let suppressions = scan_suppressions(source, &ast, &methods);

    ParsedUnit {
        path: path.to_path_buf(),
        ast,
        calls,
        methods,
        suppressions,
    }
}

fn inline_marker_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"noinspection\s+NewApi").unwrap())
}

fn annotation_marker_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"@(?:SuppressLint|Suppress)\s*\([^)]*NewApi[^)]*\)|@TargetApi\s*\("#).unwrap()
    })
}

/// Collect suppression markers from the raw source text.
///
/// `noinspection NewApi` comments mark their own line. The annotation forms
/// (`@SuppressLint("NewApi")`, `@Suppress("NewApi")`, `@TargetApi(..)`)
/// suppress the method they annotate, so the following method declaration's
/// whole line range is recorded.
fn scan_suppressions(
    source: &str,
    ast: &Ast,
    methods: &HashMap<String, NodeId>,
) -> LineSuppressions {
    let mut suppressions = LineSuppressions::new();
    let line_starts = line_start_offsets(source);

    let method_spans: Vec<(usize, usize)> = methods
        .values()
        .map(|&id| {
            let loc = ast.location(id);
            (loc.line, line_of(&line_starts, loc.end_byte))
        })
        .collect();

    for (index, text) in source.lines().enumerate() {
        let line = index + 1;
        if inline_marker_re().is_match(text) {
            suppressions.add_marker(line);
            continue;
        }
        if annotation_marker_re().is_match(text) {
            // The annotated declaration starts on this line or shortly below
            let annotated = method_spans
                .iter()
                .filter(|&&(start, _)| start >= line && start <= line + 3)
                .min_by_key(|&&(start, _)| start);
            match annotated {
                Some(&(start, end)) => suppressions.add_method_range(start, end),
                None => suppressions.add_marker(line),
            }
        }
    }

    suppressions
}

/// Parse a Java/Kotlin integer literal (underscores, hex, `L` suffix).
pub(crate) fn parse_int_literal(text: &str) -> Option<i64> {
    let text = text.trim_end_matches(['l', 'L']).replace('_', "");
    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        i64::from_str_radix(hex, 16).ok()
    } else {
        text.parse().ok()
    }
}

fn line_start_offsets(source: &str) -> Vec<usize> {
    let mut starts = vec![0];
    for (offset, byte) in source.bytes().enumerate() {
        if byte == b'\n' {
            starts.push(offset + 1);
        }
    }
    starts
}

/// 1-based line containing a byte offset.
fn line_of(line_starts: &[usize], byte: usize) -> usize {
    line_starts.partition_point(|&start| start <= byte)
}
