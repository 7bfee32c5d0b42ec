//! sdkguard - Unguarded Android API call detection (Kotlin/Java)
//!
//! This library flags calls to Android APIs newer than a project's minimum
//! SDK unless the call is provably protected by a `SDK_INT` version check.
//!
//! # Architecture
//!
//! The analysis pipeline consists of:
//! 1. **File Discovery** - Find all .kt and .java files
//! 2. **Parsing** - Parse source files using tree-sitter
//! 3. **Requirement Lookup** - Map each call to the API level it needs
//! 4. **Guard Proofs** - Lexical scope search, early-exit scan, and a
//!    control-flow reachability prune; any one proof clears the call
//! 5. **Reporting** - Output results in various formats

pub mod analysis;
pub mod apidb;
pub mod ast;
pub mod cfg;
pub mod config;
pub mod discovery;
pub mod lower;
pub mod parser;
pub mod report;
pub mod resolve;

pub use analysis::{ApiFinding, ApiLevel, GuardAnalyzer, Severity};
pub use apidb::ApiDatabase;
pub use config::Config;
pub use discovery::{FileFinder, FileType, SourceFile};
pub use parser::{JavaParser, KotlinParser, ParsedUnit};
pub use report::{ReportFormat, Reporter};
pub use resolve::AndroidResolver;
