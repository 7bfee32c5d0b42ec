//! Guard analysis: proves calls safe behind SDK_INT version checks
//!
//! A call site with a required API level is checked two independent ways:
//! a lexical search over enclosing source scopes ([`lexical`]) and a
//! control-flow reachability prune over a lowered instruction stream
//! ([`reachability`]). Either proof suppresses the finding.

mod analyzer;
pub mod lexical;
pub mod predicate;
pub mod reachability;

pub use analyzer::GuardAnalyzer;

use crate::ast::{Ast, Location, NodeId};
use crate::parser::CallSite;
use crate::resolve::SymbolResolver;
use serde::Serialize;
use std::collections::HashMap;

/// Issue code for unguarded new-API calls.
pub const ISSUE_CODE: &str = "API001";

/// An Android API level. Always at least 1 (level 0 does not exist).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct ApiLevel(i64);

impl ApiLevel {
    pub const MIN: ApiLevel = ApiLevel(1);

    pub fn new(level: i64) -> Self {
        Self(level.max(1))
    }

    pub fn value(self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for ApiLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Everything the predicate/lexical passes need to look at one unit.
pub struct GuardContext<'a> {
    pub ast: &'a Ast,
    pub resolver: &'a dyn SymbolResolver,
    /// Per-unit method table, used to inline trivial version-check helpers
    /// like `fun isAtLeastLollipop() = SDK_INT >= 21`
    pub methods: &'a HashMap<String, NodeId>,
}

/// Severity levels for findings
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An unguarded call to an API newer than the project minimum.
#[derive(Debug, Clone, Serialize)]
pub struct ApiFinding {
    /// Callee name
    pub name: String,
    pub location: Location,
    /// API level the call requires
    pub requirement: ApiLevel,
    /// Effective minimum SDK of the project
    pub min_sdk: ApiLevel,
    pub severity: Severity,
    pub message: String,
}

impl ApiFinding {
    pub fn new(call: &CallSite, requirement: ApiLevel, min_sdk: ApiLevel) -> Self {
        let message = format!(
            "Call to '{}' requires API level {} (current min is {})",
            call.name, requirement, min_sdk
        );
        Self {
            name: call.name.clone(),
            location: call.location.clone(),
            requirement,
            min_sdk,
            severity: Severity::Error,
            message,
        }
    }

    pub fn code(&self) -> &'static str {
        ISSUE_CODE
    }
}
