//! Orchestrates the guard proofs over a parsed unit
//!
//! A call is safe when ANY strategy proves it: the enclosing-scope search,
//! the preceding early-exit scan, or the CFG reachability prune over the
//! lowered method body. The strategies are deliberately OR-ed; each one
//! covers shapes the others miss.

use crate::analysis::lexical::{is_preceded_by_version_exit, is_within_version_check};
use crate::analysis::reachability::is_guarded_by_cfg;
use crate::analysis::{ApiFinding, ApiLevel, GuardContext, ISSUE_CODE};
use crate::apidb::ApiDatabase;
use crate::ast::NodeId;
use crate::lower::lower_method;
use crate::parser::ParsedUnit;
use crate::resolve::{SuppressionOracle, SymbolResolver};
use tracing::debug;

pub struct GuardAnalyzer<'a> {
    resolver: &'a dyn SymbolResolver,
    min_sdk: ApiLevel,
    respect_suppressions: bool,
}

impl<'a> GuardAnalyzer<'a> {
    pub fn new(resolver: &'a dyn SymbolResolver, min_sdk: ApiLevel) -> Self {
        Self {
            resolver,
            min_sdk,
            respect_suppressions: true,
        }
    }

    pub fn respect_suppressions(mut self, respect: bool) -> Self {
        self.respect_suppressions = respect;
        self
    }

    pub fn min_sdk(&self) -> ApiLevel {
        self.min_sdk
    }

    /// Is this call provably guarded at `required`?
    pub fn is_guarded(&self, unit: &ParsedUnit, call: NodeId, required: ApiLevel) -> bool {
        let ctx = GuardContext {
            ast: &unit.ast,
            resolver: self.resolver,
            methods: &unit.methods,
        };
        if is_within_version_check(&ctx, call, required) {
            return true;
        }
        if is_preceded_by_version_exit(&ctx, call, required) {
            return true;
        }
        let Some(method) = unit.ast.enclosing_method(call) else {
            return false;
        };
        let Some(lowered) = lower_method(&unit.ast, self.resolver, method) else {
            return false;
        };
        let Some(&index) = lowered.call_indices.get(&call) else {
            return false;
        };
        is_guarded_by_cfg(&lowered.routine, index, required)
    }

    /// Report every unguarded call in the unit requiring more than the
    /// project minimum, sorted by position.
    pub fn analyze_unit(&self, unit: &ParsedUnit, db: &ApiDatabase) -> Vec<ApiFinding> {
        let mut findings = Vec::new();
        for call in &unit.calls {
            let Some(required) = db.lookup(&call.name) else {
                continue;
            };
            if required <= self.min_sdk {
                continue;
            }
            if self.respect_suppressions
                && unit.suppressions.is_suppressed(ISSUE_CODE, call.location.line)
            {
                continue;
            }
            if self.is_guarded(unit, call.node, required) {
                continue;
            }
            findings.push(ApiFinding::new(call, required, self.min_sdk));
        }
        findings.sort_by_key(|f| (f.location.line, f.location.column));
        debug!(
            path = %unit.path.display(),
            calls = unit.calls.len(),
            findings = findings.len(),
            "analyzed unit"
        );
        findings
    }
}
