//! Reachability side of the guard analysis
//!
//! Operates one level below source syntax: a routine's lowered instruction
//! stream gets a CFG with satisfied version-check edges pruned, and the call
//! is proven guarded when it is no longer reachable from entry. This catches
//! guard shapes that do not surface as clean `if` nodes.

use crate::analysis::ApiLevel;
use crate::cfg::{contains_version_check, ControlFlowGraph, Routine, VersionCheckPrune};
use tracing::warn;

/// Entry instruction index of every routine.
const ENTRY: usize = 0;

/// Is the call at `call_index` provably guarded at `required`?
///
/// Graph construction failures degrade to "not proven": the condition is
/// logged, never propagated.
pub fn is_guarded_by_cfg(routine: &Routine, call_index: usize, required: ApiLevel) -> bool {
    if call_index >= routine.instrs.len() {
        return false;
    }
    if !contains_version_check(routine) {
        return false;
    }
    let policy = VersionCheckPrune::new(required);
    match ControlFlowGraph::build(routine, &policy) {
        Ok(graph) => !graph.is_reachable(ENTRY, call_index),
        Err(err) => {
            warn!(
                routine = %routine.name,
                "control flow graph construction failed: {err}"
            );
            false
        }
    }
}
