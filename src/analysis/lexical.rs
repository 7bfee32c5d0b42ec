//! Lexical guard search
//!
//! Walks enclosing scopes outward from a call site, asking the predicate
//! evaluator at each `if` / boolean chain, and separately scans earlier
//! sibling statements for version-check early exits
//! (`if (SDK_INT < L) return;`). Absence of a proof only means the finding
//! is not suppressed here; it is never evidence of unsafety.

use crate::analysis::predicate::{anded_with_check, ored_with_check, version_check_conditional};
use crate::analysis::{ApiLevel, GuardContext};
use crate::ast::{Ast, BinaryOp, NodeId, NodeKind};

/// Name treated as an unconditional failure call (Kotlin's `error(...)`).
const ERROR_CALL: &str = "error";

/// Is the call site inside a branch proven safe by an enclosing version
/// check?
pub fn is_within_version_check(
    ctx: &GuardContext<'_>,
    element: NodeId,
    required: ApiLevel,
) -> bool {
    let mut prev = element;
    let mut current = ctx.ast.parent(element);
    while let Some(node) = current {
        match ctx.ast.kind(node) {
            NodeKind::If { .. } => {
                if let Some(proven) = version_check_conditional(ctx, required, prev, node) {
                    return proven;
                }
            }
            NodeKind::Binary {
                op: BinaryOp::And | BinaryOp::Or,
                ..
            } => {
                if anded_with_check(ctx, node, required, Some(prev))
                    || ored_with_check(ctx, node, required, Some(prev))
                {
                    return true;
                }
            }
            NodeKind::Method { .. } | NodeKind::File(_) => return false,
            _ => {}
        }
        prev = node;
        current = ctx.ast.parent(node);
    }
    false
}

/// Does execution unconditionally leave this expression?
///
/// Only the final control path matters: for blocks, recurse into the last
/// statement. A terminal `return`, `throw`, or recognized fail call counts.
pub fn is_unconditional_exit(ast: &Ast, node: NodeId) -> bool {
    match ast.kind(node) {
        NodeKind::Block(children) => children
            .last()
            .is_some_and(|&last| is_unconditional_exit(ast, last)),
        NodeKind::Return(_) | NodeKind::Throw => true,
        NodeKind::Call { name, .. } => name == ERROR_CALL,
        _ => false,
    }
}

/// Is the call site preceded, in statement order within some enclosing
/// scope, by an `if` whose exiting branch proves the continuation safe?
///
/// The canonical shape is `if (SDK_INT < L) return;` before the call: the
/// code after the guard only runs when `SDK_INT >= L`, which proves the call
/// iff `L >= required`.
///
/// Only block-like scopes are scanned: children of other ancestors (the
/// arms of an `if`, operands of a binary) are not statements that precede
/// the call on its execution path.
pub fn is_preceded_by_version_exit(
    ctx: &GuardContext<'_>,
    element: NodeId,
    required: ApiLevel,
) -> bool {
    let mut end = element;
    let mut scope = ctx.ast.parent(element);
    while let Some(node) = scope {
        match ctx.ast.kind(node) {
            NodeKind::Method { .. } | NodeKind::File(_) => return false,
            NodeKind::Block(children) => {
                for &child in children {
                    if child == end {
                        break;
                    }
                    if is_exit_guard(ctx, child, required) {
                        return true;
                    }
                }
            }
            _ => {}
        }
        end = node;
        scope = ctx.ast.parent(node);
    }
    false
}

/// An `if` whose exiting branch guarantees the code after it runs only at
/// `required` or above.
fn is_exit_guard(ctx: &GuardContext<'_>, node: NodeId, required: ApiLevel) -> bool {
    let NodeKind::If {
        condition,
        then_branch,
        else_branch,
    } = ctx.ast.kind(node)
    else {
        return false;
    };
    let condition = *condition;
    if let Some(then_branch) = then_branch {
        if is_unconditional_exit(ctx.ast, *then_branch)
            && guards_continuation(ctx, condition, required, true)
        {
            return true;
        }
    }
    if let Some(else_branch) = else_branch {
        if is_unconditional_exit(ctx.ast, *else_branch)
            && guards_continuation(ctx, condition, required, false)
        {
            return true;
        }
    }
    false
}

/// After an exit taken from `exit_in_then`, does the condition prove the
/// continuation runs only at `required` or above?
///
/// A then-exit continues only when the condition is false, so the
/// OR-polarity table applies (`<`, `<=`, `!=`); an else-exit continues only
/// when it is true, so the AND-polarity table applies (`>=`, `>`, `==`).
fn guards_continuation(
    ctx: &GuardContext<'_>,
    condition: NodeId,
    required: ApiLevel,
    exit_in_then: bool,
) -> bool {
    if exit_in_then {
        ored_with_check(ctx, condition, required, None)
    } else {
        anded_with_check(ctx, condition, required, None)
    }
}
