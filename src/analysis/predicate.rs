//! Version predicate evaluation and guard composition
//!
//! A "version predicate" is a comparison between `SDK_INT` and a constant
//! level (`SDK_INT >= 21`, `SDK_INT < LOLLIPOP`, ...). Evaluating one against
//! a required level yields a tri-state answer: `Some(true)` the guarded
//! branch is proven safe, `Some(false)` proven insufficient, `None` the shape
//! was not recognized. `None` is never a negative proof.
//!
//! Composition over `&&`/`||` chains follows fixed per-operator polarity
//! tables: under `&&` the positive operators (`>=`, `>`, `==`) matter, under
//! `||` the negative ones (`<=`, `<`, `!=`). The tables are intentionally
//! asymmetric (`!=` under `||` requires an exact level match, `==` has no
//! negative-branch rule); do not extend them.

use crate::analysis::{ApiLevel, GuardContext};
use crate::ast::{Ast, BinaryOp, ComparisonOp, NodeId, NodeKind};
use crate::resolve::{is_sdk_int, SymbolResolver};

/// Constant API level denoted by a node: an integer literal or a symbolic
/// build code (`LOLLIPOP`). Anything else is `None`.
pub(crate) fn api_level_of(
    ast: &Ast,
    resolver: &dyn SymbolResolver,
    node: NodeId,
) -> Option<i64> {
    match ast.kind(node) {
        NodeKind::Literal(value) => *value,
        NodeKind::Reference(name) => {
            let resolved = resolver.resolve_name(name)?;
            resolver.api_by_build_code(resolved)
        }
        _ => None,
    }
}

/// Whether a node is a reference resolving to `SDK_INT`.
pub(crate) fn is_version_reference(
    ast: &Ast,
    resolver: &dyn SymbolResolver,
    node: NodeId,
) -> bool {
    match ast.kind(node) {
        NodeKind::Reference(name) => resolver
            .resolve_name(name)
            .map(is_sdk_int)
            .unwrap_or(false),
        _ => false,
    }
}

/// Evaluate a single `SDK_INT <op> level` comparison against `required`.
///
/// `from_then` is true when evaluating the branch taken when the comparison
/// holds.
pub fn eval_comparison(
    ctx: &GuardContext<'_>,
    op: ComparisonOp,
    left: NodeId,
    right: NodeId,
    required: ApiLevel,
    from_then: bool,
) -> Option<bool> {
    if !is_version_reference(ctx.ast, ctx.resolver, left) {
        return None;
    }
    let level = api_level_of(ctx.ast, ctx.resolver, right)?;
    let required = required.value();
    match op {
        // if (SDK_INT >= LOLLIPOP) { <call> } else { ... }
        ComparisonOp::Ge => Some(level >= required && from_then),
        // if (SDK_INT > LOLLIPOP) { <call> } else { ... }
        ComparisonOp::Gt => Some(level >= required - 1 && from_then),
        // if (SDK_INT <= LOLLIPOP) { ... } else { <call> }
        ComparisonOp::Le => Some(level >= required - 1 && !from_then),
        // if (SDK_INT < LOLLIPOP) { ... } else { <call> }
        ComparisonOp::Lt => Some(level >= required && !from_then),
        // if (SDK_INT == LOLLIPOP) { <call> }
        ComparisonOp::Eq => Some(level >= required && from_then),
        ComparisonOp::Ne => None,
    }
}

/// Search an `&&` chain for a version predicate that proves safety for an
/// anchor on the chain's true path.
///
/// The scan runs in evaluation order and stops at the anchor: a predicate
/// after the anchor has not executed yet and must not count.
pub fn anded_with_check(
    ctx: &GuardContext<'_>,
    element: NodeId,
    required: ApiLevel,
    anchor: Option<NodeId>,
) -> bool {
    let mut stopped = false;
    anded_walk(ctx, element, required, anchor, &mut stopped)
}

fn anded_walk(
    ctx: &GuardContext<'_>,
    node: NodeId,
    required: ApiLevel,
    anchor: Option<NodeId>,
    stopped: &mut bool,
) -> bool {
    if *stopped {
        return false;
    }
    if Some(node) == anchor {
        *stopped = true;
        return false;
    }
    let NodeKind::Binary { op, left, right } = ctx.ast.kind(node) else {
        return false;
    };
    match op {
        BinaryOp::And => {
            anded_walk(ctx, *left, required, anchor, stopped)
                || anded_walk(ctx, *right, required, anchor, stopped)
        }
        BinaryOp::Cmp(cmp) => {
            if !is_version_reference(ctx.ast, ctx.resolver, *left) {
                return false;
            }
            let Some(level) = api_level_of(ctx.ast, ctx.resolver, *right) else {
                return false;
            };
            let required = required.value();
            match cmp {
                // if (SDK_INT >= LOLLIPOP && <call>)
                ComparisonOp::Ge => level >= required,
                // if (SDK_INT > LOLLIPOP && <call>)
                ComparisonOp::Gt => level >= required - 1,
                // if (SDK_INT == LOLLIPOP && <call>)
                ComparisonOp::Eq => level >= required,
                _ => false,
            }
        }
        _ => false,
    }
}

/// Search an `||` chain for a version predicate whose *failure* proves the
/// rest of the chain safe. Polarities invert relative to [`anded_with_check`];
/// the same anchor cutoff applies.
pub fn ored_with_check(
    ctx: &GuardContext<'_>,
    element: NodeId,
    required: ApiLevel,
    anchor: Option<NodeId>,
) -> bool {
    let mut stopped = false;
    ored_walk(ctx, element, required, anchor, &mut stopped)
}

fn ored_walk(
    ctx: &GuardContext<'_>,
    node: NodeId,
    required: ApiLevel,
    anchor: Option<NodeId>,
    stopped: &mut bool,
) -> bool {
    if *stopped {
        return false;
    }
    if Some(node) == anchor {
        *stopped = true;
        return false;
    }
    let NodeKind::Binary { op, left, right } = ctx.ast.kind(node) else {
        return false;
    };
    match op {
        BinaryOp::Or => {
            ored_walk(ctx, *left, required, anchor, stopped)
                || ored_walk(ctx, *right, required, anchor, stopped)
        }
        BinaryOp::Cmp(cmp) => {
            if !is_version_reference(ctx.ast, ctx.resolver, *left) {
                return false;
            }
            let Some(level) = api_level_of(ctx.ast, ctx.resolver, *right) else {
                return false;
            };
            let required = required.value();
            match cmp {
                // if (SDK_INT <= LOLLIPOP || <call>)
                ComparisonOp::Le => level >= required - 1,
                // if (SDK_INT < LOLLIPOP || <call>)
                ComparisonOp::Lt => level >= required,
                // exact-level carve-out; intentionally not widened
                ComparisonOp::Ne => level == required,
                _ => false,
            }
        }
        _ => false,
    }
}

/// Evaluate a binary condition of an `if`.
///
/// `prev` is the branch (or condition child) reached on the upward walk;
/// `if_node` is `None` when evaluating an inlined helper-method body, in
/// which case the then-branch polarity applies.
pub fn binary_version_check(
    ctx: &GuardContext<'_>,
    required: ApiLevel,
    prev: Option<NodeId>,
    if_node: Option<NodeId>,
    binary: NodeId,
) -> Option<bool> {
    let NodeKind::Binary { op, left, right } = ctx.ast.kind(binary) else {
        return None;
    };
    let (then_branch, else_branch) = match if_node.map(|id| ctx.ast.kind(id)) {
        Some(NodeKind::If {
            then_branch,
            else_branch,
            ..
        }) => (*then_branch, *else_branch),
        _ => (None, None),
    };
    match op {
        BinaryOp::Cmp(cmp) => {
            let from_then = if_node.is_none() || (prev.is_some() && prev == then_branch);
            eval_comparison(ctx, *cmp, *left, *right, required, from_then)
        }
        BinaryOp::And if prev.is_some() && prev == then_branch => {
            if anded_with_check(ctx, binary, required, prev) {
                Some(true)
            } else {
                None
            }
        }
        BinaryOp::Or if prev.is_some() && prev == else_branch => {
            // if (SDK_INT < L1 || SDK_INT < L2) { ... } else { <call> }
            if ored_with_check(ctx, binary, required, None) {
                Some(true)
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Evaluate an `if`'s condition for the branch containing `prev`.
///
/// Also recognizes calls to trivial helper methods whose body is a single
/// `return SDK_INT <op> level`.
pub fn version_check_conditional(
    ctx: &GuardContext<'_>,
    required: ApiLevel,
    prev: NodeId,
    if_node: NodeId,
) -> Option<bool> {
    let NodeKind::If { condition, .. } = ctx.ast.kind(if_node) else {
        return None;
    };
    let condition = *condition;
    if condition == prev {
        return None;
    }
    match ctx.ast.kind(condition) {
        NodeKind::Binary { .. } => {
            binary_version_check(ctx, required, Some(prev), Some(if_node), condition)
        }
        NodeKind::Call { name, .. } => {
            let body = helper_method_return_value(ctx, name)?;
            if matches!(ctx.ast.kind(body), NodeKind::Binary { .. }) {
                binary_version_check(ctx, required, None, None, body)
            } else {
                None
            }
        }
        _ => None,
    }
}

/// The returned expression of a single-statement helper method body, if the
/// method exists in this unit.
fn helper_method_return_value(ctx: &GuardContext<'_>, name: &str) -> Option<NodeId> {
    let method = *ctx.methods.get(name)?;
    let NodeKind::Method { body, .. } = ctx.ast.kind(method) else {
        return None;
    };
    let body = (*body)?;
    let statement = match ctx.ast.kind(body) {
        NodeKind::Block(children) if children.len() == 1 => children[0],
        NodeKind::Block(_) => return None,
        _ => body,
    };
    match ctx.ast.kind(statement) {
        NodeKind::Return(value) => *value,
        // Kotlin expression bodies lower without an explicit return
        NodeKind::Binary { .. } => Some(statement),
        _ => None,
    }
}
