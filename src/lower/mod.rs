//! Lowers a method AST into the bytecode-shaped instruction stream
//!
//! Follows the shape javac gives compiled guards: the comparison is inverted
//! and the branch is taken when the source check fails, e.g.
//!
//! ```text
//! if (SDK_INT >= 21) { newApi(); }
//!   0 LoadVersion
//!   1 PushConst 21
//!   2 CompareBranch Lt -> 4
//!   3 Call newApi
//!   4 ...
//! ```
//!
//! `&&`/`||` conditions lower with short-circuit branches so each version
//! predicate keeps its own `LoadVersion; PushConst; CompareBranch` triple.

use crate::analysis::predicate::{api_level_of, is_version_reference};
use crate::ast::{Ast, BinaryOp, ComparisonOp, NodeId, NodeKind};
use crate::cfg::{Instr, Routine};
use crate::resolve::SymbolResolver;
use std::collections::HashMap;

/// A lowered routine plus the instruction index of each source call site.
#[derive(Debug)]
pub struct LoweredRoutine {
    pub routine: Routine,
    pub call_indices: HashMap<NodeId, usize>,
}

/// Lower a method body. Returns `None` for bodiless methods.
pub fn lower_method(
    ast: &Ast,
    resolver: &dyn SymbolResolver,
    method: NodeId,
) -> Option<LoweredRoutine> {
    let NodeKind::Method { name, body } = ast.kind(method) else {
        return None;
    };
    let body = (*body)?;
    let mut lowerer = Lowerer {
        ast,
        resolver,
        instrs: Vec::new(),
        call_indices: HashMap::new(),
        labels: Vec::new(),
        fixups: Vec::new(),
    };
    lowerer.lower_node(body);
    lowerer.emit(Instr::Return);
    let routine = lowerer.finish(name.clone());
    Some(LoweredRoutine {
        routine: routine.0,
        call_indices: routine.1,
    })
}

/// Label id, patched to an instruction index at the end.
#[derive(Debug, Clone, Copy)]
struct Label(usize);

struct Lowerer<'a> {
    ast: &'a Ast,
    resolver: &'a dyn SymbolResolver,
    instrs: Vec<Instr>,
    call_indices: HashMap<NodeId, usize>,
    labels: Vec<Option<usize>>,
    fixups: Vec<(usize, Label)>,
}

impl<'a> Lowerer<'a> {
    fn emit(&mut self, instr: Instr) -> usize {
        self.instrs.push(instr);
        self.instrs.len() - 1
    }

    fn new_label(&mut self) -> Label {
        self.labels.push(None);
        Label(self.labels.len() - 1)
    }

    fn bind(&mut self, label: Label) {
        self.labels[label.0] = Some(self.instrs.len());
    }

    fn emit_branch(&mut self, op: ComparisonOp, label: Label) {
        let index = self.emit(Instr::CompareBranch { op, target: 0 });
        self.fixups.push((index, label));
    }

    fn emit_jump(&mut self, label: Label) {
        let index = self.emit(Instr::Jump { target: 0 });
        self.fixups.push((index, label));
    }

    fn finish(mut self, name: String) -> (Routine, HashMap<NodeId, usize>) {
        // labels bound past the last instruction resolve to the trailing Return
        let last = self.instrs.len().saturating_sub(1);
        for (index, label) in self.fixups {
            let target = self.labels[label.0].unwrap_or(last).min(last);
            match &mut self.instrs[index] {
                Instr::CompareBranch { target: t, .. } | Instr::Jump { target: t } => *t = target,
                _ => {}
            }
        }
        (Routine::new(name, self.instrs), self.call_indices)
    }

    fn lower_node(&mut self, node: NodeId) {
        match self.ast.kind(node) {
            NodeKind::Block(children) | NodeKind::File(children) | NodeKind::Other(children) => {
                for &child in children {
                    self.lower_node(child);
                }
            }
            NodeKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let (condition, then_branch, else_branch) =
                    (*condition, *then_branch, *else_branch);
                let else_label = self.new_label();
                self.branch_if_false(condition, else_label);
                if let Some(then_branch) = then_branch {
                    self.lower_node(then_branch);
                }
                match else_branch {
                    Some(else_branch) => {
                        let end_label = self.new_label();
                        self.emit_jump(end_label);
                        self.bind(else_label);
                        self.lower_node(else_branch);
                        self.bind(end_label);
                    }
                    None => self.bind(else_label),
                }
            }
            NodeKind::Return(value) => {
                if let Some(value) = *value {
                    self.lower_node(value);
                }
                self.emit(Instr::Return);
            }
            NodeKind::Throw => {
                self.emit(Instr::Return);
            }
            NodeKind::Call { name, args } => {
                let (name, args) = (name.clone(), args.clone());
                for arg in args {
                    self.lower_node(arg);
                }
                let index = self.emit(Instr::Call { name });
                self.call_indices.insert(node, index);
            }
            NodeKind::Binary { left, right, .. } => {
                let (left, right) = (*left, *right);
                self.lower_node(left);
                self.lower_node(right);
            }
            NodeKind::Method { .. } => {
                // nested declarations are separate routines
            }
            NodeKind::Literal(_) | NodeKind::Reference(_) => {}
        }
    }

    /// Branch to `target` when the condition is false.
    fn branch_if_false(&mut self, condition: NodeId, target: Label) {
        match self.ast.kind(condition) {
            NodeKind::Binary {
                op: BinaryOp::And,
                left,
                right,
            } => {
                let (left, right) = (*left, *right);
                self.branch_if_false(left, target);
                self.branch_if_false(right, target);
            }
            NodeKind::Binary {
                op: BinaryOp::Or,
                left,
                right,
            } => {
                let (left, right) = (*left, *right);
                let true_label = self.new_label();
                self.branch_if_true(left, true_label);
                self.branch_if_false(right, target);
                self.bind(true_label);
            }
            NodeKind::Binary {
                op: BinaryOp::Cmp(cmp),
                left,
                right,
            } => {
                let (cmp, left, right) = (*cmp, *left, *right);
                match self.version_operands(left, right) {
                    Some(level) => {
                        self.emit(Instr::LoadVersion);
                        self.emit(Instr::PushConst(level));
                        self.emit_branch(invert(cmp), target);
                    }
                    None => self.opaque_branch(condition, target),
                }
            }
            _ => self.opaque_branch(condition, target),
        }
    }

    /// Branch to `target` when the condition is true.
    fn branch_if_true(&mut self, condition: NodeId, target: Label) {
        match self.ast.kind(condition) {
            NodeKind::Binary {
                op: BinaryOp::Or,
                left,
                right,
            } => {
                let (left, right) = (*left, *right);
                self.branch_if_true(left, target);
                self.branch_if_true(right, target);
            }
            NodeKind::Binary {
                op: BinaryOp::And,
                left,
                right,
            } => {
                let (left, right) = (*left, *right);
                let false_label = self.new_label();
                self.branch_if_false(left, false_label);
                self.branch_if_true(right, target);
                self.bind(false_label);
            }
            NodeKind::Binary {
                op: BinaryOp::Cmp(cmp),
                left,
                right,
            } => {
                let (cmp, left, right) = (*cmp, *left, *right);
                match self.version_operands(left, right) {
                    Some(level) => {
                        self.emit(Instr::LoadVersion);
                        self.emit(Instr::PushConst(level));
                        self.emit_branch(cmp, target);
                    }
                    None => self.opaque_branch(condition, target),
                }
            }
            _ => self.opaque_branch(condition, target),
        }
    }

    /// Unrecognized condition: evaluate for side effects, then branch both
    /// ways. The preceding `Other` keeps the branch out of the version-check
    /// pattern so no edge is ever pruned.
    fn opaque_branch(&mut self, condition: NodeId, target: Label) {
        self.lower_node(condition);
        self.emit(Instr::Other);
        self.emit_branch(ComparisonOp::Eq, target);
    }

    /// `SDK_INT <cmp> constant-level` operands, if this comparison is one.
    fn version_operands(&self, left: NodeId, right: NodeId) -> Option<i64> {
        if !is_version_reference(self.ast, self.resolver, left) {
            return None;
        }
        api_level_of(self.ast, self.resolver, right)
    }
}

fn invert(op: ComparisonOp) -> ComparisonOp {
    match op {
        ComparisonOp::Ge => ComparisonOp::Lt,
        ComparisonOp::Gt => ComparisonOp::Le,
        ComparisonOp::Lt => ComparisonOp::Ge,
        ComparisonOp::Le => ComparisonOp::Gt,
        ComparisonOp::Eq => ComparisonOp::Ne,
        ComparisonOp::Ne => ComparisonOp::Eq,
    }
}
