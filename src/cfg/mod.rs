//! Control-flow graph over a lowered instruction stream
//!
//! Instructions are bytecode-shaped: a version check appears as the triple
//! `LoadVersion; PushConst(level); CompareBranch(op, target)`, with the
//! comparison inverted relative to source (the branch is taken when the
//! source check fails, mirroring how javac compiles guards).
//!
//! The graph is rebuilt per routine and owned by one analysis pass. Edge
//! inclusion is a strategy hook ([`EdgePolicy`]): the version-check pruning
//! policy drops exactly those edges whose traversal already implies the
//! required level is met.

use crate::analysis::ApiLevel;
use crate::ast::ComparisonOp;
use petgraph::algo::has_path_connecting;
use petgraph::graph::{DiGraph, NodeIndex};
use thiserror::Error;

/// One lowered instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instr {
    /// Push the platform version (`SDK_INT` field read)
    LoadVersion,
    /// Push an integer constant
    PushConst(i64),
    /// Compare the two pushed values and branch to `target` when true
    CompareBranch { op: ComparisonOp, target: usize },
    /// Unconditional jump
    Jump { target: usize },
    /// Call instruction; the analysis target
    Call { name: String },
    /// Leaves the routine (return or throw)
    Return,
    /// Anything else; single fallthrough successor
    Other,
}

/// A routine's instruction stream.
#[derive(Debug, Clone, Default)]
pub struct Routine {
    pub name: String,
    pub instrs: Vec<Instr>,
}

impl Routine {
    pub fn new(name: impl Into<String>, instrs: Vec<Instr>) -> Self {
        Self {
            name: name.into(),
            instrs,
        }
    }
}

/// Whether an edge leaves a branch by jumping or by falling through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    Fallthrough,
    Branch,
}

/// Strategy hook deciding which conditional-branch edges enter the graph.
pub trait EdgePolicy {
    fn include(&self, routine: &Routine, from: usize, kind: EdgeKind) -> bool;
}

/// Keeps every edge.
pub struct IncludeAll;

impl EdgePolicy for IncludeAll {
    fn include(&self, _routine: &Routine, _from: usize, _kind: EdgeKind) -> bool {
        true
    }
}

/// Excludes branch edges already satisfied by a version check at `required`.
///
/// The per-opcode table is taken as-is from the bytecode semantics of
/// compiled `SDK_INT` guards; `Eq` is deliberately absent (never pruned).
pub struct VersionCheckPrune {
    required: ApiLevel,
}

impl VersionCheckPrune {
    pub fn new(required: ApiLevel) -> Self {
        Self { required }
    }
}

impl EdgePolicy for VersionCheckPrune {
    fn include(&self, routine: &Routine, from: usize, kind: EdgeKind) -> bool {
        let Instr::CompareBranch { op, .. } = &routine.instrs[from] else {
            return true;
        };
        if from < 2 {
            return true;
        }
        let Instr::PushConst(level) = routine.instrs[from - 1] else {
            return true;
        };
        if routine.instrs[from - 2] != Instr::LoadVersion {
            return true;
        }
        let required = self.required.value();
        let jump = kind == EdgeKind::Branch;
        match op {
            ComparisonOp::Ne => level < required || jump,
            ComparisonOp::Le => level < required - 1 || jump,
            ComparisonOp::Lt => level < required || jump,
            ComparisonOp::Ge => level < required || !jump,
            ComparisonOp::Gt => level < required - 1 || !jump,
            // no pruning rule for ==
            ComparisonOp::Eq => true,
        }
    }
}

#[derive(Debug, Error)]
pub enum CfgError {
    #[error("branch target {target} out of bounds in '{routine}' ({len} instructions)")]
    BadTarget {
        routine: String,
        target: usize,
        len: usize,
    },
    #[error("routine '{routine}' has no instructions")]
    Empty { routine: String },
}

/// Adjacency-list CFG over a routine's instructions.
pub struct ControlFlowGraph {
    graph: DiGraph<usize, EdgeKind>,
    nodes: Vec<NodeIndex>,
}

impl ControlFlowGraph {
    /// Build the graph, consulting `policy` for each conditional-branch
    /// edge. Unconditional jumps and plain fallthroughs are always kept.
    pub fn build(routine: &Routine, policy: &dyn EdgePolicy) -> Result<Self, CfgError> {
        let len = routine.instrs.len();
        if len == 0 {
            return Err(CfgError::Empty {
                routine: routine.name.clone(),
            });
        }
        let check_target = |target: usize| {
            if target >= len {
                Err(CfgError::BadTarget {
                    routine: routine.name.clone(),
                    target,
                    len,
                })
            } else {
                Ok(())
            }
        };

        let mut graph = DiGraph::new();
        let nodes: Vec<NodeIndex> = (0..len).map(|i| graph.add_node(i)).collect();

        for (i, instr) in routine.instrs.iter().enumerate() {
            match instr {
                Instr::CompareBranch { target, .. } => {
                    check_target(*target)?;
                    if i + 1 < len && policy.include(routine, i, EdgeKind::Fallthrough) {
                        graph.add_edge(nodes[i], nodes[i + 1], EdgeKind::Fallthrough);
                    }
                    if policy.include(routine, i, EdgeKind::Branch) {
                        graph.add_edge(nodes[i], nodes[*target], EdgeKind::Branch);
                    }
                }
                Instr::Jump { target } => {
                    check_target(*target)?;
                    graph.add_edge(nodes[i], nodes[*target], EdgeKind::Branch);
                }
                Instr::Return => {}
                _ => {
                    if i + 1 < len {
                        graph.add_edge(nodes[i], nodes[i + 1], EdgeKind::Fallthrough);
                    }
                }
            }
        }

        Ok(Self { graph, nodes })
    }

    /// Is instruction `to` reachable from instruction `from` over included
    /// edges?
    pub fn is_reachable(&self, from: usize, to: usize) -> bool {
        has_path_connecting(&self.graph, self.nodes[from], self.nodes[to], None)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}

/// Cheap pre-scan for the `LoadVersion; PushConst; CompareBranch` triple,
/// done before paying for graph construction.
pub fn contains_version_check(routine: &Routine) -> bool {
    routine.instrs.windows(3).any(|w| {
        matches!(
            w,
            [
                Instr::LoadVersion,
                Instr::PushConst(_),
                Instr::CompareBranch { .. }
            ]
        )
    })
}
