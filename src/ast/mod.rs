//! Arena-based AST for guard analysis
//!
//! This is a deliberately closed model: only the node shapes the guard
//! analysis inspects get their own variant. Everything else a parser
//! encounters lowers to [`NodeKind::Other`], which the analysis treats as
//! "not a recognized pattern" rather than an error.
//!
//! Ownership flows downward (a parent owns its child ids); parent links are
//! plain indices computed after construction and are only used for upward
//! walks.

use std::path::PathBuf;

/// Index of a node inside an [`Ast`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Comparison operators between `SDK_INT` and a version level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    Gt,
    Ge,
    Lt,
    Le,
    Eq,
    Ne,
}

/// Binary operators the analysis distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Cmp(ComparisonOp),
    And,
    Or,
    /// Arithmetic, bitwise, etc. - never part of a guard
    Other,
}

impl BinaryOp {
    /// Parse a source-level operator token (`">="`, `"&&"`, ...)
    pub fn from_token(token: &str) -> Self {
        match token {
            ">" => BinaryOp::Cmp(ComparisonOp::Gt),
            ">=" => BinaryOp::Cmp(ComparisonOp::Ge),
            "<" => BinaryOp::Cmp(ComparisonOp::Lt),
            "<=" => BinaryOp::Cmp(ComparisonOp::Le),
            "==" | "===" => BinaryOp::Cmp(ComparisonOp::Eq),
            "!=" | "!==" => BinaryOp::Cmp(ComparisonOp::Ne),
            "&&" => BinaryOp::And,
            "||" => BinaryOp::Or,
            _ => BinaryOp::Other,
        }
    }
}

/// The closed set of node shapes the guard analysis understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    If {
        condition: NodeId,
        then_branch: Option<NodeId>,
        else_branch: Option<NodeId>,
    },
    Binary {
        op: BinaryOp,
        left: NodeId,
        right: NodeId,
    },
    /// Integer literal; `None` for non-integer literals
    Literal(Option<i64>),
    /// Reference with its (textual) resolved name, e.g. `SDK_INT` or
    /// `Build.VERSION_CODES.LOLLIPOP`
    Reference(String),
    Block(Vec<NodeId>),
    Return(Option<NodeId>),
    Throw,
    Call {
        name: String,
        args: Vec<NodeId>,
    },
    Method {
        name: String,
        body: Option<NodeId>,
    },
    File(Vec<NodeId>),
    /// Catch-all: structure is preserved so walks still see descendants,
    /// but the analysis never draws conclusions from it
    Other(Vec<NodeId>),
}

/// Source location of a node.
#[derive(Debug, Clone, PartialEq, Eq, Default, serde::Serialize)]
pub struct Location {
    pub file: PathBuf,
    /// 1-based line
    pub line: usize,
    /// 1-based column
    pub column: usize,
    pub start_byte: usize,
    pub end_byte: usize,
}

impl Location {
    pub fn new(file: PathBuf, line: usize, column: usize, start_byte: usize, end_byte: usize) -> Self {
        Self {
            file,
            line,
            column,
            start_byte,
            end_byte,
        }
    }
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    location: Location,
}

/// Arena holding one compilation unit's nodes.
///
/// Built bottom-up by the parsers; call [`Ast::resolve_parents`] once after
/// construction so upward walks work.
#[derive(Debug, Clone, Default)]
pub struct Ast {
    nodes: Vec<Node>,
}

impl Ast {
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Append a node; children must already exist in the arena.
    pub fn push(&mut self, kind: NodeKind, location: Location) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            kind,
            parent: None,
            location,
        });
        id
    }

    /// Append a node without location info (used by tests and synthetic trees).
    pub fn push_synthetic(&mut self, kind: NodeKind) -> NodeId {
        self.push(kind, Location::default())
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.index()].kind
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].parent
    }

    pub fn location(&self, id: NodeId) -> &Location {
        &self.nodes[id.index()].location
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len() as u32).map(NodeId)
    }

    /// Child ids of a node, in source order.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        match self.kind(id) {
            NodeKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let mut out = vec![*condition];
                out.extend(then_branch.iter().copied());
                out.extend(else_branch.iter().copied());
                out
            }
            NodeKind::Binary { left, right, .. } => vec![*left, *right],
            NodeKind::Return(value) => value.iter().copied().collect(),
            NodeKind::Block(children) | NodeKind::File(children) | NodeKind::Other(children) => {
                children.clone()
            }
            NodeKind::Call { args, .. } => args.clone(),
            NodeKind::Method { body, .. } => body.iter().copied().collect(),
            NodeKind::Literal(_) | NodeKind::Reference(_) | NodeKind::Throw => Vec::new(),
        }
    }

    /// Fill in parent links from the ownership structure.
    pub fn resolve_parents(&mut self) {
        let ids: Vec<NodeId> = self.ids().collect();
        for id in ids {
            for child in self.children(id) {
                self.nodes[child.index()].parent = Some(id);
            }
        }
    }

    /// Nearest enclosing method of a node, if any.
    pub fn enclosing_method(&self, mut id: NodeId) -> Option<NodeId> {
        while let Some(parent) = self.parent(id) {
            if matches!(self.kind(parent), NodeKind::Method { .. }) {
                return Some(parent);
            }
            id = parent;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_op_tokens() {
        assert_eq!(BinaryOp::from_token(">="), BinaryOp::Cmp(ComparisonOp::Ge));
        assert_eq!(BinaryOp::from_token("&&"), BinaryOp::And);
        assert_eq!(BinaryOp::from_token("||"), BinaryOp::Or);
        assert_eq!(BinaryOp::from_token("+"), BinaryOp::Other);
        assert_eq!(BinaryOp::from_token("==="), BinaryOp::Cmp(ComparisonOp::Eq));
    }

    #[test]
    fn test_parent_resolution() {
        let mut ast = Ast::new();
        let lit = ast.push_synthetic(NodeKind::Literal(Some(21)));
        let sdk = ast.push_synthetic(NodeKind::Reference("SDK_INT".to_string()));
        let cmp = ast.push_synthetic(NodeKind::Binary {
            op: BinaryOp::Cmp(ComparisonOp::Ge),
            left: sdk,
            right: lit,
        });
        let call = ast.push_synthetic(NodeKind::Call {
            name: "doThing".to_string(),
            args: vec![],
        });
        let then_block = ast.push_synthetic(NodeKind::Block(vec![call]));
        let if_node = ast.push_synthetic(NodeKind::If {
            condition: cmp,
            then_branch: Some(then_block),
            else_branch: None,
        });
        ast.resolve_parents();

        assert_eq!(ast.parent(call), Some(then_block));
        assert_eq!(ast.parent(then_block), Some(if_node));
        assert_eq!(ast.parent(cmp), Some(if_node));
        assert_eq!(ast.parent(sdk), Some(cmp));
        assert_eq!(ast.parent(if_node), None);
    }

    #[test]
    fn test_enclosing_method() {
        let mut ast = Ast::new();
        let call = ast.push_synthetic(NodeKind::Call {
            name: "x".to_string(),
            args: vec![],
        });
        let body = ast.push_synthetic(NodeKind::Block(vec![call]));
        let method = ast.push_synthetic(NodeKind::Method {
            name: "m".to_string(),
            body: Some(body),
        });
        ast.resolve_parents();

        assert_eq!(ast.enclosing_method(call), Some(method));
        assert_eq!(ast.enclosing_method(method), None);
    }
}
