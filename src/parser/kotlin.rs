//! Kotlin front-end
//!
//! tree-sitter-kotlin differs from the Java grammar in a few ways that
//! matter here: comparisons and boolean chains get dedicated node kinds
//! (`comparison_expression`, `conjunction_expression`, ...), operators are
//! anonymous tokens rather than fields, `return`/`throw` share a single
//! `jump_expression` kind, and function bodies may be expressions
//! (`fun ok() = SDK_INT >= 23`). Field lookups fall back to positional
//! scans since not every node carries them.

use crate::ast::{Ast, BinaryOp, Location, NodeId, NodeKind};
use crate::parser::common::{finish_unit, parse_int_literal, ParseError, ParsedUnit, Parser};
use std::path::Path;
use tree_sitter::Node;

pub struct KotlinParser;

impl KotlinParser {
    pub fn new() -> Self {
        Self
    }
}

impl Default for KotlinParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser for KotlinParser {
    fn parse_source(&self, path: &Path, source: &str) -> Result<ParsedUnit, ParseError> {
        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&tree_sitter_kotlin::language())
            .map_err(|e| ParseError::Grammar(e.to_string()))?;
        let tree = parser.parse(source, None).ok_or_else(|| ParseError::Unparseable {
            path: path.to_path_buf(),
        })?;

        let mut lowerer = Lowerer {
            source: source.as_bytes(),
            path,
            ast: Ast::new(),
        };
        lowerer.lower(tree.root_node());
        Ok(finish_unit(path, lowerer.ast, source))
    }
}

struct Lowerer<'a> {
    source: &'a [u8],
    path: &'a Path,
    ast: Ast,
}

impl<'a> Lowerer<'a> {
    fn text(&self, node: Node<'_>) -> &str {
        node.utf8_text(self.source).unwrap_or("")
    }

    fn location(&self, node: Node<'_>) -> Location {
        Location::new(
            self.path.to_path_buf(),
            node.start_position().row + 1,
            node.start_position().column + 1,
            node.start_byte(),
            node.end_byte(),
        )
    }

    fn named_children(&self, node: Node<'a>) -> Vec<Node<'a>> {
        let mut cursor = node.walk();
        node.named_children(&mut cursor).collect()
    }

    fn lower_children(&mut self, node: Node<'a>) -> Vec<NodeId> {
        self.named_children(node)
            .into_iter()
            .map(|child| self.lower(child))
            .collect()
    }

    fn find_child(&self, node: Node<'a>, kind: &str) -> Option<Node<'a>> {
        self.named_children(node)
            .into_iter()
            .find(|child| child.kind() == kind)
    }

    /// The anonymous operator token of a comparison or equality expression.
    fn operator_token(&self, node: Node<'a>) -> Option<BinaryOp> {
        for i in 0..node.child_count() {
            let child = node.child(i)?;
            if !child.is_named() {
                let op = BinaryOp::from_token(self.text(child));
                if op != BinaryOp::Other {
                    return Some(op);
                }
            }
        }
        None
    }

    fn lower(&mut self, node: Node<'a>) -> NodeId {
        let location = self.location(node);
        match node.kind() {
            "source_file" => {
                let children = self.lower_children(node);
                self.ast.push(NodeKind::File(children), location)
            }
            "function_declaration" => {
                let name = node
                    .child_by_field_name("name")
                    .or_else(|| self.find_child(node, "simple_identifier"))
                    .map(|n| self.text(n).to_string())
                    .unwrap_or_default();
                let body = self
                    .find_child(node, "function_body")
                    .and_then(|body| self.lower_function_body(body));
                self.ast.push(NodeKind::Method { name, body }, location)
            }
            "block" | "statements" => {
                let children = self.lower_children(node);
                self.ast.push(NodeKind::Block(children), location)
            }
            "control_structure_body" => {
                let children = self.named_children(node);
                match children.as_slice() {
                    [only] => self.lower(*only),
                    _ => {
                        let children = self.lower_children(node);
                        self.ast.push(NodeKind::Block(children), location)
                    }
                }
            }
            "if_expression" => {
                let children = self.named_children(node);
                let condition = node
                    .child_by_field_name("condition")
                    .or_else(|| children.first().copied());
                match condition {
                    Some(condition) => {
                        let condition = self.lower(condition);
                        let then_branch = node
                            .child_by_field_name("consequence")
                            .or_else(|| children.get(1).copied())
                            .map(|n| self.lower(n));
                        let else_branch = node
                            .child_by_field_name("alternative")
                            .or_else(|| children.get(2).copied())
                            .map(|n| self.lower(n));
                        self.ast.push(
                            NodeKind::If {
                                condition,
                                then_branch,
                                else_branch,
                            },
                            location,
                        )
                    }
                    None => self.ast.push(NodeKind::Other(Vec::new()), location),
                }
            }
            "comparison_expression" | "equality_expression" => {
                let children = self.named_children(node);
                let op = self.operator_token(node);
                match (children.first(), children.last(), op) {
                    (Some(&left), Some(&right), Some(op)) if children.len() == 2 => {
                        let left = self.lower(left);
                        let right = self.lower(right);
                        self.ast
                            .push(NodeKind::Binary { op, left, right }, location)
                    }
                    _ => {
                        let children = self.lower_children(node);
                        self.ast.push(NodeKind::Other(children), location)
                    }
                }
            }
            "conjunction_expression" | "disjunction_expression" => {
                let op = if node.kind() == "conjunction_expression" {
                    BinaryOp::And
                } else {
                    BinaryOp::Or
                };
                let children = self.named_children(node);
                match children.as_slice() {
                    [left, right] => {
                        let left = self.lower(*left);
                        let right = self.lower(*right);
                        self.ast
                            .push(NodeKind::Binary { op, left, right }, location)
                    }
                    _ => {
                        let children = self.lower_children(node);
                        self.ast.push(NodeKind::Other(children), location)
                    }
                }
            }
            "parenthesized_expression" => {
                match self.named_children(node).first().copied() {
                    Some(inner) => self.lower(inner),
                    None => self.ast.push(NodeKind::Other(Vec::new()), location),
                }
            }
            "call_expression" => self.lower_call(node, location),
            "navigation_expression" => {
                let name = self.text(node).to_string();
                self.ast.push(NodeKind::Reference(name), location)
            }
            "simple_identifier" => {
                let name = self.text(node).to_string();
                self.ast.push(NodeKind::Reference(name), location)
            }
            "integer_literal" | "hex_literal" => {
                let value = parse_int_literal(self.text(node));
                self.ast.push(NodeKind::Literal(value), location)
            }
            "jump_expression" => {
                let text = self.text(node);
                if text.starts_with("throw") {
                    self.ast.push(NodeKind::Throw, location)
                } else if text.starts_with("return") {
                    let value = self
                        .named_children(node)
                        .first()
                        .copied()
                        .map(|child| self.lower(child));
                    self.ast.push(NodeKind::Return(value), location)
                } else {
                    let children = self.lower_children(node);
                    self.ast.push(NodeKind::Other(children), location)
                }
            }
            _ => {
                let children = self.lower_children(node);
                self.ast.push(NodeKind::Other(children), location)
            }
        }
    }

    /// Kotlin function bodies are either a block or `= expression`.
    fn lower_function_body(&mut self, body: Node<'a>) -> Option<NodeId> {
        let inner = self.named_children(body).first().copied()?;
        Some(self.lower(inner))
    }

    fn lower_call(&mut self, node: Node<'a>, location: Location) -> NodeId {
        let children = self.named_children(node);
        let callee = children.first().copied();
        let (name, receiver) = match callee {
            Some(callee) if callee.kind() == "simple_identifier" => {
                (self.text(callee).to_string(), None)
            }
            Some(callee) if callee.kind() == "navigation_expression" => {
                let text = self.text(callee);
                let name = text.rsplit('.').next().unwrap_or(text).trim().to_string();
                // Lower the receiver so calls nested in it stay visible
                (name, self.named_children(callee).first().copied())
            }
            _ => (String::new(), callee),
        };
        let mut args = Vec::new();
        if let Some(receiver) = receiver {
            args.push(self.lower(receiver));
        }
        if let Some(suffix) = self.find_child(node, "call_suffix") {
            if let Some(value_args) = self.find_child(suffix, "value_arguments") {
                for argument in self.named_children(value_args) {
                    match self.named_children(argument).first().copied() {
                        Some(inner) => args.push(self.lower(inner)),
                        None => args.push(self.lower(argument)),
                    }
                }
            }
        }
        self.ast.push(NodeKind::Call { name, args }, location)
    }
}
