//! Java front-end
//!
//! Lowers the tree-sitter-java parse tree into the closed guard-analysis
//! model. Anything without a dedicated shape becomes [`NodeKind::Other`] with
//! its named children preserved, so upward and downward walks still work.

use crate::ast::{Ast, BinaryOp, Location, NodeId, NodeKind};
use crate::parser::common::{finish_unit, parse_int_literal, ParseError, ParsedUnit, Parser};
use std::path::Path;
use tree_sitter::Node;

pub struct JavaParser;

impl JavaParser {
    pub fn new() -> Self {
        Self
    }
}

impl Default for JavaParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser for JavaParser {
    fn parse_source(&self, path: &Path, source: &str) -> Result<ParsedUnit, ParseError> {
        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&tree_sitter_java::language())
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

    fn lower_children(&mut self, node: Node<'_>) -> Vec<NodeId> {
        let mut cursor = node.walk();
        let children: Vec<Node<'_>> = node.named_children(&mut cursor).collect();
        children.into_iter().map(|child| self.lower(child)).collect()
    }

    fn lower_field(&mut self, node: Node<'_>, field: &str) -> Option<NodeId> {
        node.child_by_field_name(field).map(|child| self.lower(child))
    }

    fn lower(&mut self, node: Node<'_>) -> NodeId {
        let location = self.location(node);
        match node.kind() {
            "program" => {
                let children = self.lower_children(node);
                self.ast.push(NodeKind::File(children), location)
            }
            "method_declaration" | "constructor_declaration" => {
                let name = node
                    .child_by_field_name("name")
                    .map(|n| self.text(n).to_string())
                    .unwrap_or_default();
                let body = self.lower_field(node, "body");
                self.ast.push(NodeKind::Method { name, body }, location)
            }
            "block" => {
                let children = self.lower_children(node);
                self.ast.push(NodeKind::Block(children), location)
            }
            "if_statement" => match node.child_by_field_name("condition") {
                Some(condition) => {
                    let condition = self.lower(condition);
                    let then_branch = self.lower_field(node, "consequence");
                    let else_branch = self.lower_field(node, "alternative");
                    self.ast.push(
                        NodeKind::If {
                            condition,
                            then_branch,
                            else_branch,
                        },
                        location,
                    )
                }
                None => {
                    let children = self.lower_children(node);
                    self.ast.push(NodeKind::Other(children), location)
                }
            },
            // Transparent wrappers
            "parenthesized_expression" | "expression_statement" => {
                let mut cursor = node.walk();
                let inner = node.named_children(&mut cursor).next();
                match inner {
                    Some(inner) => self.lower(inner),
                    None => self.ast.push(NodeKind::Other(Vec::new()), location),
                }
            }
            "binary_expression" => {
                let fields = (
                    node.child_by_field_name("left"),
                    node.child_by_field_name("operator"),
                    node.child_by_field_name("right"),
                );
                match fields {
                    (Some(left), Some(operator), Some(right)) => {
                        let op = BinaryOp::from_token(self.text(operator));
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
            "method_invocation" => {
                let name = node
                    .child_by_field_name("name")
                    .map(|n| self.text(n).to_string())
                    .unwrap_or_default();
                // Receiver lowered with the arguments so nested calls stay
                // visible to traversals
                let mut args = Vec::new();
                if let Some(object) = node.child_by_field_name("object") {
                    args.push(self.lower(object));
                }
                if let Some(arguments) = node.child_by_field_name("arguments") {
                    args.extend(self.lower_children(arguments));
                }
                self.ast.push(NodeKind::Call { name, args }, location)
            }
            "field_access" | "identifier" | "scoped_identifier" => {
                let name = self.text(node).to_string();
                self.ast.push(NodeKind::Reference(name), location)
            }
            "decimal_integer_literal" | "hex_integer_literal" => {
                let value = parse_int_literal(self.text(node));
                self.ast.push(NodeKind::Literal(value), location)
            }
            "return_statement" => {
                let mut cursor = node.walk();
                let value = node
                    .named_children(&mut cursor)
                    .next()
                    .map(|child| self.lower(child));
                self.ast.push(NodeKind::Return(value), location)
            }
            "throw_statement" => self.ast.push(NodeKind::Throw, location),
            _ => {
                let children = self.lower_children(node);
                self.ast.push(NodeKind::Other(children), location)
            }
        }
    }
}
