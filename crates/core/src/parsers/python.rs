//! Python parser for docstring extraction
//!
//! Walks the Tree-sitter syntax tree of a Python module and collects the
//! units a developer manual documents: the module itself, plain top-level
//! functions, top-level classes and the plain methods defined directly in
//! their bodies.

use crate::models::{Language, ModuleOutline, OutlineUnit, UnitKind};
use crate::parsers::docstring::{check_literal, clean_docstring, decode_string_literal};
use crate::parsers::{DocParser, ParserError};
use tree_sitter::{Node, Parser, Tree};

/// Python parser implementation
pub struct PythonParser {
    parser: Parser,
}

impl PythonParser {
    /// Create a new Python parser
    pub fn new() -> Result<Self, ParserError> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .map_err(|e| ParserError::InitError(e.to_string()))?;
        Ok(Self { parser })
    }

    /// Parse source code into a tree
    fn parse_tree(&mut self, source: &str) -> Result<Tree, ParserError> {
        self.parser
            .parse(source, None)
            .ok_or_else(|| ParserError::ParseError("Failed to parse source".to_string()))
    }

    /// Build a unit for a function or class definition node
    fn build_unit(&self, node: &Node, kind: UnitKind, source: &[u8]) -> Option<OutlineUnit> {
        let name = node
            .child_by_field_name("name")
            .and_then(|n| n.utf8_text(source).ok())?;
        let docstring = node
            .child_by_field_name("body")
            .and_then(|body| body_docstring(&body, source));

        Some(OutlineUnit::new(kind, name, node.start_position().row + 1).with_docstring(docstring))
    }

    /// Collect the plain methods of a class body
    fn collect_methods(&self, class: &Node, source: &[u8]) -> Vec<OutlineUnit> {
        let Some(body) = class.child_by_field_name("body") else {
            return Vec::new();
        };

        statements(&body)
            .iter()
            .map(definition)
            .filter(is_plain_function)
            .filter_map(|def| self.build_unit(&def, UnitKind::Method, source))
            .collect()
    }
}

impl DocParser for PythonParser {
    fn language(&self) -> Language {
        Language::Python
    }

    fn parse_module(&mut self, source: &str) -> Result<ModuleOutline, ParserError> {
        let tree = self.parse_tree(source)?;
        let root = tree.root_node();

        if root.has_error() {
            return Err(syntax_error(&root));
        }

        let source_bytes = source.as_bytes();
        if let Some(error) = rejected_construct(&root, source_bytes) {
            return Err(error);
        }

        let mut outline = ModuleOutline {
            docstring: body_docstring(&root, source_bytes),
            ..Default::default()
        };

        for statement in statements(&root) {
            let def = definition(&statement);
            match def.kind() {
                "function_definition" if !is_async(&def) => {
                    if let Some(unit) = self.build_unit(&def, UnitKind::Function, source_bytes) {
                        outline.functions.push(unit);
                    }
                }
                "class_definition" => {
                    if let Some(mut unit) = self.build_unit(&def, UnitKind::Class, source_bytes) {
                        unit.methods = self.collect_methods(&def, source_bytes);
                        outline.classes.push(unit);
                    }
                }
                _ => {}
            }
        }

        Ok(outline)
    }
}

/// Statements of a module or block, comments excluded
fn statements<'tree>(node: &Node<'tree>) -> Vec<Node<'tree>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| !child.is_extra() && child.kind() != "comment")
        .collect()
}

/// Unwrap a decorated definition to the function or class it decorates
fn definition<'tree>(node: &Node<'tree>) -> Node<'tree> {
    if node.kind() == "decorated_definition" {
        node.child_by_field_name("definition").unwrap_or(*node)
    } else {
        *node
    }
}

fn is_async(node: &Node) -> bool {
    let mut cursor = node.walk();
    let found = node
        .children(&mut cursor)
        .take_while(|child| child.kind() != "def")
        .any(|child| child.kind() == "async");
    found
}

fn is_plain_function(node: &Node) -> bool {
    node.kind() == "function_definition" && !is_async(node)
}

/// Docstring of a module or block: its first statement, when that statement
/// is nothing but a string literal
fn body_docstring(body: &Node, source: &[u8]) -> Option<String> {
    let first = statements(body).into_iter().next()?;
    if first.kind() != "expression_statement" {
        return None;
    }

    let expressions = statements(&first);
    let [expression] = expressions.as_slice() else {
        return None;
    };

    string_value(expression, source).map(|raw| clean_docstring(&raw))
}

/// Value of a string expression, `None` for anything that is not plain text
fn string_value(node: &Node, source: &[u8]) -> Option<String> {
    match node.kind() {
        "string" => decode_string_literal(node.utf8_text(source).ok()?),
        "concatenated_string" => {
            let mut value = String::new();
            for part in statements(node) {
                value.push_str(&string_value(&part, source)?);
            }
            Some(value)
        }
        "parenthesized_expression" => {
            let inner = statements(node);
            match inner.as_slice() {
                [only] => string_value(only, source),
                _ => None,
            }
        }
        _ => None,
    }
}

/// Locate the first error or missing node below `root`
fn syntax_error(root: &Node) -> ParserError {
    let node = first_error(root).unwrap_or(*root);
    let position = node.start_position();
    let message = if node.is_missing() {
        format!("missing {}", node.kind())
    } else {
        "invalid syntax".to_string()
    };

    ParserError::Syntax {
        line: position.row + 1,
        column: position.column,
        message,
    }
}

/// First construct that parses but that Python 3 refuses to compile:
/// Python 2 `print`/`exec` statements and invalid string literals
fn rejected_construct(root: &Node, source: &[u8]) -> Option<ParserError> {
    let mut cursor = root.walk();

    loop {
        let node = cursor.node();
        let message = match node.kind() {
            "print_statement" => Some("Python 2 print statement".to_string()),
            "exec_statement" => Some("Python 2 exec statement".to_string()),
            "string" => node
                .utf8_text(source)
                .ok()
                .and_then(|text| check_literal(text).err())
                .map(|e| e.to_string()),
            _ => None,
        };
        if let Some(message) = message {
            let position = node.start_position();
            return Some(ParserError::Syntax {
                line: position.row + 1,
                column: position.column,
                message,
            });
        }

        if cursor.goto_first_child() {
            continue;
        }
        while !cursor.goto_next_sibling() {
            if !cursor.goto_parent() {
                return None;
            }
        }
    }
}

fn first_error<'tree>(node: &Node<'tree>) -> Option<Node<'tree>> {
    if node.is_error() || node.is_missing() {
        return Some(*node);
    }
    if !node.has_error() {
        return None;
    }

    let mut cursor = node.walk();
    let children: Vec<Node<'tree>> = node.children(&mut cursor).collect();
    children.iter().find_map(|child| first_error(child))
}
