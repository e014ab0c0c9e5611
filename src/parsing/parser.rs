//! Dialect parser trait
//!
//! This module defines the common interface that every test dialect must
//! implement to be driven by [`TestParser`](crate::parsing::TestParser),
//! plus small helpers for reading PHP literal nodes.

use crate::definition::TestDefinition;
use crate::parsing::source::SourceTree;
use std::path::Path;
use tree_sitter::Node;

/// Common interface for all test dialects
pub trait DialectParser: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Receive the project's test root before each parse
    ///
    /// Dialects that derive identifiers from file locations use it; the
    /// default ignores it.
    fn set_root(&mut self, _root: &Path) {}

    /// Extract test definitions from a parsed file.
    ///
    /// Returns `None` when the file holds nothing this dialect recognizes,
    /// letting the next dialect try.
    fn parse(&mut self, tree: &SourceTree, file: &Path) -> Option<Vec<TestDefinition>>;
}

/// Last segment of a possibly qualified PHP name (`\A\B\C` -> `C`)
pub fn short_name(name: &str) -> &str {
    name.rsplit('\\').next().unwrap_or(name)
}

/// Value nodes of the arguments in an `arguments` node, in order.
///
/// Named arguments (`name: value`) yield their value.
pub fn argument_values<'t>(arguments: Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = arguments.walk();
    arguments
        .named_children(&mut cursor)
        .filter(|child| child.kind() == "argument")
        .filter_map(|argument| {
            let mut inner = argument.walk();
            argument.named_children(&mut inner).last()
        })
        .collect()
}

/// Decoded value of a string literal node, `None` for anything else
pub fn string_literal(node: Node, tree: &SourceTree) -> Option<String> {
    let raw = tree.text(&node);
    let raw = raw
        .strip_prefix('b')
        .or_else(|| raw.strip_prefix('B'))
        .filter(|rest| rest.starts_with('\'') || rest.starts_with('"'))
        .unwrap_or(raw);

    match node.kind() {
        "string" => {
            let inner = raw.strip_prefix('\'')?.strip_suffix('\'')?;
            Some(inner.replace("\\'", "'").replace("\\\\", "\\"))
        }
        "encapsed_string" => {
            let inner = raw.strip_prefix('"')?.strip_suffix('"')?;
            Some(
                inner
                    .replace("\\\"", "\"")
                    .replace("\\$", "$")
                    .replace("\\\\", "\\"),
            )
        }
        _ => None,
    }
}

/// Class name from a `Foo::class` expression or a string literal
pub fn class_reference(node: Node, tree: &SourceTree) -> Option<String> {
    if node.kind() == "class_constant_access_expression" {
        let text = tree.text(&node);
        return text
            .strip_suffix("::class")
            .map(|class| class.trim_start_matches('\\').to_string());
    }
    string_literal(node, tree)
}
