//! PHPUnit dialect parser
//!
//! Finds test case classes and their test methods. A class qualifies when it
//! is concrete and either extends (through classes declared in the same file)
//! something named `*TestCase`, is itself named `*Test`, or carries a
//! class-level PHPUnit marker. Only classes with at least one test method are
//! reported.
//!
//! `extends` names are resolved the way PHP resolves them: a leading `\` is
//! absolute, an imported alias is substituted, anything else is relative to
//! the enclosing namespace.

use super::annotations::Markers;
use crate::definition::{TestDefinition, group_by_namespace};
use crate::parsing::identifier::{NAMESPACE_SEPARATOR, generate_qualified_class};
use crate::parsing::parser::{DialectParser, short_name};
use crate::parsing::source::SourceTree;
use crate::parsing::{ParserContext, ScopeType};
use crate::types::{Span, TestType};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::debug;
use tree_sitter::Node;

/// A class declaration found while walking the file
struct ClassCandidate<'t> {
    node: Node<'t>,
    name: String,
    namespace: Option<String>,
    /// Index of the import scope the class was declared in
    scope: usize,
}

impl ClassCandidate<'_> {
    fn qualified_name(&self) -> String {
        generate_qualified_class(self.namespace.as_deref(), Some(&self.name))
    }
}

/// Imports of one namespace block: alias -> fully-qualified name
type ImportScope = HashMap<String, String>;

/// PHPUnit dialect parser
#[derive(Debug, Default)]
pub struct PhpUnitParser {
    context: ParserContext,
}

impl PhpUnitParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Walk namespace and top-level statements collecting classes and imports
    fn collect_declarations<'t>(
        &mut self,
        node: Node<'t>,
        tree: &SourceTree,
        classes: &mut Vec<ClassCandidate<'t>>,
        scopes: &mut Vec<ImportScope>,
    ) {
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            match child.kind() {
                "namespace_definition" => {
                    let name = child
                        .child_by_field_name("name")
                        .map(|n| tree.text(&n).to_string());

                    // Each namespace block starts with no imports
                    scopes.push(ImportScope::new());
                    match child.child_by_field_name("body") {
                        Some(body) => {
                            self.context.enter_scope(ScopeType::Namespace);
                            self.context.set_current_namespace(name);
                            self.collect_declarations(body, tree, classes, scopes);
                            self.context.exit_scope();
                            scopes.push(ImportScope::new());
                        }
                        None => self.context.set_current_namespace(name),
                    }
                }
                "namespace_use_declaration" => {
                    if let Some(imports) = scopes.last_mut() {
                        collect_imports(child, tree, imports);
                    }
                }
                "class_declaration" => {
                    let Some(name) = child.child_by_field_name("name") else {
                        continue;
                    };
                    classes.push(ClassCandidate {
                        node: child,
                        name: tree.text(&name).to_string(),
                        namespace: self.context.current_namespace().map(str::to_string),
                        scope: scopes.len().saturating_sub(1),
                    });
                }
                _ => {}
            }
        }
    }

    /// Build the suite node for a qualifying class
    fn process_class(
        &mut self,
        candidate: &ClassCandidate,
        hierarchy: &HashMap<String, Option<String>>,
        tree: &SourceTree,
        file: &Path,
    ) -> Option<TestDefinition> {
        let node = candidate.node;
        if has_modifier(&node, "abstract_modifier") {
            return None;
        }

        let markers = Markers::of(&node, tree);
        let qualifies = candidate.name.ends_with("Test")
            || extends_test_case(&candidate.qualified_name(), hierarchy, &mut HashSet::new())
            || markers.is_test_case;
        if !qualifies {
            debug!("skipping non-test class {}", candidate.name);
            return None;
        }

        let mut class = TestDefinition::class(
            candidate.namespace.as_deref(),
            &candidate.name,
            file,
            Span::of(&node),
        );
        if let Some(testdox) = markers.annotations.testdox.first() {
            class.label = testdox.clone();
        }
        class.annotations.group = markers.annotations.group;
        class.annotations.testdox = markers.annotations.testdox;

        let body = node.child_by_field_name("body")?;
        self.context.enter_scope(ScopeType::Class);
        self.context.set_current_class(Some(candidate.name.clone()));

        let mut cursor = body.walk();
        let methods: Vec<TestDefinition> = body
            .named_children(&mut cursor)
            .filter(|child| child.kind() == "method_declaration")
            .filter_map(|method| self.process_method(&method, &class, tree))
            .collect();

        self.context.exit_scope();

        if methods.is_empty() {
            debug!("class {} has no test methods", class.id);
            return None;
        }
        class.children = methods;
        Some(class)
    }

    /// Build the test node for a public test method
    fn process_method(
        &self,
        node: &Node,
        class: &TestDefinition,
        tree: &SourceTree,
    ) -> Option<TestDefinition> {
        let is_public = {
            let mut cursor = node.walk();
            node.children(&mut cursor)
                .find(|child| child.kind() == "visibility_modifier")
                .is_none_or(|modifier| tree.text(&modifier) == "public")
        };
        if !is_public
            || has_modifier(node, "abstract_modifier")
            || has_modifier(node, "static_modifier")
        {
            return None;
        }

        let name = tree.text(&node.child_by_field_name("name")?);
        let markers = Markers::of(node, tree);
        if !(name.starts_with("test") || markers.is_test) {
            return None;
        }

        let mut method = TestDefinition::member(class, TestType::Method, name, Span::of(node));
        if let Some(testdox) = markers.annotations.testdox.first() {
            method.label = testdox.clone();
        }
        method.annotations = markers.annotations;
        method.children = (0..method.annotations.test_with.len())
            .map(|index| TestDefinition::data_set(&method, index))
            .collect();

        debug!(
            "found test {} in {}",
            method.id,
            self.context.current_class().unwrap_or_default()
        );
        Some(method)
    }
}

impl DialectParser for PhpUnitParser {
    fn name(&self) -> &'static str {
        "phpunit"
    }

    fn parse(&mut self, tree: &SourceTree, file: &Path) -> Option<Vec<TestDefinition>> {
        // Reset context for each file
        self.context = ParserContext::new();

        let mut candidates = Vec::new();
        let mut scopes = vec![ImportScope::new()];
        self.collect_declarations(tree.root_node(), tree, &mut candidates, &mut scopes);
        if candidates.is_empty() {
            return None;
        }

        let hierarchy: HashMap<String, Option<String>> = candidates
            .iter()
            .map(|candidate| {
                let parent = parent_class(&candidate.node, tree).map(|parent| {
                    resolve_class_name(
                        &parent,
                        candidate.namespace.as_deref(),
                        &scopes[candidate.scope],
                    )
                });
                (candidate.qualified_name(), parent)
            })
            .collect();

        let classes: Vec<TestDefinition> = candidates
            .iter()
            .filter_map(|candidate| self.process_class(candidate, &hierarchy, tree, file))
            .collect();

        if classes.is_empty() {
            return None;
        }
        Some(group_by_namespace(classes, file))
    }
}

fn has_modifier(node: &Node, kind: &str) -> bool {
    let mut cursor = node.walk();
    node.children(&mut cursor).any(|child| child.kind() == kind)
}

/// Name in the `extends` clause of a class, as written
fn parent_class(node: &Node, tree: &SourceTree) -> Option<String> {
    let mut cursor = node.walk();
    let base = node
        .children(&mut cursor)
        .find(|child| child.kind() == "base_clause")?;
    let mut base_cursor = base.walk();
    let parent = base
        .named_children(&mut base_cursor)
        .find(|child| matches!(child.kind(), "name" | "qualified_name"))?;
    Some(tree.text(&parent).to_string())
}

/// Fully-qualified form of a class name used inside `namespace`
fn resolve_class_name(name: &str, namespace: Option<&str>, imports: &ImportScope) -> String {
    if let Some(absolute) = name.strip_prefix(NAMESPACE_SEPARATOR) {
        return absolute.to_string();
    }

    let (first, rest) = match name.split_once(NAMESPACE_SEPARATOR) {
        Some((first, rest)) => (first, Some(rest)),
        None => (name, None),
    };
    match (imports.get(first), rest) {
        (Some(imported), Some(rest)) => format!("{imported}{NAMESPACE_SEPARATOR}{rest}"),
        (Some(imported), None) => imported.clone(),
        (None, _) => generate_qualified_class(namespace, Some(name)),
    }
}

/// Follow `extends` edges among classes of this file looking for a `*TestCase`.
///
/// `hierarchy` maps fully-qualified class names to their resolved parent.
fn extends_test_case(
    class: &str,
    hierarchy: &HashMap<String, Option<String>>,
    visited: &mut HashSet<String>,
) -> bool {
    if !visited.insert(class.to_string()) {
        return false;
    }
    let Some(Some(parent)) = hierarchy.get(class) else {
        return false;
    };
    short_name(parent).ends_with("TestCase") || extends_test_case(parent, hierarchy, visited)
}

/// Record `use A\B\C;` and `use A\B\C as D;` as alias -> full name
fn collect_imports(node: Node, tree: &SourceTree, imports: &mut HashMap<String, String>) {
    let mut cursor = node.walk();
    for clause in node
        .named_children(&mut cursor)
        .filter(|child| child.kind() == "namespace_use_clause")
    {
        let mut clause_cursor = clause.walk();
        let mut full_name = None;
        let mut alias = clause
            .child_by_field_name("alias")
            .map(|n| tree.text(&n).to_string());

        for child in clause.named_children(&mut clause_cursor) {
            match child.kind() {
                "name" | "qualified_name" if full_name.is_none() => {
                    full_name = Some(tree.text(&child).trim_start_matches('\\').to_string());
                }
                "namespace_aliasing_clause" => {
                    let mut alias_cursor = child.walk();
                    alias = child
                        .named_children(&mut alias_cursor)
                        .find(|n| n.kind() == "name")
                        .map(|n| tree.text(&n).to_string());
                }
                _ => {}
            }
        }

        if let Some(full_name) = full_name {
            let key = alias.unwrap_or_else(|| short_name(&full_name).to_string());
            imports.insert(key, full_name);
        }
    }
}
