//! Pest dialect parser
//!
//! Recognizes top-level `test()`, `it()`, `arch()` and `describe()` calls.
//! There is no class behind these tests, so the suite name is synthesized
//! from the file path relative to the test root (`tests/Unit/FooTest.php`
//! becomes `P\Tests\Unit\FooTest`) and each test is keyed by its description.

use crate::definition::{Annotations, TestDefinition, group_by_namespace};
use crate::parsing::identifier::pest_data_set_label;
use crate::parsing::parser::{DialectParser, argument_values, short_name, string_literal};
use crate::parsing::source::SourceTree;
use crate::parsing::{ParserContext, ScopeType};
use crate::types::{Span, TestType};
use std::path::{Component, Path, PathBuf};
use tracing::debug;
use tree_sitter::Node;

/// Namespace prefix Pest gives to the classes it generates
pub const PEST_NAMESPACE: &str = "P";

/// Separator between nested descriptions in a test name
pub const DESCRIBE_SEPARATOR: &str = " → ";

const TEST_FUNCTIONS: &[&str] = &["test", "it", "arch", "describe"];

/// A recognized registration call with its fluent chain
#[derive(Debug)]
struct TestCall<'t> {
    node: Node<'t>,
    function: String,
    description: String,
    closure: Option<Node<'t>>,
    /// Chained calls in source order, e.g. `->with([...])->group('a')`
    chain: Vec<(String, Vec<Node<'t>>)>,
}

impl<'t> TestCall<'t> {
    fn from_expression(expression: Node<'t>, tree: &SourceTree) -> Option<Self> {
        let mut chain = Vec::new();
        let mut current = expression;
        while current.kind() == "member_call_expression" {
            let name = current.child_by_field_name("name")?;
            let arguments = current
                .child_by_field_name("arguments")
                .map(argument_values)
                .unwrap_or_default();
            chain.push((tree.text(&name).to_string(), arguments));
            current = current.child_by_field_name("object")?;
        }
        chain.reverse();

        if current.kind() != "function_call_expression" {
            return None;
        }
        let function = short_name(tree.text(&current.child_by_field_name("function")?));
        if !TEST_FUNCTIONS.contains(&function) {
            return None;
        }

        let arguments = argument_values(current.child_by_field_name("arguments")?);
        let description = string_literal(*arguments.first()?, tree)?;
        let closure = arguments.get(1).copied().filter(|node| {
            matches!(
                node.kind(),
                "anonymous_function" | "anonymous_function_creation_expression" | "arrow_function"
            )
        });

        Some(Self {
            node: expression,
            function: function.to_string(),
            description,
            closure,
            chain,
        })
    }

    fn annotations(&self, tree: &SourceTree) -> Annotations {
        let mut annotations = Annotations::default();
        if self.closure.is_none() && matches!(self.function.as_str(), "test" | "it") {
            annotations.incomplete = true;
        }

        for (method, arguments) in &self.chain {
            let strings = || arguments.iter().filter_map(|node| string_literal(*node, tree));
            match method.as_str() {
                "with" => {
                    for argument in arguments {
                        match argument.kind() {
                            "array_creation_expression" => {
                                let mut cursor = argument.walk();
                                annotations.test_with.extend(
                                    argument
                                        .named_children(&mut cursor)
                                        .filter(|n| n.kind() == "array_element_initializer")
                                        .map(|n| tree.text(&n).to_string()),
                                );
                            }
                            _ => annotations
                                .data_provider
                                .extend(string_literal(*argument, tree)),
                        }
                    }
                }
                "group" => annotations.group.extend(strings()),
                "depends" => annotations.depends.extend(strings()),
                "skip" => annotations.skipped = true,
                "todo" => annotations.incomplete = true,
                _ => {}
            }
        }
        annotations
    }
}

/// Pest dialect parser
#[derive(Debug, Default)]
pub struct PestParser {
    root: PathBuf,
    context: ParserContext,
}

impl PestParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect test nodes from the statements directly under `container`
    fn collect_tests(
        &mut self,
        container: Node,
        parent: &TestDefinition,
        tree: &SourceTree,
    ) -> Vec<TestDefinition> {
        let mut tests = Vec::new();
        let mut cursor = container.walk();
        for statement in container.named_children(&mut cursor) {
            match statement.kind() {
                "expression_statement" => {
                    let mut expression_cursor = statement.walk();
                    let Some(expression) = statement.named_children(&mut expression_cursor).next()
                    else {
                        continue;
                    };
                    if let Some(call) = TestCall::from_expression(expression, tree) {
                        tests.extend(self.process_call(&call, parent, tree));
                    }
                }
                "namespace_definition" => {
                    if let Some(body) = statement.child_by_field_name("body") {
                        tests.extend(self.collect_tests(body, parent, tree));
                    }
                }
                _ => {}
            }
        }
        tests
    }

    fn process_call(
        &mut self,
        call: &TestCall,
        parent: &TestDefinition,
        tree: &SourceTree,
    ) -> Option<TestDefinition> {
        let path = self.context.describe_path();
        let annotations = call.annotations(tree);

        if call.function == "describe" {
            let mut names = path;
            names.push(&call.description);
            let method = describe_method_name(&names);

            let mut describe =
                TestDefinition::member(parent, TestType::Describe, &method, Span::of(&call.node));
            describe.label = call.description.clone();
            describe.annotations = annotations;

            self.context
                .enter_scope(ScopeType::Describe(call.description.clone()));
            describe.children = match call.closure {
                Some(closure) => self.closure_tests(closure, &describe, tree),
                None => Vec::new(),
            };
            self.context.exit_scope();

            if describe.children.is_empty() {
                debug!("dropping empty describe {}", describe.id);
                return None;
            }
            return Some(describe);
        }

        let method = test_method_name(&call.function, &call.description, &path);
        let mut test = TestDefinition::member(parent, TestType::Method, &method, Span::of(&call.node));
        test.label = test_label(&call.function, &call.description);
        test.annotations = annotations;
        test.children = test
            .annotations
            .test_with
            .iter()
            .map(|row| TestDefinition::labeled_data_set(&test, pest_data_set_label(row)))
            .collect();
        Some(test)
    }

    /// Tests registered inside a `describe` closure
    fn closure_tests(
        &mut self,
        closure: Node,
        parent: &TestDefinition,
        tree: &SourceTree,
    ) -> Vec<TestDefinition> {
        let Some(body) = closure.child_by_field_name("body") else {
            return Vec::new();
        };
        if body.kind() == "compound_statement" {
            return self.collect_tests(body, parent, tree);
        }
        // Arrow function: the body is a single expression
        TestCall::from_expression(body, tree)
            .and_then(|call| self.process_call(&call, parent, tree))
            .into_iter()
            .collect()
    }
}

impl DialectParser for PestParser {
    fn name(&self) -> &'static str {
        "pest"
    }

    fn set_root(&mut self, root: &Path) {
        self.root = root.to_path_buf();
    }

    fn parse(&mut self, tree: &SourceTree, file: &Path) -> Option<Vec<TestDefinition>> {
        // Reset context for each file
        self.context = ParserContext::new();

        let (namespace, class) = synthetic_class(&self.root, file);
        let mut suite =
            TestDefinition::class(Some(namespace.as_str()), &class, file, Span::of(&tree.root_node()));

        let tests = self.collect_tests(tree.root_node(), &suite, tree);
        if tests.is_empty() {
            return None;
        }
        suite.children = tests;
        Some(group_by_namespace(vec![suite], file))
    }
}

/// Namespace and class Pest generates for a test file
///
/// Both paths are made absolute first, so `tests/FooTest.php`,
/// `./tests/FooTest.php` and its absolute spelling name the same suite.
pub fn synthetic_class(root: &Path, file: &Path) -> (String, String) {
    let root = normalize_path(root);
    let file = normalize_path(file);
    let relative = match file.strip_prefix(&root) {
        Ok(relative) if relative.is_relative() => relative.to_path_buf(),
        _ => file.file_name().map(PathBuf::from).unwrap_or_default(),
    };
    let relative = relative.with_extension("");

    let mut segments: Vec<String> = relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(segment) => Some(upper_first(&segment.to_string_lossy())),
            _ => None,
        })
        .collect();
    let class = segments.pop().unwrap_or_default();

    let namespace = std::iter::once(PEST_NAMESPACE.to_string())
        .chain(segments)
        .collect::<Vec<_>>()
        .join("\\");
    (namespace, class)
}

/// Absolute form of `path` with `.` and `..` resolved lexically
fn normalize_path(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };

    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    normalized
}

fn upper_first(segment: &str) -> String {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Label of a test: the description with the registering function's prefix
pub fn test_label(function: &str, description: &str) -> String {
    match function {
        "it" | "arch" => format!("{function} {description}"),
        _ => description.to_string(),
    }
}

/// Method name of a test nested in `describe_path`
pub fn test_method_name(function: &str, description: &str, describe_path: &[&str]) -> String {
    let label = test_label(function, description);
    if describe_path.is_empty() {
        return label;
    }
    format!(
        "{}{DESCRIBE_SEPARATOR}{label}",
        describe_method_name(describe_path)
    )
}

/// Method name of a describe block: each level in backticks
pub fn describe_method_name(describe_path: &[&str]) -> String {
    describe_path
        .iter()
        .map(|description| format!("`{description}`"))
        .collect::<Vec<_>>()
        .join(DESCRIBE_SEPARATOR)
}
