//! Docblock tags and attributes understood by the PHPUnit dialect

use crate::definition::Annotations;
use crate::parsing::parser::{argument_values, class_reference, short_name, string_literal};
use crate::parsing::source::SourceTree;
use regex::Regex;
use std::sync::LazyLock;
use tree_sitter::Node;

static TAG_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@([A-Za-z][\w-]*)(?:\s+(.*))?$").expect("Invalid regex"));

/// A single `@tag value` entry of a docblock
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocTag {
    pub name: String,
    pub value: String,
    /// Continuation lines (used by `@testWith` rows)
    pub rows: Vec<String>,
}

/// Split a docblock into its tags
pub fn parse_doc_block(text: &str) -> Vec<DocTag> {
    let mut tags: Vec<DocTag> = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        let line = line.strip_prefix("/**").unwrap_or(line);
        let line = line.strip_suffix("*/").unwrap_or(line);
        let line = line.trim().trim_start_matches('*').trim();
        if line.is_empty() {
            continue;
        }

        if let Some(captures) = TAG_LINE.captures(line) {
            let value = captures
                .get(2)
                .map(|m| m.as_str().trim().to_string())
                .unwrap_or_default();
            tags.push(DocTag {
                name: captures[1].to_string(),
                value,
                rows: Vec::new(),
            });
        } else if let Some(last) = tags.last_mut() {
            last.rows.push(line.to_string());
        }
    }

    tags
}

/// Markers collected from a declaration's docblock and attributes
#[derive(Debug, Clone, Default)]
pub struct Markers {
    /// Method carries `@test` or `#[Test]`
    pub is_test: bool,
    /// Class carries a recognized test case marker
    pub is_test_case: bool,
    pub annotations: Annotations,
}

impl Markers {
    /// Collect markers of a class or method declaration
    pub fn of(node: &Node, tree: &SourceTree) -> Self {
        let mut markers = Markers::default();
        if let Some(doc) = tree.doc_comment(node) {
            for tag in parse_doc_block(doc) {
                markers.apply_tag(&tag);
            }
        }
        for (name, arguments) in attributes(node, tree) {
            markers.apply_attribute(&name, &arguments, tree);
        }
        markers
    }

    fn apply_tag(&mut self, tag: &DocTag) {
        let first_word = || tag.value.split_whitespace().next().map(str::to_string);
        let annotations = &mut self.annotations;

        match tag.name.as_str() {
            "test" => self.is_test = true,
            "dataProvider" => annotations.data_provider.extend(first_word()),
            "depends" => annotations.depends.extend(first_word()),
            "group" | "ticket" => {
                annotations.group.extend(first_word());
                self.is_test_case = true;
            }
            "testdox" => {
                annotations.testdox.push(tag.value.clone());
                self.is_test_case = true;
            }
            "testWith" => {
                let rows = std::iter::once(tag.value.clone())
                    .chain(tag.rows.iter().cloned())
                    .filter(|row| !row.is_empty());
                annotations.test_with.extend(rows);
            }
            "skip" | "skipped" => annotations.skipped = true,
            "incomplete" | "todo" => annotations.incomplete = true,
            "covers" | "coversDefaultClass" | "coversNothing" | "uses" => {
                self.is_test_case = true
            }
            _ => {}
        }
    }

    fn apply_attribute(&mut self, name: &str, arguments: &[Node], tree: &SourceTree) {
        let string_arg = |index: usize| {
            arguments
                .get(index)
                .and_then(|node| string_literal(*node, tree))
        };
        let external = || {
            let class = arguments.first().and_then(|node| class_reference(*node, tree))?;
            let method = string_arg(1)?;
            Some(format!("{class}::{method}"))
        };
        let annotations = &mut self.annotations;

        match name {
            "Test" => self.is_test = true,
            "DataProvider" => annotations.data_provider.extend(string_arg(0)),
            "DataProviderExternal" => annotations.data_provider.extend(external()),
            "Depends" | "DependsUsingDeepClone" | "DependsUsingShallowClone" => {
                annotations.depends.extend(string_arg(0))
            }
            "DependsExternal" | "DependsExternalUsingDeepClone"
            | "DependsExternalUsingShallowClone" => annotations.depends.extend(external()),
            "DependsOnClass" | "DependsOnClassUsingDeepClone"
            | "DependsOnClassUsingShallowClone" => annotations
                .depends
                .extend(arguments.first().and_then(|node| class_reference(*node, tree))),
            "Group" | "Ticket" => {
                annotations.group.extend(string_arg(0));
                self.is_test_case = true;
            }
            "TestDox" => {
                annotations.testdox.extend(string_arg(0));
                self.is_test_case = true;
            }
            "TestWith" => annotations
                .test_with
                .extend(arguments.first().map(|node| tree.text(node).to_string())),
            "TestWithJson" => annotations.test_with.extend(string_arg(0)),
            "CoversClass" | "CoversFunction" | "CoversMethod" | "CoversTrait"
            | "CoversNothing" | "UsesClass" | "UsesFunction" | "Small" | "Medium" | "Large"
            | "RunTestsInSeparateProcesses" | "BackupGlobals" | "DoesNotPerformAssertions" => {
                self.is_test_case = true
            }
            _ => {}
        }
    }
}

/// Attributes of a declaration as `(short name, argument values)`
pub fn attributes<'t>(node: &Node<'t>, tree: &SourceTree) -> Vec<(String, Vec<Node<'t>>)> {
    let mut found = Vec::new();
    let mut cursor = node.walk();
    for list in node
        .children(&mut cursor)
        .filter(|child| child.kind() == "attribute_list")
    {
        let mut group_cursor = list.walk();
        for group in list.named_children(&mut group_cursor) {
            let mut attribute_cursor = group.walk();
            for attribute in group
                .named_children(&mut attribute_cursor)
                .filter(|child| child.kind() == "attribute")
            {
                let mut name_cursor = attribute.walk();
                let Some(name) = attribute
                    .named_children(&mut name_cursor)
                    .find(|child| matches!(child.kind(), "name" | "qualified_name"))
                else {
                    continue;
                };
                let arguments = attribute
                    .child_by_field_name("parameters")
                    .map(argument_values)
                    .unwrap_or_default();
                found.push((short_name(tree.text(&name)).to_string(), arguments));
            }
        }
    }
    found
}
