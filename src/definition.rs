//! Test definition tree produced by the dialect parsers

use crate::parsing::identifier::{
    data_set_label, generate_data_set_id, generate_qualified_class, generate_unique_id,
};
use crate::types::{Position, Span, TestType};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Execution-relevant markers found on a test declaration.
///
/// Values are recorded verbatim; nothing here is validated or executed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotations {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data_provider: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub group: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub testdox: Vec<String>,
    /// Inline data rows (`@testWith`, `#[TestWith]`, Pest `->with([...])`)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub test_with: Vec<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub skipped: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub incomplete: bool,
}

impl Annotations {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// One discoverable test suite, test case or data set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestDefinition {
    #[serde(rename = "type")]
    pub test_type: TestType,
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qualified_class: Option<String>,
    pub file: PathBuf,
    pub start: Position,
    pub end: Position,
    /// Number of ancestors; roots are 0
    pub depth: usize,
    #[serde(default, skip_serializing_if = "Annotations::is_empty")]
    pub annotations: Annotations,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TestDefinition>,
}

impl TestDefinition {
    fn base(test_type: TestType, id: String, label: String, file: &Path, span: Span) -> Self {
        Self {
            test_type,
            id,
            label,
            namespace: None,
            class_name: None,
            method_name: None,
            qualified_class: None,
            file: file.to_path_buf(),
            start: span.start,
            end: span.end,
            depth: 0,
            annotations: Annotations::default(),
            children: Vec::new(),
        }
    }

    /// Namespace node wrapping the classes declared in it
    pub fn namespace(namespace: &str, file: &Path, span: Span) -> Self {
        let mut def = Self::base(
            TestType::Namespace,
            namespace.to_string(),
            namespace.to_string(),
            file,
            span,
        );
        def.namespace = Some(namespace.to_string());
        def
    }

    /// Test suite node for a class
    pub fn class(namespace: Option<&str>, class: &str, file: &Path, span: Span) -> Self {
        let id = generate_unique_id(namespace, Some(class), None).unwrap_or_default();
        let mut def = Self::base(TestType::Class, id, class.to_string(), file, span);
        def.namespace = namespace.filter(|n| !n.is_empty()).map(str::to_string);
        def.class_name = Some(class.to_string());
        def.qualified_class = Some(generate_qualified_class(namespace, Some(class)));
        def
    }

    /// Child node under `parent` that has its own method name
    ///
    /// Used for test methods and for grouping calls; the id is always derived
    /// from the parent's namespace and class plus `method`.
    pub fn member(parent: &TestDefinition, test_type: TestType, method: &str, span: Span) -> Self {
        let namespace = parent.namespace.as_deref();
        let class = parent.class_name.as_deref();
        let id = generate_unique_id(namespace, class, Some(method)).unwrap_or_default();
        let mut def = Self::base(test_type, id, method.to_string(), &parent.file, span);
        def.namespace = parent.namespace.clone();
        def.class_name = parent.class_name.clone();
        def.qualified_class = parent.qualified_class.clone();
        def.method_name = Some(method.to_string());
        def
    }

    /// The `index`-th data set of a test; shares the test's span
    pub fn data_set(parent: &TestDefinition, index: usize) -> Self {
        Self::labeled_data_set(parent, data_set_label(index))
    }

    /// Data set whose label the runner derives from the row itself
    pub fn labeled_data_set(parent: &TestDefinition, label: String) -> Self {
        let span = Span {
            start: parent.start,
            end: parent.end,
        };
        let mut def = Self::base(
            TestType::DataSet,
            generate_data_set_id(&parent.id, &label),
            label,
            &parent.file,
            span,
        );
        def.namespace = parent.namespace.clone();
        def.class_name = parent.class_name.clone();
        def.qualified_class = parent.qualified_class.clone();
        def.method_name = parent.method_name.clone();
        def
    }

    /// Depth-first iterator over this node and all descendants
    pub fn iter(&self) -> Iter<'_> {
        Iter { stack: vec![self] }
    }

    /// Find a node by id in this subtree
    pub fn find(&self, id: &str) -> Option<&TestDefinition> {
        self.iter().find(|def| def.id == id)
    }

    fn assign_depth(&mut self, depth: usize) {
        self.depth = depth;
        for child in &mut self.children {
            child.assign_depth(depth + 1);
        }
    }
}

/// Depth-first, parent-before-children traversal of a definition tree
pub struct Iter<'a> {
    stack: Vec<&'a TestDefinition>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a TestDefinition;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.stack.pop()?;
        self.stack.extend(next.children.iter().rev());
        Some(next)
    }
}

/// Wrap namespaced classes in namespace nodes, keeping source order.
///
/// Consecutive classes of one namespace share a node; a namespace that comes
/// back after something else gets a new node. Classes without a namespace
/// stay roots. Depth is assigned from the roots.
pub fn group_by_namespace(classes: Vec<TestDefinition>, file: &Path) -> Vec<TestDefinition> {
    let mut roots: Vec<TestDefinition> = Vec::new();

    for class in classes {
        let Some(namespace) = class.namespace.clone() else {
            roots.push(class);
            continue;
        };

        // Only a directly preceding block of the same namespace is extended
        let existing = roots
            .last_mut()
            .filter(|root| root.test_type == TestType::Namespace && root.id == namespace);
        match existing {
            Some(root) => {
                root.end = class.end;
                root.children.push(class);
            }
            None => {
                let span = Span {
                    start: class.start,
                    end: class.end,
                };
                let mut root = TestDefinition::namespace(&namespace, file, span);
                root.children.push(class);
                roots.push(root);
            }
        }
    }

    for root in &mut roots {
        root.assign_depth(0);
    }
    roots
}
