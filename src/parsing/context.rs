//! Parser context for tracking scope during AST traversal
//!
//! This module provides scope tracking utilities that the dialect parsers
//! use to know which namespace, class or grouping call they are inside.

/// Scope types that parsers track during AST traversal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeType {
    /// File scope
    Module,
    /// Braced `namespace X { }` block
    Namespace,
    /// Class body
    Class,
    /// Grouping call of the functional dialect, with its description
    Describe(String),
}

/// Parser context for tracking current scope during parsing
#[derive(Debug, Clone)]
pub struct ParserContext {
    /// Stack of current scopes (innermost last)
    scope_stack: Vec<ScopeType>,
    /// Namespace in effect for declarations at the current position
    current_namespace: Option<String>,
    /// Current class name (if inside a class)
    current_class: Option<String>,
}

impl Default for ParserContext {
    fn default() -> Self {
        Self::new()
    }
}

impl ParserContext {
    /// Create a new parser context starting at module scope
    pub fn new() -> Self {
        Self {
            scope_stack: vec![ScopeType::Module],
            current_namespace: None,
            current_class: None,
        }
    }

    /// Enter a new scope
    pub fn enter_scope(&mut self, scope_type: ScopeType) {
        self.scope_stack.push(scope_type);
    }

    /// Exit the current scope
    pub fn exit_scope(&mut self) {
        if self.scope_stack.len() > 1 {
            // Never pop the module scope
            match self.scope_stack.pop() {
                Some(ScopeType::Class) => self.current_class = None,
                Some(ScopeType::Namespace) => self.current_namespace = None,
                _ => {}
            }
        }
    }

    /// Set the namespace for following declarations.
    ///
    /// Statement-form namespaces (`namespace X;`) stay in effect until the
    /// next namespace statement; braced ones are cleared on `exit_scope`.
    pub fn set_current_namespace(&mut self, namespace: Option<String>) {
        self.current_namespace = namespace.filter(|n| !n.is_empty());
    }

    pub fn current_namespace(&self) -> Option<&str> {
        self.current_namespace.as_deref()
    }

    pub fn set_current_class(&mut self, class: Option<String>) {
        self.current_class = class;
    }

    pub fn current_class(&self) -> Option<&str> {
        self.current_class.as_deref()
    }

    /// Descriptions of the enclosing grouping calls, outermost first
    pub fn describe_path(&self) -> Vec<&str> {
        self.scope_stack
            .iter()
            .filter_map(|scope| match scope {
                ScopeType::Describe(description) => Some(description.as_str()),
                _ => None,
            })
            .collect()
    }
}
