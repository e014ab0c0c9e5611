//! Synchronous per-node-type event channel
//!
//! Listeners register for one [`TestType`] and are called, in registration
//! order, for every node of that type in a parse result. Traversal is depth
//! first with parents before children.
//!
//! A listener reports failure by returning `Err`. The error is logged and
//! the remaining listeners and nodes are still notified. Listeners must not
//! panic: a panic unwinds out of the parse call.

use crate::definition::TestDefinition;
use crate::types::TestType;
use std::collections::HashMap;
use tracing::warn;

/// Callback invoked with a node and, for data sets, its index among siblings
pub type Listener =
    Box<dyn Fn(&TestDefinition, Option<usize>) -> anyhow::Result<()> + Send + Sync>;

/// Listener registry keyed by node type
#[derive(Default)]
pub struct EventEmitter {
    listeners: HashMap<TestType, Vec<Listener>>,
}

impl std::fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let counts: HashMap<_, _> = self
            .listeners
            .iter()
            .map(|(test_type, listeners)| (*test_type, listeners.len()))
            .collect();
        f.debug_struct("EventEmitter")
            .field("listeners", &counts)
            .finish()
    }
}

impl EventEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for nodes of `test_type`
    pub fn on<F>(&mut self, test_type: TestType, listener: F)
    where
        F: Fn(&TestDefinition, Option<usize>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.listeners
            .entry(test_type)
            .or_default()
            .push(Box::new(listener));
    }

    /// Notify the listeners of one node; returns how many of them failed
    pub fn emit(&self, test: &TestDefinition, index: Option<usize>) -> usize {
        let Some(listeners) = self.listeners.get(&test.test_type) else {
            return 0;
        };

        let mut failures = 0;
        for listener in listeners {
            if let Err(e) = listener(test, index) {
                failures += 1;
                warn!("{} listener failed for {}: {e:#}", test.test_type, test.id);
            }
        }
        failures
    }

    /// Notify listeners of every node of `tests`, depth first
    pub fn emit_tree(&self, tests: &[TestDefinition]) -> usize {
        let mut failures = 0;
        for (position, test) in tests.iter().enumerate() {
            let index = (test.test_type == TestType::DataSet).then_some(position);
            failures += self.emit(test, index);
            if !test.children.is_empty() {
                failures += self.emit_tree(&test.children);
            }
        }
        failures
    }
}
