//! Test extraction engine
//!
//! Owns the syntax-tree provider, the ordered list of dialect parsers and the
//! event channel. A parse rewrites and parses the text, hands the tree to
//! each dialect in priority order until one recognizes it, publishes every
//! node of the winning tree and returns it.

use crate::Settings;
use crate::definition::TestDefinition;
use crate::error::{DiscoveryError, DiscoveryResult, ParseError, ParseResult};
use crate::parsing::events::EventEmitter;
use crate::parsing::parser::DialectParser;
use crate::parsing::pest::PestParser;
use crate::parsing::phpunit::PhpUnitParser;
use crate::parsing::source::PhpSyntaxParser;
use crate::types::TestType;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Parses PHP files into test definition trees
pub struct TestParser {
    syntax: PhpSyntaxParser,
    /// Tried in order; the first dialect returning a tree wins
    dialects: Vec<Box<dyn DialectParser>>,
    events: EventEmitter,
    root: PathBuf,
}

impl std::fmt::Debug for TestParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestParser")
            .field(
                "dialects",
                &self.dialects.iter().map(|d| d.name()).collect::<Vec<_>>(),
            )
            .field("events", &self.events)
            .field("root", &self.root)
            .finish()
    }
}

impl TestParser {
    /// Create an engine with the PHPUnit dialect ahead of Pest
    pub fn new() -> ParseResult<Self> {
        Ok(Self {
            syntax: PhpSyntaxParser::new()?,
            dialects: vec![Box::new(PhpUnitParser::new()), Box::new(PestParser::new())],
            events: EventEmitter::new(),
            root: PathBuf::new(),
        })
    }

    /// Create an engine rooted at the configured test root
    pub fn from_settings(settings: &Settings) -> ParseResult<Self> {
        Ok(Self::new()?.with_root(settings.resolved_test_root()))
    }

    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    pub fn set_root(&mut self, root: impl Into<PathBuf>) {
        self.root = root.into();
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Register a listener for every parsed node of `test_type`
    pub fn on<F>(&mut self, test_type: TestType, listener: F)
    where
        F: Fn(&TestDefinition, Option<usize>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.events.on(test_type, listener);
    }

    /// Parse PHP text.
    ///
    /// Returns `None` both when the text does not parse and when it holds no
    /// tests; use [`try_parse`](Self::try_parse) to tell them apart.
    pub fn parse(&mut self, text: &str, file: impl AsRef<Path>) -> Option<Vec<TestDefinition>> {
        let file = file.as_ref();
        match self.try_parse(text, file) {
            Ok(tests) => tests,
            Err(e) => {
                debug!("ignoring {}: {e}", file.display());
                None
            }
        }
    }

    /// Parse PHP text, reporting syntax errors instead of swallowing them
    pub fn try_parse(
        &mut self,
        text: &str,
        file: impl AsRef<Path>,
    ) -> ParseResult<Option<Vec<TestDefinition>>> {
        let file = file.as_ref();
        let tree = self.syntax.parse(text, file)?;

        let mut found = None;
        for dialect in &mut self.dialects {
            dialect.set_root(&self.root);
            if let Some(tests) = dialect.parse(&tree, file) {
                debug!(
                    "{} dialect found {} root(s) in {}",
                    dialect.name(),
                    tests.len(),
                    file.display()
                );
                found = Some(tests);
                break;
            }
        }

        let Some(tests) = found else {
            return Ok(None);
        };

        warn_duplicate_ids(&tests, file);
        self.events.emit_tree(&tests);
        Ok(Some(tests))
    }

    /// Read a file as UTF-8 and parse it; unreadable files give `None`
    pub async fn parse_file(&mut self, file: impl AsRef<Path>) -> Option<Vec<TestDefinition>> {
        let file = file.as_ref();
        match self.try_parse_file(file).await {
            Ok(tests) => tests,
            Err(e) => {
                debug!("ignoring {}: {e}", file.display());
                None
            }
        }
    }

    /// Read and parse a file, reporting read, decode and syntax errors
    pub async fn try_parse_file(
        &mut self,
        file: impl AsRef<Path>,
    ) -> DiscoveryResult<Option<Vec<TestDefinition>>> {
        let file = file.as_ref();
        let bytes = tokio::fs::read(file)
            .await
            .map_err(|source| DiscoveryError::FileRead {
                path: file.to_path_buf(),
                source,
            })?;
        let text = String::from_utf8(bytes).map_err(|_| DiscoveryError::Parse {
            path: file.to_path_buf(),
            source: ParseError::InvalidUtf8,
        })?;

        self.try_parse(&text, file)
            .map_err(|source| DiscoveryError::Parse {
                path: file.to_path_buf(),
                source,
            })
    }
}

/// Ids are correlation keys; a collision means the id rule is ambiguous
/// for this file, which is reported but left as is.
fn warn_duplicate_ids(tests: &[TestDefinition], file: &Path) {
    let mut seen = HashSet::new();
    for test in tests.iter().flat_map(TestDefinition::iter) {
        if !seen.insert(test.id.as_str()) {
            warn!("duplicate test id '{}' in {}", test.id, file.display());
        }
    }
}
