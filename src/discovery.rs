//! Bulk discovery of test files under the test root
//!
//! Walks the configured include directories (honoring .gitignore and the
//! configured ignore patterns), parses every file whose name ends with a
//! configured suffix and keeps the files that contain tests. A file that
//! cannot be read or parsed, or holds no tests, is recorded as skipped with
//! the reason; it never aborts the sweep.

use crate::Settings;
use crate::definition::TestDefinition;
use crate::error::{DiscoveryError, DiscoveryResult, ErrorContext};
use crate::parsing::TestParser;
use ignore::WalkBuilder;
use ignore::overrides::OverrideBuilder;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A test file and the definitions parsed from it
#[derive(Debug, Clone, Serialize)]
pub struct DiscoveredFile {
    pub path: PathBuf,
    pub tests: Vec<TestDefinition>,
}

impl DiscoveredFile {
    /// Number of test cases (method-level nodes) in the file
    pub fn test_count(&self) -> usize {
        self.tests
            .iter()
            .flat_map(TestDefinition::iter)
            .filter(|test| test.test_type == crate::TestType::Method)
            .count()
    }
}

/// A candidate file that produced no tests
#[derive(Debug, Clone, Serialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Outcome of a sweep: files with tests and the candidates passed over
#[derive(Debug, Clone, Default, Serialize)]
pub struct DiscoveryReport {
    pub files: Vec<DiscoveredFile>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedFile>,
}

impl DiscoveryReport {
    pub fn test_count(&self) -> usize {
        self.files.iter().map(DiscoveredFile::test_count).sum()
    }

    /// Skipped files whose reason is a read or parse failure
    pub fn failures(&self) -> impl Iterator<Item = &SkippedFile> {
        self.skipped
            .iter()
            .filter(|skipped| skipped.reason != NO_TESTS)
    }
}

const NO_TESTS: &str = "no tests found";

/// List candidate test files, sorted by path
pub fn collect_test_files(settings: &Settings) -> DiscoveryResult<Vec<PathBuf>> {
    let root = settings.resolved_test_root();
    let mut files = Vec::new();

    for include in &settings.discovery.include {
        let dir = root.join(include);
        if !dir.is_dir() {
            debug!("skipping missing include directory {}", dir.display());
            continue;
        }
        files.extend(walk_dir(&dir, settings)?);
    }

    files.sort();
    files.dedup();
    Ok(files)
}

fn walk_dir(dir: &Path, settings: &Settings) -> DiscoveryResult<Vec<PathBuf>> {
    let walk_error = |reason: String| DiscoveryError::Walk {
        path: dir.to_path_buf(),
        reason,
    };

    let mut overrides = OverrideBuilder::new(dir);
    for pattern in &settings.discovery.ignore_patterns {
        overrides
            .add(&format!("!{pattern}"))
            .map_err(|e| walk_error(e.to_string()))?;
    }
    let overrides = overrides.build().map_err(|e| walk_error(e.to_string()))?;

    let mut files = Vec::new();
    for entry in WalkBuilder::new(dir).overrides(overrides).build() {
        let entry = entry.map_err(|e| walk_error(e.to_string()))?;
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        let path = entry.into_path();
        if is_test_file(&path, &settings.discovery.suffixes) {
            files.push(path);
        }
    }
    Ok(files)
}

fn is_test_file(path: &Path, suffixes: &[String]) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| suffixes.iter().any(|suffix| name.ends_with(suffix.as_str())))
}

/// Parse the given files with `parser`, sorting them into found and skipped
pub async fn discover_files(parser: &mut TestParser, files: &[PathBuf]) -> DiscoveryReport {
    let mut report = DiscoveryReport::default();
    for path in files {
        let reason = match parser.try_parse_file(path).await {
            Ok(Some(tests)) => {
                report.files.push(DiscoveredFile {
                    path: path.clone(),
                    tests,
                });
                continue;
            }
            Ok(None) => NO_TESTS.to_string(),
            Err(e) => e.to_string(),
        };
        debug!("skipping {}: {reason}", path.display());
        report.skipped.push(SkippedFile {
            path: path.clone(),
            reason,
        });
    }
    report
}

/// Discover all tests under the configured test root
pub async fn discover(settings: &Settings) -> DiscoveryResult<DiscoveryReport> {
    let files = collect_test_files(settings)?;
    let mut parser = TestParser::from_settings(settings).context("Failed to create test parser")?;

    let report = discover_files(&mut parser, &files).await;
    info!(
        "discovered {} test file(s) out of {} candidate(s), {} unreadable",
        report.files.len(),
        files.len(),
        report.failures().count()
    );
    Ok(report)
}
