//! Format definitions for CLI output.
//!
//! Provides the JSON envelope used by `--json` and the indented text
//! rendering of test trees.

use crate::discovery::DiscoveredFile;
use crate::error::DiscoveryError;
use crate::io::exit_code::ExitCode;
use crate::TestDefinition;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Output format for CLI commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text (default)
    Text,
    /// JSON for tool integration
    Json,
}

impl OutputFormat {
    /// Create format from JSON flag.
    #[must_use]
    pub fn from_json_flag(json: bool) -> Self {
        if json { Self::Json } else { Self::Text }
    }
}

/// Standard JSON response format.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonResponse<T = serde_json::Value>
where
    T: Serialize,
{
    /// Status: "success" or "error"
    pub status: String,

    /// Result code (e.g., "OK", "NOT_FOUND", "PARSE_ERROR")
    pub code: String,

    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    /// Error details and suggestions (only for errors)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetails>,

    /// Exit code for shell scripts
    pub exit_code: u8,
}

/// Error details for JSON responses.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub suggestions: Vec<String>,
}

impl<T> JsonResponse<T>
where
    T: Serialize,
{
    pub fn success(data: T) -> Self {
        Self {
            status: "success".to_string(),
            code: "OK".to_string(),
            message: "Operation completed successfully".to_string(),
            data: Some(data),
            error: None,
            exit_code: ExitCode::Success as u8,
        }
    }
}

impl JsonResponse<serde_json::Value> {
    /// Create a response for a file or directory without tests.
    pub fn not_found(what: &str) -> Self {
        Self {
            status: "error".to_string(),
            code: "NOT_FOUND".to_string(),
            message: format!("No tests found in {what}"),
            data: None,
            error: Some(ErrorDetails {
                suggestions: vec![
                    "Check that the file declares a TestCase subclass or Pest tests".to_string(),
                ],
            }),
            exit_code: ExitCode::NotFound as u8,
        }
    }

    /// Create an error response from DiscoveryError.
    pub fn from_error(error: &DiscoveryError) -> Self {
        Self {
            status: "error".to_string(),
            code: error.status_code(),
            message: error.to_string(),
            data: None,
            error: Some(ErrorDetails {
                suggestions: error
                    .recovery_suggestions()
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            }),
            exit_code: ExitCode::from_error(error) as u8,
        }
    }
}

/// Indented text rendering of a test tree
pub struct TestTree<'a>(pub &'a [TestDefinition]);

impl fmt::Display for TestTree<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for root in self.0 {
            for test in root.iter() {
                let indent = "  ".repeat(test.depth);
                write!(
                    f,
                    "{indent}{:<9} {} (line {})",
                    test.test_type.as_str(),
                    test.label,
                    test.start.line
                )?;
                if test.annotations.skipped {
                    write!(f, " [skipped]")?;
                }
                if test.annotations.incomplete {
                    write!(f, " [incomplete]")?;
                }
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for DiscoveredFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} ({} tests)", self.path.display(), self.test_count())?;
        write!(f, "{}", TestTree(&self.tests))
    }
}
