//! Rendering of parse and discovery results.
//!
//! Results go to stdout; notices about missing tests, skipped files and
//! errors go to stderr in text mode. In JSON mode every command prints a
//! single envelope on stdout, errors excepted.

use crate::definition::TestDefinition;
use crate::discovery::{DiscoveredFile, DiscoveryReport};
use crate::error::DiscoveryError;
use crate::io::exit_code::ExitCode;
use crate::io::format::{JsonResponse, OutputFormat};
use serde::Serialize;
use std::io::{self, Write};
use std::path::Path;

/// Writes command results in the selected format.
pub struct OutputManager {
    format: OutputFormat,
    stdout: Box<dyn Write>,
    stderr: Box<dyn Write>,
}

impl OutputManager {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            stdout: Box::new(io::stdout()),
            stderr: Box::new(io::stderr()),
        }
    }

    #[cfg(test)]
    pub fn new_with_writers(
        format: OutputFormat,
        stdout: Box<dyn Write>,
        stderr: Box<dyn Write>,
    ) -> Self {
        Self {
            format,
            stdout,
            stderr,
        }
    }

    fn json<T: Serialize>(&mut self, response: &JsonResponse<T>) -> io::Result<()> {
        writeln!(self.stdout, "{}", serde_json::to_string_pretty(response)?)
    }

    /// Result of parsing one file; `None` means it holds no tests.
    pub fn parsed(
        &mut self,
        path: &Path,
        tests: Option<Vec<TestDefinition>>,
    ) -> io::Result<ExitCode> {
        let Some(tests) = tests else {
            let what = path.display().to_string();
            match self.format {
                OutputFormat::Json => self.json(&JsonResponse::not_found(&what))?,
                OutputFormat::Text => writeln!(self.stderr, "No tests found in {what}")?,
            }
            return Ok(ExitCode::NotFound);
        };

        let file = DiscoveredFile {
            path: path.to_path_buf(),
            tests,
        };
        match self.format {
            OutputFormat::Json => self.json(&JsonResponse::success(&file))?,
            OutputFormat::Text => write!(self.stdout, "{file}")?,
        }
        Ok(ExitCode::Success)
    }

    /// Result of a discovery sweep over `searched`.
    ///
    /// Every test file is listed with its tree, followed by a summary.
    /// Candidates that failed to read or parse are listed with the reason.
    /// A sweep without test files exits with `NotFound`.
    pub fn report(&mut self, report: &DiscoveryReport, searched: &str) -> io::Result<ExitCode> {
        let code = if report.files.is_empty() {
            ExitCode::NotFound
        } else {
            ExitCode::Success
        };

        match self.format {
            OutputFormat::Json if report.files.is_empty() => {
                let mut response = JsonResponse::not_found(searched);
                response.data = Some(serde_json::to_value(report)?);
                self.json(&response)?;
            }
            OutputFormat::Json => self.json(&JsonResponse::success(report))?,
            OutputFormat::Text => {
                if report.files.is_empty() {
                    writeln!(self.stderr, "No tests found in {searched}")?;
                } else {
                    for file in &report.files {
                        writeln!(self.stdout, "{file}")?;
                    }
                    writeln!(
                        self.stdout,
                        "{} test(s) in {} file(s) under {searched}",
                        report.test_count(),
                        report.files.len()
                    )?;
                }
                for skipped in report.failures() {
                    writeln!(
                        self.stderr,
                        "Skipped {}: {}",
                        skipped.path.display(),
                        skipped.reason
                    )?;
                }
            }
        }
        Ok(code)
    }

    /// Report an error with its recovery suggestions.
    pub fn error(&mut self, error: &DiscoveryError) -> io::Result<ExitCode> {
        match self.format {
            OutputFormat::Json => {
                let response = JsonResponse::from_error(error);
                writeln!(self.stderr, "{}", serde_json::to_string_pretty(&response)?)?;
            }
            OutputFormat::Text => {
                writeln!(self.stderr, "Error: {error}")?;
                for suggestion in error.recovery_suggestions() {
                    writeln!(self.stderr, "  Suggestion: {suggestion}")?;
                }
            }
        }
        Ok(ExitCode::from_error(error))
    }
}
