//! Error handling for the codegen pipeline
//!
//! This module defines the recoverable error type shared by the pipeline
//! crates and the diagnostics reporter used to surface non-fatal problems
//! (such as an annotation document that could not be read) without
//! aborting the run.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Recoverable pipeline error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    #[error("IO error reading {location}: {message}")]
    IoError { location: String, message: String },

    #[error("Parse error in {location}: {message}")]
    DocumentParse { location: String, message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },
}

impl PipelineError {
    /// Create an IO error for the given location
    pub fn io_error(location: &str, err: &std::io::Error) -> Self {
        PipelineError::IoError {
            location: location.to_string(),
            message: err.to_string(),
        }
    }

    /// Create a parse error for the given location
    pub fn parse_error(location: &str, message: String) -> Self {
        PipelineError::DocumentParse {
            location: location.to_string(),
            message,
        }
    }

    /// Create a configuration error
    pub fn config_error(message: String) -> Self {
        PipelineError::ConfigError { message }
    }

    /// The document or file this error refers to, if any
    pub fn location(&self) -> Option<&str> {
        match self {
            PipelineError::IoError { location, .. } | PipelineError::DocumentParse { location, .. } => {
                Some(location.as_str())
            }
            PipelineError::ConfigError { .. } => None,
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// A diagnostic message with an optional origin and severity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    /// Document or file the diagnostic is about
    pub origin: Option<String>,
    pub notes: Vec<String>,
}

impl Diagnostic {
    fn with_severity(severity: Severity, message: String) -> Self {
        Self {
            severity,
            message,
            origin: None,
            notes: Vec::new(),
        }
    }

    pub fn error(message: String) -> Self {
        Self::with_severity(Severity::Error, message)
    }

    pub fn warning(message: String) -> Self {
        Self::with_severity(Severity::Warning, message)
    }

    pub fn at(mut self, origin: &str) -> Self {
        self.origin = Some(origin.to_string());
        self
    }

    pub fn with_note(mut self, note: String) -> Self {
        self.notes.push(note);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.origin {
            Some(origin) => write!(f, "{}: {}: {}", self.severity, origin, self.message)?,
            None => write!(f, "{}: {}", self.severity, self.message)?,
        }

        for note in &self.notes {
            write!(f, "\n  note: {}", note)?;
        }

        Ok(())
    }
}

/// Error reporter for collecting and displaying diagnostics
#[derive(Debug, Clone)]
pub struct ErrorReporter {
    diagnostics: Vec<Diagnostic>,
    error_count: usize,
    warning_count: usize,
}

impl ErrorReporter {
    pub fn new() -> Self {
        Self {
            diagnostics: Vec::new(),
            error_count: 0,
            warning_count: 0,
        }
    }

    /// Record a diagnostic and return it for further decoration
    pub fn report(&mut self, diagnostic: Diagnostic) -> &mut Diagnostic {
        match diagnostic.severity {
            Severity::Error => self.error_count += 1,
            Severity::Warning => self.warning_count += 1,
        }
        let index = self.diagnostics.len();
        self.diagnostics.push(diagnostic);
        &mut self.diagnostics[index]
    }

    /// Check if any errors have been reported
    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn warning_count(&self) -> usize {
        self.warning_count
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Print all diagnostics to stderr
    pub fn print_diagnostics(&self) {
        for diagnostic in &self.diagnostics {
            eprintln!("{}", diagnostic);
        }
    }

    /// Create a summary string
    pub fn summary(&self) -> String {
        match (self.error_count, self.warning_count) {
            (0, 0) => "No errors or warnings".to_string(),
            (0, w) => format!("{} warning{}", w, if w == 1 { "" } else { "s" }),
            (e, 0) => format!("{} error{}", e, if e == 1 { "" } else { "s" }),
            (e, w) => format!(
                "{} error{} and {} warning{}",
                e,
                if e == 1 { "" } else { "s" },
                w,
                if w == 1 { "" } else { "s" }
            ),
        }
    }
}

impl Default for ErrorReporter {
    fn default() -> Self {
        Self::new()
    }
}
