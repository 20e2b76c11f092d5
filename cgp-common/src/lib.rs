//! Codegen Pipeline - Common Types and Utilities
//! 
//! This crate contains the identifiers, error definitions, diagnostics and
//! configuration shared by the artifact lifecycle, the annotation importer
//! and the driver.

pub mod config;
pub mod error;
pub mod types;

pub use config::{LookupPolicy, PipelineConfig};
pub use error::{Diagnostic, ErrorReporter, PipelineError, Severity};
pub use types::*;
