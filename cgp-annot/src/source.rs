//! Document sources
//!
//! A [`DocumentSource`] turns a configured location into a parsed
//! [`AnnotationDocument`]. Failing to do so is reported as a
//! [`PipelineError`]; the importer decides what to make of it.

use crate::document::AnnotationDocument;
use cgp_common::PipelineError;
use log::debug;
use std::collections::HashMap;

pub trait DocumentSource {
    fn load(&self, location: &str) -> Result<AnnotationDocument, PipelineError>;
}

/// Reads locations as paths to JSON files
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFileSource;

impl DocumentSource for JsonFileSource {
    fn load(&self, location: &str) -> Result<AnnotationDocument, PipelineError> {
        debug!("Reading annotation document '{}'", location);
        let text = std::fs::read_to_string(location).map_err(|e| PipelineError::io_error(location, &e))?;
        AnnotationDocument::from_json(location, &text)
    }
}

/// Serves documents from memory, keyed by location
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    documents: HashMap<String, String>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, location: &str, text: &str) -> Self {
        self.insert(location, text);
        self
    }

    pub fn insert(&mut self, location: &str, text: &str) {
        self.documents.insert(location.to_string(), text.to_string());
    }
}

impl DocumentSource for InMemorySource {
    fn load(&self, location: &str) -> Result<AnnotationDocument, PipelineError> {
        let text = self.documents.get(location).ok_or_else(|| PipelineError::IoError {
            location: location.to_string(),
            message: "no such document".to_string(),
        })?;
        AnnotationDocument::from_json(location, text)
    }
}
