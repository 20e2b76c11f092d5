//! Pipeline configuration
//!
//! Options recognized by the artifact lifecycle and the annotation importer.
//! A configuration can be loaded from a JSON file; keys that are missing
//! take their default value, unknown keys are rejected.

use crate::error::PipelineError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Which annotation document answers a query when several carry a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupPolicy {
    /// Documents are consulted in load order
    #[default]
    FirstMatch,
    /// Documents are consulted in reverse load order, so later ones override
    LastMatch,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Discard and rebuild existing artifacts instead of reusing them
    pub force_rebuild: bool,
    /// Persist artifacts in the module directory on release instead of dropping them
    pub preserve_on_release: bool,
    /// Annotation documents, consulted in this order
    pub document_locations: Vec<String>,
    pub lookup_policy: LookupPolicy,
}

impl PipelineConfig {
    pub fn from_json(text: &str) -> Result<Self, PipelineError> {
        serde_json::from_str(text).map_err(|e| PipelineError::config_error(e.to_string()))
    }

    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> Result<Self, PipelineError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| PipelineError::io_error(&path.display().to_string(), &e))?;
        Self::from_json(&text)
    }

    pub fn with_document(mut self, location: &str) -> Self {
        self.document_locations.push(location.to_string());
        self
    }
}
