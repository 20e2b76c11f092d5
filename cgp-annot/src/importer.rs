//! Annotation importer
//!
//! Loads the configured documents once, then serves point queries keyed by
//! function and block. Loaded documents are never modified; every query
//! takes `&self`.

use crate::document::{AnnotationDocument, BlockFacts};
use crate::source::{DocumentSource, JsonFileSource};
use cgp_common::{BlockKey, Diagnostic, ErrorReporter, FunctionId, LookupPolicy, PipelineConfig};
use log::{info, trace, warn};

/// Result of [`AnnotationImporter::initialize`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadSummary {
    pub loaded: usize,
    pub skipped: usize,
}

#[derive(Debug)]
pub struct AnnotationImporter<S: DocumentSource = JsonFileSource> {
    locations: Vec<String>,
    policy: LookupPolicy,
    source: S,
    /// Load order is query order under `FirstMatch`
    documents: Vec<AnnotationDocument>,
    initialized: bool,
    summary: LoadSummary,
    reporter: ErrorReporter,
}

impl AnnotationImporter<JsonFileSource> {
    /// Importer reading the configured locations as JSON files
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::with_source(config, JsonFileSource)
    }
}

impl<S: DocumentSource> AnnotationImporter<S> {
    pub fn new(locations: Vec<String>, source: S) -> Self {
        Self {
            locations,
            policy: LookupPolicy::default(),
            source,
            documents: Vec::new(),
            initialized: false,
            summary: LoadSummary::default(),
            reporter: ErrorReporter::new(),
        }
    }

    pub fn with_source(config: &PipelineConfig, source: S) -> Self {
        Self::new(config.document_locations.clone(), source).with_policy(config.lookup_policy)
    }

    pub fn with_policy(mut self, policy: LookupPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Load every configured location, once.
    ///
    /// A location that cannot be read or parsed is skipped with a warning
    /// diagnostic; the remaining locations are still loaded. Calls after the
    /// first return the first call's summary without touching any source.
    pub fn initialize(&mut self) -> LoadSummary {
        if self.initialized {
            trace!("Annotation importer already initialized");
            return self.summary;
        }

        let mut summary = LoadSummary::default();
        for location in &self.locations {
            match self.source.load(location) {
                Ok(document) => {
                    info!(
                        "Loaded annotations from '{}' ({} functions, {} blocks)",
                        location,
                        document.function_count(),
                        document.block_count()
                    );
                    self.documents.push(document);
                    summary.loaded += 1;
                }
                Err(err) => {
                    warn!("Skipping annotation document '{}': {}", location, err);
                    self.reporter.report(
                        Diagnostic::warning("annotation document skipped".to_string())
                            .at(location)
                            .with_note(err.to_string()),
                    );
                    summary.skipped += 1;
                }
            }
        }

        if self.locations.is_empty() {
            info!("No annotation documents configured");
        }

        self.initialized = true;
        self.summary = summary;
        summary
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// At least one document was loaded
    pub fn is_available(&self) -> bool {
        !self.documents.is_empty()
    }

    /// Any loaded document has a record for `function`, with or without block facts
    pub fn is_function_available(&self, function: &FunctionId) -> bool {
        self.documents.iter().any(|doc| doc.function(function).is_some())
    }

    /// Local worst-case cost of `block`, or `None` if no document knows it
    pub fn local_cost(&self, block: &BlockKey) -> Option<u64> {
        self.block_facts(block)?.local_cost
    }

    /// Criticality of `block`, or `None` if no document knows it
    pub fn criticality(&self, block: &BlockKey) -> Option<f64> {
        self.block_facts(block)?.criticality
    }

    /// The record that answers queries for `block` under the lookup policy.
    /// Records from different documents are never merged.
    pub fn block_facts(&self, block: &BlockKey) -> Option<&BlockFacts> {
        trace!("Annotation lookup for {}", block);
        match self.policy {
            LookupPolicy::FirstMatch => self.documents.iter().find_map(|doc| doc.block(block)),
            LookupPolicy::LastMatch => self.documents.iter().rev().find_map(|doc| doc.block(block)),
        }
    }

    pub fn policy(&self) -> LookupPolicy {
        self.policy
    }

    pub fn locations(&self) -> &[String] {
        &self.locations
    }

    pub fn documents(&self) -> &[AnnotationDocument] {
        &self.documents
    }

    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    /// Problems surfaced while loading
    pub fn diagnostics(&self) -> &ErrorReporter {
        &self.reporter
    }
}
