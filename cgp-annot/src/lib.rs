//! Codegen Pipeline - Block Annotation Import
//! 
//! Loads timing annotations produced by an external analysis tool (local
//! worst-case cost and criticality per basic block) and answers read-only
//! queries from later passes. Absence of data is an ordinary answer, never
//! an error.

pub mod document;
pub mod importer;
pub mod source;

pub use cgp_common::LookupPolicy;
pub use document::{AnnotationDocument, BlockFacts, FunctionRecord};
pub use importer::{AnnotationImporter, LoadSummary};
pub use source::{DocumentSource, InMemorySource, JsonFileSource};
