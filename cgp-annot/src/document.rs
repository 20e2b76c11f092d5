//! Annotation document model
//!
//! On disk a document is JSON:
//!
//! ```json
//! { "functions": [
//!     { "name": "foo",
//!       "blocks": [ { "name": "bb0", "local_cost": 42, "criticality": 0.75 } ] } ] }
//! ```
//!
//! After parsing, records are indexed by function name and block label.

use cgp_common::{BlockId, BlockKey, FunctionId, PipelineError};
use log::warn;
use serde::Deserialize;
use std::collections::HashMap;

/// Facts attached to one basic block. A missing field means "no data".
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BlockFacts {
    /// Worst-case cost of the block itself, in cycles
    pub local_cost: Option<u64>,
    /// Criticality weight; the scale is up to the producer
    pub criticality: Option<f64>,
}

#[derive(Deserialize)]
struct RawDocument {
    #[serde(default)]
    functions: Vec<RawFunction>,
}

#[derive(Deserialize)]
struct RawFunction {
    name: FunctionId,
    #[serde(default)]
    blocks: Vec<RawBlock>,
}

#[derive(Deserialize)]
struct RawBlock {
    name: BlockId,
    local_cost: Option<u64>,
    criticality: Option<f64>,
}

/// Records for one function
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FunctionRecord {
    blocks: HashMap<BlockId, BlockFacts>,
}

impl FunctionRecord {
    pub fn block(&self, id: &BlockId) -> Option<&BlockFacts> {
        self.blocks.get(id)
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnnotationDocument {
    origin: String,
    functions: HashMap<FunctionId, FunctionRecord>,
}

impl AnnotationDocument {
    pub fn new(origin: &str) -> Self {
        Self {
            origin: origin.to_string(),
            functions: HashMap::new(),
        }
    }

    /// Parse a document. `origin` names it in diagnostics.
    ///
    /// A function listed twice has its blocks merged; a block listed twice
    /// keeps its first occurrence.
    pub fn from_json(origin: &str, text: &str) -> Result<Self, PipelineError> {
        let raw: RawDocument =
            serde_json::from_str(text).map_err(|e| PipelineError::parse_error(origin, e.to_string()))?;

        let mut document = Self::new(origin);
        for function in raw.functions {
            document.insert_function(function.name.clone());
            for block in function.blocks {
                let key = BlockKey::new(function.name.clone(), block.name);
                let facts = BlockFacts {
                    local_cost: block.local_cost,
                    criticality: block.criticality,
                };
                if !document.insert_block(key.clone(), facts) {
                    warn!("{}: duplicate record for block {}, keeping the first", origin, key);
                }
            }
        }
        Ok(document)
    }

    /// Add a function-level record. Returns false if one already existed.
    pub fn insert_function(&mut self, function: FunctionId) -> bool {
        if self.functions.contains_key(&function) {
            return false;
        }
        self.functions.insert(function, FunctionRecord::default());
        true
    }

    /// Add a block record. Returns false, leaving the existing facts
    /// untouched, if the block already had one.
    pub fn insert_block(&mut self, key: BlockKey, facts: BlockFacts) -> bool {
        let record = self.functions.entry(key.function).or_default();
        if record.blocks.contains_key(&key.block) {
            return false;
        }
        record.blocks.insert(key.block, facts);
        true
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn function(&self, id: &FunctionId) -> Option<&FunctionRecord> {
        self.functions.get(id)
    }

    pub fn block(&self, key: &BlockKey) -> Option<&BlockFacts> {
        self.functions.get(&key.function)?.block(&key.block)
    }

    pub fn function_count(&self) -> usize {
        self.functions.len()
    }

    pub fn block_count(&self) -> usize {
        self.functions.values().map(FunctionRecord::block_count).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_document() {
        let text = r#"{
            "functions": [
                { "name": "foo", "blocks": [
                    { "name": "bb0", "local_cost": 42, "criticality": 0.5 },
                    { "name": "bb1", "local_cost": 0 }
                ]},
                { "name": "bar" }
            ]
        }"#;

        let doc = AnnotationDocument::from_json("t.json", text).expect("valid document");
        assert_eq!(doc.origin(), "t.json");
        assert_eq!(doc.function_count(), 2);
        assert_eq!(doc.block_count(), 2);

        assert_eq!(
            doc.block(&BlockKey::new("foo", "bb0")),
            Some(&BlockFacts { local_cost: Some(42), criticality: Some(0.5) })
        );
        assert_eq!(
            doc.block(&BlockKey::new("foo", "bb1")),
            Some(&BlockFacts { local_cost: Some(0), criticality: None })
        );

        let bar = doc.function(&FunctionId::new("bar")).expect("function-level record");
        assert_eq!(bar.block_count(), 0);
        assert_eq!(doc.block(&BlockKey::new("bar", "bb0")), None);
    }

    #[test]
    fn test_duplicate_block_keeps_first() {
        let text = r#"{
            "functions": [
                { "name": "foo", "blocks": [ { "name": "bb0", "local_cost": 7 } ] },
                { "name": "foo", "blocks": [
                    { "name": "bb0", "local_cost": 8 },
                    { "name": "bb1", "local_cost": 9 }
                ]}
            ]
        }"#;

        let doc = AnnotationDocument::from_json("dup.json", text).expect("valid document");
        assert_eq!(doc.function_count(), 1);
        assert_eq!(doc.block(&BlockKey::new("foo", "bb0")).and_then(|f| f.local_cost), Some(7));
        assert_eq!(doc.block(&BlockKey::new("foo", "bb1")).and_then(|f| f.local_cost), Some(9));
    }

    #[test]
    fn test_empty_object_is_an_empty_document() {
        let doc = AnnotationDocument::from_json("empty.json", "{}").expect("valid document");
        assert_eq!(doc.function_count(), 0);
    }

    #[test]
    fn test_malformed_document() {
        let err = AnnotationDocument::from_json("bad.json", r#"{ "functions": [ { "blocks": [] } ] }"#)
            .unwrap_err();
        assert_eq!(err.location(), Some("bad.json"));

        let err = AnnotationDocument::from_json("neg.json", r#"{ "functions": [ { "name": "f",
            "blocks": [ { "name": "b", "local_cost": -1 } ] } ] }"#)
        .unwrap_err();
        assert!(matches!(err, PipelineError::DocumentParse { .. }));
    }
}
