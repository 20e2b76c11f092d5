//! Module-wide artifact directory
//!
//! Holds the artifacts that were persisted on release, keyed by the
//! function they were lowered from. The directory is the sole owner of
//! every artifact it stores.

use crate::artifact::LoweredArtifact;
use cgp_common::FunctionId;
use log::{debug, trace};
use std::collections::HashMap;

#[derive(Debug)]
pub struct ArtifactDirectory<B> {
    /// Module currently being processed
    module: Option<String>,
    entries: HashMap<FunctionId, LoweredArtifact<B>>,
}

impl<B> ArtifactDirectory<B> {
    pub fn new() -> Self {
        Self {
            module: None,
            entries: HashMap::new(),
        }
    }

    pub fn set_module(&mut self, name: &str) {
        self.module = Some(name.to_string());
    }

    pub fn module_name(&self) -> Option<&str> {
        self.module.as_deref()
    }

    pub fn lookup(&self, unit: &FunctionId) -> Option<&LoweredArtifact<B>> {
        trace!("Directory lookup for '{}'", unit);
        self.entries.get(unit)
    }

    pub fn contains(&self, unit: &FunctionId) -> bool {
        self.entries.contains_key(unit)
    }

    /// Take ownership of `artifact`, keyed by its unit. Returns the entry it replaced.
    pub fn store(&mut self, artifact: LoweredArtifact<B>) -> Option<LoweredArtifact<B>> {
        debug!("Directory stores artifact #{} for '{}'", artifact.number(), artifact.unit());
        self.entries.insert(artifact.unit().clone(), artifact)
    }

    /// Remove the entry for `unit` and hand it back to the caller
    pub fn remove(&mut self, unit: &FunctionId) -> Option<LoweredArtifact<B>> {
        self.entries.remove(unit)
    }

    /// Drop every stored artifact, returning how many there were
    pub fn clear(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        count
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn units(&self) -> impl Iterator<Item = &FunctionId> {
        self.entries.keys()
    }
}

impl<B> Default for ArtifactDirectory<B> {
    fn default() -> Self {
        Self::new()
    }
}
