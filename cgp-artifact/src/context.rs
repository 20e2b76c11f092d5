//! Per-module state shared by every unit-processing step
//!
//! The context bundles the module-wide artifact directory and the numbering
//! counter. The host owns it and hands it to each lifecycle call; a context
//! built with [`ModuleContext::without_directory`] models a pipeline in which
//! the directory is unreachable, so nothing can be persisted.

use crate::directory::ArtifactDirectory;
use crate::numbering::ModuleNumbering;
use log::{info, warn};

#[derive(Debug)]
pub struct ModuleContext<B> {
    directory: Option<ArtifactDirectory<B>>,
    numbering: ModuleNumbering,
}

impl<B> ModuleContext<B> {
    /// Context with a reachable artifact directory
    pub fn new() -> Self {
        Self {
            directory: Some(ArtifactDirectory::new()),
            numbering: ModuleNumbering::new(),
        }
    }

    pub fn without_directory() -> Self {
        Self {
            directory: None,
            numbering: ModuleNumbering::new(),
        }
    }

    /// Host hook, run once per module before any function is processed
    pub fn begin_module(&mut self, name: &str) {
        info!("Beginning module '{}'", name);
        if let Some(directory) = self.directory.as_mut() {
            let stale = directory.clear();
            if stale > 0 {
                warn!("Dropping {} artifacts left over from the previous module", stale);
            }
            directory.set_module(name);
        }
        self.numbering.reset();
    }

    /// Drop every persisted artifact; returns how many were dropped
    pub fn end_module(&mut self) -> usize {
        let dropped = self.directory.as_mut().map_or(0, |directory| directory.clear());
        info!(
            "Module complete: {} artifacts created, {} persisted artifacts dropped",
            self.numbering.peek(),
            dropped
        );
        dropped
    }

    pub fn directory(&self) -> Option<&ArtifactDirectory<B>> {
        self.directory.as_ref()
    }

    pub fn directory_mut(&mut self) -> Option<&mut ArtifactDirectory<B>> {
        self.directory.as_mut()
    }

    pub fn numbering(&self) -> &ModuleNumbering {
        &self.numbering
    }

    pub(crate) fn numbering_mut(&mut self) -> &mut ModuleNumbering {
        &mut self.numbering
    }
}

impl<B> Default for ModuleContext<B> {
    fn default() -> Self {
        Self::new()
    }
}
