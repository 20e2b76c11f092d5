//! Common types used throughout the pipeline
//!
//! Functions are addressed by name and basic blocks by their label inside
//! the owning function. Both identities are stable for the lifetime of a
//! module and serve as lookup keys for the artifact directory and the
//! annotation store.

use crate::error::PipelineError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Stable identity of a compilation unit (the function's symbol name)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FunctionId(String);

impl FunctionId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FunctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FunctionId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for FunctionId {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// Label of a basic block. Only unique within its owning function.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(String);

impl BlockId {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BlockId {
    fn from(label: &str) -> Self {
        Self::new(label)
    }
}

impl From<String> for BlockId {
    fn from(label: String) -> Self {
        Self(label)
    }
}

/// Module-wide key of a basic block: the owning function plus the block label
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockKey {
    pub function: FunctionId,
    pub block: BlockId,
}

impl BlockKey {
    pub fn new(function: impl Into<FunctionId>, block: impl Into<BlockId>) -> Self {
        Self {
            function: function.into(),
            block: block.into(),
        }
    }
}

impl fmt::Display for BlockKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.function, self.block)
    }
}

/// A compilation unit: one function of the module being processed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Function {
    pub name: FunctionId,
    /// Block labels in layout order
    #[serde(default)]
    pub blocks: Vec<BlockId>,
    /// Declared but defined elsewhere; never lowered
    #[serde(default)]
    pub is_external: bool,
}

impl Function {
    pub fn new(name: impl Into<FunctionId>) -> Self {
        Self {
            name: name.into(),
            blocks: Vec::new(),
            is_external: false,
        }
    }

    pub fn with_blocks<I, B>(mut self, blocks: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: Into<BlockId>,
    {
        self.blocks.extend(blocks.into_iter().map(Into::into));
        self
    }

    pub fn id(&self) -> &FunctionId {
        &self.name
    }

    /// Module-wide keys for every block of this function, in layout order
    pub fn block_keys(&self) -> impl Iterator<Item = BlockKey> + '_ {
        self.blocks
            .iter()
            .map(move |block| BlockKey::new(self.name.clone(), block.clone()))
    }
}

/// A module description as handed to the pipeline by the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    pub name: String,
    #[serde(default)]
    pub functions: Vec<Function>,
}

impl Module {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            functions: Vec::new(),
        }
    }

    pub fn add_function(&mut self, function: Function) {
        self.functions.push(function);
    }

    /// Functions with a body, in module order
    pub fn defined_functions(&self) -> impl Iterator<Item = &Function> {
        self.functions.iter().filter(|f| !f.is_external)
    }

    /// Parse a module description from JSON text
    pub fn from_json(origin: &str, text: &str) -> Result<Self, PipelineError> {
        serde_json::from_str(text).map_err(|e| PipelineError::parse_error(origin, e.to_string()))
    }

    /// Read and parse a module description file
    pub fn load(path: &Path) -> Result<Self, PipelineError> {
        let origin = path.display().to_string();
        let text = std::fs::read_to_string(path).map_err(|e| PipelineError::io_error(&origin, &e))?;
        Self::from_json(&origin, &text)
    }
}
