//! The lowered artifact and the collaborator that builds its body

use cgp_common::{Function, FunctionId};

/// Code-generation collaborator
///
/// Produces the internal structure of a lowered artifact. The lifecycle
/// manager treats the body as opaque; it only decides when one is built.
pub trait CodeGenerator {
    type Body;

    /// Build the body for `unit`. `number` is the artifact's sequence number
    /// within the module and is final.
    fn generate(&self, unit: &Function, number: u32) -> Self::Body;
}

/// Expensive per-function representation, numbered once at creation
#[derive(Debug)]
pub struct LoweredArtifact<B> {
    unit: FunctionId,
    number: u32,
    body: B,
}

impl<B> LoweredArtifact<B> {
    pub(crate) fn new(unit: FunctionId, number: u32, body: B) -> Self {
        Self { unit, number, body }
    }

    /// The function this artifact was lowered from
    pub fn unit(&self) -> &FunctionId {
        &self.unit
    }

    /// Sequence number within the module
    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn body(&self) -> &B {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut B {
        &mut self.body
    }
}
