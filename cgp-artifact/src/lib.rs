//! Codegen Pipeline - Lowered Artifact Lifecycle
//! 
//! This crate owns the lazy build / cache / release cycle of the per-function
//! lowered artifact. Artifacts are produced by a [`CodeGenerator`], numbered
//! through the module's [`ModuleNumbering`] and optionally persisted in the
//! module-wide [`ArtifactDirectory`] between passes.

pub mod artifact;
pub mod context;
pub mod directory;
pub mod lifecycle;
pub mod numbering;

pub use artifact::{CodeGenerator, LoweredArtifact};
pub use context::ModuleContext;
pub use directory::ArtifactDirectory;
pub use lifecycle::{LifecycleError, LifecycleManager, LifecycleOptions, LifecycleState, ReleaseOutcome};
pub use numbering::ModuleNumbering;
