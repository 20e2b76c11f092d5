//! Lowered artifact lifecycle
//!
//! The manager holds at most one checked-out artifact. `acquire` moves the
//! artifact for a function into that slot, either by taking a persisted one
//! out of the module directory or by building a fresh one; `release` moves
//! it back into the directory or drops it. The host calls the two strictly
//! alternating, one function at a time.
//!
//! ```text
//!            acquire(unit)
//!   Idle ─────────────────────▶ CheckedOut
//!     ▲                             │
//!     └─────────────────────────────┘
//!        release() / finish()
//! ```
//!
//! Calling `acquire` while checked out, `release` while idle, or dropping a
//! manager that still holds an artifact are contract violations and panic.

use crate::artifact::{CodeGenerator, LoweredArtifact};
use crate::context::ModuleContext;
use cgp_common::{Function, FunctionId, PipelineConfig};
use log::{debug, trace};
use thiserror::Error;

/// Fatal lifecycle error; the host must abort the run
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("Creating a lowered artifact for '{unit}' is not supported without a code generator")]
    UnsupportedRecreation { unit: FunctionId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LifecycleOptions {
    /// Discard an existing directory entry and build a fresh artifact.
    /// Only honored by build-capable managers.
    pub force_rebuild: bool,
    /// Hand the artifact to the directory on release instead of dropping it
    pub preserve_on_release: bool,
}

impl LifecycleOptions {
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            force_rebuild: config.force_rebuild,
            preserve_on_release: config.preserve_on_release,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Idle,
    CheckedOut,
}

/// What happened to an artifact when it left the checked-out slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseOutcome {
    /// The artifact was dropped
    Destroyed { unit: FunctionId, number: u32 },
    /// The directory now owns the artifact
    Persisted { unit: FunctionId, number: u32 },
}

impl ReleaseOutcome {
    pub fn unit(&self) -> &FunctionId {
        match self {
            ReleaseOutcome::Destroyed { unit, .. } | ReleaseOutcome::Persisted { unit, .. } => unit,
        }
    }

    pub fn number(&self) -> u32 {
        match self {
            ReleaseOutcome::Destroyed { number, .. } | ReleaseOutcome::Persisted { number, .. } => *number,
        }
    }

    pub fn is_persisted(&self) -> bool {
        matches!(self, ReleaseOutcome::Persisted { .. })
    }
}

pub struct LifecycleManager<'g, G: CodeGenerator> {
    /// Build capability; `None` means the manager only hands out existing artifacts
    generator: Option<&'g G>,
    options: LifecycleOptions,
    current: Option<LoweredArtifact<G::Body>>,
}

impl<'g, G: CodeGenerator> LifecycleManager<'g, G> {
    /// Build-capable manager
    pub fn with_generator(generator: &'g G, options: LifecycleOptions) -> Self {
        Self {
            generator: Some(generator),
            options,
            current: None,
        }
    }

    /// Manager that can only reuse artifacts already in the directory
    pub fn consume_only(options: LifecycleOptions) -> Self {
        Self {
            generator: None,
            options,
            current: None,
        }
    }

    pub fn options(&self) -> LifecycleOptions {
        self.options
    }

    pub fn can_build(&self) -> bool {
        self.generator.is_some()
    }

    pub fn state(&self) -> LifecycleState {
        if self.current.is_some() {
            LifecycleState::CheckedOut
        } else {
            LifecycleState::Idle
        }
    }

    pub fn is_checked_out(&self) -> bool {
        self.current.is_some()
    }

    pub fn current(&self) -> Option<&LoweredArtifact<G::Body>> {
        self.current.as_ref()
    }

    pub fn current_mut(&mut self) -> Option<&mut LoweredArtifact<G::Body>> {
        self.current.as_mut()
    }

    /// Check out the artifact for `unit`, building it if needed.
    ///
    /// A persisted artifact is reused with its original number unless the
    /// manager is build-capable and `force_rebuild` is set, in which case the
    /// entry is discarded and a new artifact takes the next number. A manager
    /// without a generator fails with [`LifecycleError::UnsupportedRecreation`]
    /// when there is nothing to reuse.
    ///
    /// # Panics
    ///
    /// Panics if an artifact is already checked out.
    pub fn acquire(
        &mut self,
        cx: &mut ModuleContext<G::Body>,
        unit: &Function,
    ) -> Result<&mut LoweredArtifact<G::Body>, LifecycleError> {
        if let Some(current) = &self.current {
            panic!(
                "acquire('{}') while the artifact for '{}' is still checked out",
                unit.id(),
                current.unit()
            );
        }

        let id = unit.id();
        let mut existing = cx.directory_mut().and_then(|directory| directory.remove(id));

        if self.generator.is_some() && self.options.force_rebuild {
            if let Some(stale) = existing.take() {
                debug!("Discarding artifact #{} for '{}' (force rebuild)", stale.number(), id);
            }
        }

        let artifact = match existing {
            Some(artifact) => {
                debug!("Reusing artifact #{} for '{}'", artifact.number(), id);
                artifact
            }
            None => {
                let generator = self
                    .generator
                    .ok_or_else(|| LifecycleError::UnsupportedRecreation { unit: id.clone() })?;
                let number = cx.numbering_mut().next_number();
                debug!("Building artifact #{} for '{}'", number, id);
                LoweredArtifact::new(id.clone(), number, generator.generate(unit, number))
            }
        };

        Ok(self.current.insert(artifact))
    }

    /// Release the checked-out artifact.
    ///
    /// # Panics
    ///
    /// Panics if nothing is checked out.
    pub fn release(&mut self, cx: &mut ModuleContext<G::Body>) -> ReleaseOutcome {
        let Some(artifact) = self.current.take() else {
            panic!("release() called while no artifact is checked out");
        };
        Self::dispose(artifact, self.options.preserve_on_release, cx)
    }

    /// Final teardown: release whatever is still checked out and consume the manager
    pub fn finish(mut self, cx: &mut ModuleContext<G::Body>) -> Option<ReleaseOutcome> {
        let preserve = self.options.preserve_on_release;
        self.current
            .take()
            .map(|artifact| Self::dispose(artifact, preserve, cx))
    }

    fn dispose(
        artifact: LoweredArtifact<G::Body>,
        preserve: bool,
        cx: &mut ModuleContext<G::Body>,
    ) -> ReleaseOutcome {
        let unit = artifact.unit().clone();
        let number = artifact.number();

        match cx.directory_mut() {
            Some(directory) if preserve => {
                if let Some(replaced) = directory.store(artifact) {
                    trace!("Replaced stale artifact #{} for '{}'", replaced.number(), unit);
                }
                debug!("Persisted artifact #{} for '{}'", number, unit);
                ReleaseOutcome::Persisted { unit, number }
            }
            Some(directory) => {
                if let Some(stale) = directory.remove(&unit) {
                    trace!("Removed stale artifact #{} for '{}'", stale.number(), unit);
                }
                drop(artifact);
                debug!("Destroyed artifact #{} for '{}'", number, unit);
                ReleaseOutcome::Destroyed { unit, number }
            }
            None => {
                drop(artifact);
                debug!("Destroyed artifact #{} for '{}' (no directory)", number, unit);
                ReleaseOutcome::Destroyed { unit, number }
            }
        }
    }
}

impl<G: CodeGenerator> Drop for LifecycleManager<'_, G> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            return;
        }
        if let Some(artifact) = &self.current {
            panic!(
                "lifecycle manager dropped while the artifact for '{}' is still checked out",
                artifact.unit()
            );
        }
    }
}
