//! Host pipeline
//!
//! Drives the artifact lifecycle over every defined function of a module,
//! once per pass, and reads the imported block annotations while each
//! function's artifact is checked out.

use cgp_annot::{AnnotationImporter, DocumentSource};
use cgp_artifact::{CodeGenerator, LifecycleError, LifecycleManager, LifecycleOptions, ModuleContext};
use cgp_common::{BlockId, BlockKey, Function, Module, PipelineConfig};
use log::{debug, info};
use serde::Serialize;

/// Block layout of a lowered function
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutBody {
    pub blocks: Vec<BlockId>,
}

/// Lowers a function to its block layout
#[derive(Debug, Clone, Copy, Default)]
pub struct LayoutGenerator;

impl CodeGenerator for LayoutGenerator {
    type Body = LayoutBody;

    fn generate(&self, unit: &Function, number: u32) -> LayoutBody {
        debug!("Laying out '{}' as function #{} ({} blocks)", unit.id(), number, unit.blocks.len());
        LayoutBody {
            blocks: unit.blocks.clone(),
        }
    }
}

/// What one pass observed for one function
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitReport {
    pub pass: usize,
    pub function: String,
    pub number: u32,
    /// The artifact came out of the directory instead of being built
    pub reused: bool,
    /// Some annotation document has a record for the function
    pub annotated: bool,
    /// Sum of the known local costs of the function's blocks
    pub known_cost: Option<u64>,
    pub max_criticality: Option<f64>,
    pub persisted: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    pub passes: usize,
    pub consume_only: bool,
}

/// Run `options.passes` passes over `module`, then tear everything down
pub fn run_module<S: DocumentSource>(
    module: &Module,
    config: &PipelineConfig,
    importer: &AnnotationImporter<S>,
    options: RunOptions,
) -> Result<Vec<UnitReport>, LifecycleError> {
    let generator = LayoutGenerator;
    let lifecycle = LifecycleOptions::from_config(config);
    let mut manager = if options.consume_only {
        LifecycleManager::consume_only(lifecycle)
    } else {
        LifecycleManager::with_generator(&generator, lifecycle)
    };

    let mut cx = ModuleContext::new();
    cx.begin_module(&module.name);

    let result = run_passes(&mut manager, &mut cx, module, importer, options.passes);

    if let Some(outcome) = manager.finish(&mut cx) {
        debug!("Released '{}' during teardown", outcome.unit());
    }
    cx.end_module();
    result
}

fn run_passes<S: DocumentSource>(
    manager: &mut LifecycleManager<'_, LayoutGenerator>,
    cx: &mut ModuleContext<LayoutBody>,
    module: &Module,
    importer: &AnnotationImporter<S>,
    passes: usize,
) -> Result<Vec<UnitReport>, LifecycleError> {
    let mut reports = Vec::new();

    for pass in 1..=passes {
        info!("Pass {} over module '{}'", pass, module.name);

        for function in module.defined_functions() {
            let next_number = cx.numbering().peek();
            let artifact = manager.acquire(cx, function)?;
            let number = artifact.number();
            let (known_cost, max_criticality) = summarize_blocks(function, artifact.body(), importer);
            let reused = cx.numbering().peek() == next_number;

            let outcome = manager.release(cx);
            reports.push(UnitReport {
                pass,
                function: function.id().to_string(),
                number,
                reused,
                annotated: importer.is_function_available(function.id()),
                known_cost,
                max_criticality,
                persisted: outcome.is_persisted(),
            });
        }
    }

    Ok(reports)
}

/// Known cost sum and highest criticality over the laid-out blocks
fn summarize_blocks<S: DocumentSource>(
    function: &Function,
    body: &LayoutBody,
    importer: &AnnotationImporter<S>,
) -> (Option<u64>, Option<f64>) {
    let mut known_cost: Option<u64> = None;
    let mut max_criticality: Option<f64> = None;

    for block in &body.blocks {
        let key = BlockKey::new(function.name.clone(), block.clone());
        if let Some(cost) = importer.local_cost(&key) {
            known_cost = Some(known_cost.unwrap_or(0).saturating_add(cost));
        }
        if let Some(weight) = importer.criticality(&key) {
            max_criticality = Some(max_criticality.map_or(weight, |max| max.max(weight)));
        }
    }

    (known_cost, max_criticality)
}
