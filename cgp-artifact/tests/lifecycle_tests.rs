//! Lifecycle behavior across passes, modules and directory configurations

use cgp_artifact::{
    CodeGenerator, LifecycleError, LifecycleManager, LifecycleOptions, ModuleContext, ReleaseOutcome,
};
use cgp_common::{Function, FunctionId, Module};
use pretty_assertions::assert_eq;
use std::cell::RefCell;

/// Records every build request so tests can tell reuse from rebuild
#[derive(Default)]
struct RecordingGenerator {
    builds: RefCell<Vec<(String, u32)>>,
}

impl RecordingGenerator {
    fn build_count(&self) -> usize {
        self.builds.borrow().len()
    }
}

impl CodeGenerator for RecordingGenerator {
    type Body = usize;

    fn generate(&self, unit: &Function, number: u32) -> usize {
        self.builds.borrow_mut().push((unit.id().to_string(), number));
        unit.blocks.len()
    }
}

fn sample_module() -> Module {
    let mut module = Module::new("sample");
    module.add_function(Function::new("foo").with_blocks(["bb0", "bb1"]));
    module.add_function(Function::new("bar").with_blocks(["entry"]));
    module.add_function(Function::new("baz"));
    module
}

/// Run acquire/release over every function once and collect the numbers
fn run_pass(
    manager: &mut LifecycleManager<'_, RecordingGenerator>,
    cx: &mut ModuleContext<usize>,
    module: &Module,
) -> Vec<ReleaseOutcome> {
    module
        .defined_functions()
        .map(|function| {
            manager.acquire(cx, function).expect("acquire succeeds");
            manager.release(cx)
        })
        .collect()
}

#[test]
fn test_release_without_preserve_leaves_no_entry() {
    let generator = RecordingGenerator::default();
    let module = sample_module();
    let mut cx = ModuleContext::new();
    cx.begin_module(&module.name);
    let mut manager = LifecycleManager::with_generator(&generator, LifecycleOptions::default());

    let outcomes = run_pass(&mut manager, &mut cx, &module);

    assert!(outcomes.iter().all(|o| !o.is_persisted()));
    let directory = cx.directory().expect("directory reachable");
    for function in module.defined_functions() {
        assert!(!directory.contains(function.id()));
    }
    assert!(directory.is_empty());
}

#[test]
fn test_preserve_then_reacquire_keeps_number() {
    let generator = RecordingGenerator::default();
    let module = sample_module();
    let mut cx = ModuleContext::new();
    cx.begin_module(&module.name);
    let options = LifecycleOptions { preserve_on_release: true, ..Default::default() };
    let mut manager = LifecycleManager::with_generator(&generator, options);

    let first = run_pass(&mut manager, &mut cx, &module);
    assert_eq!(first.iter().map(ReleaseOutcome::number).collect::<Vec<_>>(), vec![0, 1, 2]);
    assert_eq!(cx.directory().map(|d| d.len()), Some(3));

    let second = run_pass(&mut manager, &mut cx, &module);
    assert_eq!(first, second);
    assert_eq!(generator.build_count(), 3);
    assert_eq!(cx.numbering().peek(), 3);

    let foo = FunctionId::new("foo");
    let stored = cx.directory().and_then(|d| d.lookup(&foo)).expect("foo persisted");
    assert_eq!(stored.number(), 0);
    assert_eq!(*stored.body(), 2);
}

#[test]
fn test_force_rebuild_assigns_greater_numbers() {
    let generator = RecordingGenerator::default();
    let module = sample_module();
    let mut cx = ModuleContext::new();
    cx.begin_module(&module.name);
    let options = LifecycleOptions { force_rebuild: true, preserve_on_release: true };
    let mut manager = LifecycleManager::with_generator(&generator, options);

    let first = run_pass(&mut manager, &mut cx, &module);
    let second = run_pass(&mut manager, &mut cx, &module);

    for (old, new) in first.iter().zip(&second) {
        assert_eq!(old.unit(), new.unit());
        assert!(new.number() > old.number());
    }
    assert_eq!(generator.build_count(), 6);
    assert_eq!(cx.directory().map(|d| d.len()), Some(3));
}

#[test]
fn test_numbers_strictly_increase_across_rebuilds() {
    let generator = RecordingGenerator::default();
    let foo = Function::new("foo");
    let mut cx = ModuleContext::new();
    cx.begin_module("m");
    let mut manager = LifecycleManager::with_generator(&generator, LifecycleOptions::default());

    let mut numbers = Vec::new();
    for _ in 0..4 {
        numbers.push(manager.acquire(&mut cx, &foo).expect("build-capable").number());
        manager.release(&mut cx);
    }

    assert_eq!(numbers, vec![0, 1, 2, 3]);
}

#[test]
fn test_begin_module_resets_numbering() {
    let generator = RecordingGenerator::default();
    let mut cx = ModuleContext::new();
    let options = LifecycleOptions { preserve_on_release: true, ..Default::default() };
    let mut manager = LifecycleManager::with_generator(&generator, options);

    cx.begin_module("first");
    manager.acquire(&mut cx, &Function::new("foo")).expect("build-capable");
    manager.release(&mut cx);
    manager.acquire(&mut cx, &Function::new("bar")).expect("build-capable");
    manager.release(&mut cx);

    cx.begin_module("second");
    assert_eq!(cx.numbering().peek(), 0);
    assert_eq!(cx.directory().map(|d| d.is_empty()), Some(true));
    assert_eq!(cx.directory().and_then(|d| d.module_name()), Some("second"));

    let number = manager.acquire(&mut cx, &Function::new("foo")).expect("build-capable").number();
    assert_eq!(number, 0);
    manager.release(&mut cx);
    assert_eq!(cx.end_module(), 1);
}

#[test]
fn test_consume_only_without_entry_fails() {
    let mut cx: ModuleContext<usize> = ModuleContext::new();
    let mut manager = LifecycleManager::<RecordingGenerator>::consume_only(LifecycleOptions::default());

    let err = manager.acquire(&mut cx, &Function::new("bar")).unwrap_err();
    assert_eq!(err, LifecycleError::UnsupportedRecreation { unit: FunctionId::new("bar") });
    assert!(!manager.is_checked_out());
    assert_eq!(cx.numbering().peek(), 0);
}

#[test]
fn test_consume_only_reuses_persisted_artifact() {
    let generator = RecordingGenerator::default();
    let mut cx = ModuleContext::new();
    cx.begin_module("m");
    let options = LifecycleOptions { preserve_on_release: true, force_rebuild: true };

    let mut builder = LifecycleManager::with_generator(&generator, options);
    builder.acquire(&mut cx, &Function::new("bar")).expect("build-capable");
    assert!(builder.finish(&mut cx).is_some_and(|o| o.is_persisted()));

    // force_rebuild has no effect without a generator
    let mut consumer = LifecycleManager::<RecordingGenerator>::consume_only(options);
    assert!(!consumer.can_build());
    let number = consumer.acquire(&mut cx, &Function::new("bar")).expect("entry exists").number();
    assert_eq!(number, 0);
    assert_eq!(consumer.release(&mut cx), ReleaseOutcome::Persisted { unit: FunctionId::new("bar"), number: 0 });
    assert_eq!(generator.build_count(), 1);
}

#[test]
fn test_unreachable_directory_destroys_even_with_preserve() {
    let generator = RecordingGenerator::default();
    let mut cx = ModuleContext::without_directory();
    cx.begin_module("m");
    let options = LifecycleOptions { preserve_on_release: true, ..Default::default() };
    let mut manager = LifecycleManager::with_generator(&generator, options);

    manager.acquire(&mut cx, &Function::new("foo")).expect("build-capable");
    let outcome = manager.release(&mut cx);
    assert_eq!(outcome, ReleaseOutcome::Destroyed { unit: FunctionId::new("foo"), number: 0 });

    let number = manager.acquire(&mut cx, &Function::new("foo")).expect("build-capable").number();
    assert_eq!(number, 1);
    manager.release(&mut cx);
    assert!(cx.directory().is_none());
    assert_eq!(cx.end_module(), 0);
}
