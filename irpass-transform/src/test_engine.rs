//! Minimal engine for unit tests

use crate::engine::{Analysis, AnalysisKind, Engine, EngineId};
use crate::options::CompilationOptions;
use crate::transform::{FunctionTransform, ModuleTransform};
use crate::TransformContext;
use std::any::Any;

#[derive(Debug, Default)]
pub struct Counter(pub u32);

impl Analysis for Counter {}

pub struct TestEngine {
    id: EngineId,
    options: CompilationOptions,
    counter: Counter,
    pub function_invalidations: Vec<(u32, bool)>,
    pub module_invalidations: Vec<bool>,
}

impl TestEngine {
    pub fn new() -> Self {
        Self {
            id: EngineId::fresh(),
            options: CompilationOptions::default(),
            counter: Counter(3),
            function_invalidations: Vec::new(),
            module_invalidations: Vec::new(),
        }
    }
}

impl Engine for TestEngine {
    /// Functions are numbered
    type Function = u32;
    /// A module is the list of its function numbers
    type Module = Vec<u32>;
    /// `true` invalidates everything
    type Invalidation = bool;

    fn id(&self) -> EngineId {
        self.id
    }

    fn options(&self) -> &CompilationOptions {
        &self.options
    }

    fn lookup_analysis(&self, kind: AnalysisKind) -> Option<&dyn Any> {
        if kind.is::<Counter>() {
            Some(&self.counter)
        } else {
            None
        }
    }

    fn invalidate_function(&mut self, function: &u32, scope: bool) {
        self.function_invalidations.push((*function, scope));
    }

    fn invalidate_module(&mut self, scope: bool) {
        self.module_invalidations.push(scope);
    }
}

/// Adds the `Counter` analysis value to the function number
pub struct AddCounter;

impl FunctionTransform<TestEngine> for AddCounter {
    fn name(&self) -> &str {
        "add-counter"
    }

    fn run(&mut self, function: &mut u32, cx: &mut TransformContext<'_, TestEngine>) {
        *function += cx.analysis::<Counter>().0;
        cx.invalidate_analysis(true);
    }
}

/// Drops every even function from the module
pub struct DropEven;

impl ModuleTransform<TestEngine> for DropEven {
    fn name(&self) -> &str {
        "drop-even"
    }

    fn run(&mut self, module: &mut Vec<u32>, cx: &mut TransformContext<'_, TestEngine>) {
        let before = module.len();
        module.retain(|f| f % 2 == 1);
        cx.invalidate_analysis(module.len() != before);
    }
}
