//! Test engine recording every request transforms make

#![allow(dead_code)]

use irpass_transform::{Analysis, AnalysisKind, CompilationOptions, Engine, EngineId};
use rustc_hash::FxHashMap;
use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::collections::BTreeSet;

/// A function body: a name and a flat instruction list
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: String,
    pub instructions: Vec<String>,
}

impl Function {
    pub fn new(name: &str, instructions: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            instructions: instructions.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// A module: a list of functions
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Module {
    pub functions: Vec<Function>,
}

/// Invalidation granularities understood by the test engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Invalidation {
    /// Nothing changed
    Nothing,
    /// Calls changed; only call-graph facts are stale
    Calls,
    /// Anything may have changed
    Everything,
}

/// Analysis names used for the per-function cache
pub const DOMINATORS: &str = "dominators";
pub const CALL_GRAPH: &str = "call_graph";

#[derive(Debug, Default)]
pub struct DominatorAnalysis {
    pub computed: usize,
}

impl Analysis for DominatorAnalysis {}

#[derive(Debug, Default)]
pub struct CallGraphAnalysis;

impl Analysis for CallGraphAnalysis {}

/// Never registered with any test engine
#[derive(Debug)]
pub struct AliasAnalysis;

impl Analysis for AliasAnalysis {}

/// Something the engine recorded
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    InvalidateFunction(String, Invalidation),
    InvalidateModule(Invalidation),
}

pub struct MockEngine {
    id: EngineId,
    options: CompilationOptions,
    analyses: FxHashMap<TypeId, Box<dyn Any>>,
    lookups: RefCell<Vec<&'static str>>,
    invalidations: Vec<Event>,
    /// Cached (function, analysis) facts
    pub cache: BTreeSet<(String, &'static str)>,
}

impl MockEngine {
    pub fn new() -> Self {
        Self::with_options(CompilationOptions::default())
    }

    pub fn with_options(options: CompilationOptions) -> Self {
        Self {
            id: EngineId::fresh(),
            options,
            analyses: FxHashMap::default(),
            lookups: RefCell::new(Vec::new()),
            invalidations: Vec::new(),
            cache: BTreeSet::new(),
        }
    }

    pub fn register<A: Analysis>(&mut self, analysis: A) {
        self.analyses.insert(TypeId::of::<A>(), Box::new(analysis));
    }

    /// Register `analysis` under the kind of `A`, to simulate a broken engine
    pub fn register_as<A: Analysis, B: Any>(&mut self, analysis: B) {
        self.analyses.insert(TypeId::of::<A>(), Box::new(analysis));
    }

    /// Pretend both analyses were computed for every function of `module`
    pub fn warm_cache(&mut self, module: &Module) {
        for function in &module.functions {
            self.cache.insert((function.name.clone(), DOMINATORS));
            self.cache.insert((function.name.clone(), CALL_GRAPH));
        }
    }

    pub fn cached(&self, function: &str) -> Vec<&'static str> {
        self.cache
            .iter()
            .filter(|(f, _)| f == function)
            .map(|(_, a)| *a)
            .collect()
    }

    pub fn lookups(&self) -> Vec<&'static str> {
        self.lookups.borrow().clone()
    }

    pub fn invalidations(&self) -> &[Event] {
        &self.invalidations
    }

    fn evict(&mut self, function: Option<&str>, scope: Invalidation) {
        let stale: &[&str] = match scope {
            Invalidation::Nothing => &[],
            Invalidation::Calls => &[CALL_GRAPH],
            Invalidation::Everything => &[DOMINATORS, CALL_GRAPH],
        };
        self.cache.retain(|(f, a)| {
            let in_scope = function.map_or(true, |name| name == f);
            !(in_scope && stale.contains(a))
        });
    }
}

impl Engine for MockEngine {
    type Function = Function;
    type Module = Module;
    type Invalidation = Invalidation;

    fn id(&self) -> EngineId {
        self.id
    }

    fn options(&self) -> &CompilationOptions {
        &self.options
    }

    fn lookup_analysis(&self, kind: AnalysisKind) -> Option<&dyn Any> {
        self.lookups.borrow_mut().push(kind.name());
        self.analyses.get(&kind.id()).map(|a| &**a)
    }

    fn invalidate_function(&mut self, function: &Function, scope: Invalidation) {
        self.invalidations
            .push(Event::InvalidateFunction(function.name.clone(), scope));
        self.evict(Some(&function.name), scope);
    }

    fn invalidate_module(&mut self, scope: Invalidation) {
        self.invalidations.push(Event::InvalidateModule(scope));
        self.evict(None, scope);
    }
}

pub fn sample_module() -> Module {
    Module {
        functions: vec![
            Function::new("f1", &["a = 1", "b = call g", "ret b"]),
            Function::new("f2", &["c = 2", "ret c"]),
        ],
    }
}
