//! The seam between transforms and the pass-scheduling engine
//!
//! The engine owns the IR, the analysis cache and the scheduling loop.
//! Transforms only see it through [`TransformContext`](crate::TransformContext),
//! which borrows the engine for the length of one invocation.

use crate::options::CompilationOptions;
use std::any::{self, Any, TypeId};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ENGINE_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of an engine instance
///
/// Transforms remember the id of the engine they were wired to instead of
/// holding a reference to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EngineId(u64);

impl EngineId {
    /// Allocate an id that is unique within the process
    pub fn fresh() -> Self {
        EngineId(NEXT_ENGINE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Gets the raw value
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for EngineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "engine#{}", self.0)
    }
}

/// Marker for cached analysis results the engine can hand out
pub trait Analysis: Any {}

/// The semantic kind of an analysis, used as the cache lookup key
#[derive(Clone, Copy)]
pub struct AnalysisKind {
    id: TypeId,
    name: &'static str,
}

impl AnalysisKind {
    /// Kind of the analysis type `A`
    pub fn of<A: Analysis>() -> Self {
        Self {
            id: TypeId::of::<A>(),
            name: any::type_name::<A>(),
        }
    }

    /// Type id backing this kind
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Full type name of the analysis
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Check whether this is the kind of `A`
    pub fn is<A: Analysis>(&self) -> bool {
        self.id == TypeId::of::<A>()
    }
}

impl PartialEq for AnalysisKind {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for AnalysisKind {}

impl std::hash::Hash for AnalysisKind {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AnalysisKind").field(&self.name).finish()
    }
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// A pass-scheduling engine that runs transforms
pub trait Engine {
    /// Function bodies handed to function transforms
    type Function: ?Sized;

    /// Program unit handed to module transforms
    type Module: ?Sized;

    /// Granularity of invalidation requests.
    ///
    /// The members are chosen by the engine, together with the mapping from
    /// each member to the analyses it evicts.
    type Invalidation: Copy + fmt::Debug;

    /// Identity of this engine
    fn id(&self) -> EngineId;

    /// Engine-wide compilation options
    fn options(&self) -> &CompilationOptions;

    /// Look up the cached analysis of `kind`, `None` if no such analysis is registered
    fn lookup_analysis(&self, kind: AnalysisKind) -> Option<&dyn Any>;

    /// Evict analyses of `function` made stale according to `scope`
    fn invalidate_function(&mut self, function: &Self::Function, scope: Self::Invalidation);

    /// Evict analyses of the whole module made stale according to `scope`
    fn invalidate_module(&mut self, scope: Self::Invalidation);
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
