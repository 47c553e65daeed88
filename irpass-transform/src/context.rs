//! Per-invocation access to the engine

use crate::engine::{Analysis, AnalysisKind, Engine};
use crate::error::{fatal, Misuse};
use crate::kind::TransformKind;
use crate::options::CompilationOptions;
use std::cell::Cell;
use tracing::trace;

/// What a running transform may ask of its engine.
///
/// The context borrows the engine immutably for one invocation: analyses and
/// options can be read, and stale analyses can be reported with
/// [`invalidate_analysis`](Self::invalidate_analysis). The engine applies the
/// reported invalidations once `run` has returned.
pub struct TransformContext<'a, E: Engine> {
    engine: &'a E,
    transform: &'a str,
    kind: TransformKind,
    lookups: Cell<usize>,
    requests: Vec<E::Invalidation>,
}

impl<'a, E: Engine> TransformContext<'a, E> {
    pub(crate) fn new(engine: &'a E, transform: &'a str, kind: TransformKind) -> Self {
        Self {
            engine,
            transform,
            kind,
            lookups: Cell::new(0),
            requests: Vec::new(),
        }
    }

    /// Get the cached analysis `A` from the engine.
    ///
    /// Aborts the compilation if the engine has no analysis of that kind:
    /// the pipeline asked for something its engine does not provide.
    pub fn analysis<A: Analysis>(&self) -> &'a A {
        let kind = AnalysisKind::of::<A>();
        self.lookups.set(self.lookups.get() + 1);
        trace!(transform = self.transform, analysis = %kind, "analysis lookup");

        let Some(found) = self.engine.lookup_analysis(kind) else {
            fatal(Misuse::UnregisteredAnalysis {
                transform: self.transform.to_string(),
                analysis: kind.name().to_string(),
            })
        };

        match found.downcast_ref::<A>() {
            Some(analysis) => analysis,
            None => fatal(Misuse::AnalysisTypeMismatch {
                transform: self.transform.to_string(),
                analysis: kind.name().to_string(),
            }),
        }
    }

    /// Engine-wide compilation options
    pub fn options(&self) -> &'a CompilationOptions {
        self.engine.options()
    }

    /// Report that analyses covered by `scope` are stale.
    ///
    /// For a function transform the request covers the function being
    /// transformed; for a module transform it covers the whole module.
    ///
    /// Requests are queued and reach the engine, in call order, only after
    /// `run` returns. Analyses looked up later in the same `run` are still the
    /// instances cached before the request.
    pub fn invalidate_analysis(&mut self, scope: E::Invalidation) {
        trace!(transform = self.transform, ?scope, "invalidation requested");
        self.requests.push(scope);
    }

    /// Invalidations requested so far in this invocation
    pub fn requested_invalidations(&self) -> &[E::Invalidation] {
        &self.requests
    }

    /// Shape of the running transform
    pub fn kind(&self) -> TransformKind {
        self.kind
    }

    /// Name of the running transform
    pub fn transform_name(&self) -> &'a str {
        self.transform
    }

    pub(crate) fn finish(self) -> (Vec<E::Invalidation>, usize) {
        (self.requests, self.lookups.get())
    }
}
