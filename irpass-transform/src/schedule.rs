//! Wiring and invocation of transforms owned by an engine
//!
//! A [`ScheduledTransform`] is the unit an engine keeps in its pipeline. It is
//! constructed unwired, wired exactly once with [`ScheduledTransform::inject`],
//! and then run any number of times, each time on a freshly borrowed target:
//!
//! ```text
//! Unbound -> Bound -> Running -> Completed -> Unbound
//! ```
//!
//! Invalidations requested while `Running` are forwarded to the engine in the
//! `Completed` state, after the transform has released the target. If `run`
//! unwinds, the instance drops back to `Unbound` without forwarding anything
//! or counting the invocation.

use crate::context::TransformContext;
use crate::engine::{Engine, EngineId};
use crate::error::{fatal, Misuse};
use crate::kind::TransformKind;
use crate::stats::TransformStats;
use crate::transform::{Target, Transform};
use std::fmt;
use std::time::Instant;
use tracing::debug;

/// Where a scheduled transform is in its current invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationState {
    /// No target; ready for the next invocation
    Unbound,
    /// Target assigned, `run` not entered yet
    Bound,
    /// Inside `run`
    Running,
    /// `run` returned; invalidations are being forwarded
    Completed,
}

impl fmt::Display for InvocationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            InvocationState::Unbound => "unbound",
            InvocationState::Bound => "bound",
            InvocationState::Running => "running",
            InvocationState::Completed => "completed",
        };
        f.write_str(s)
    }
}

/// A transform placed in an engine's pipeline
pub struct ScheduledTransform<E: Engine> {
    transform: Transform<E>,
    name: String,
    engine: Option<EngineId>,
    state: InvocationState,
    stats: TransformStats,
}

impl<E: Engine> ScheduledTransform<E> {
    /// Create an unwired scheduled transform
    pub fn new(transform: Transform<E>) -> Self {
        let name = transform.name().to_string();
        Self {
            transform,
            name,
            engine: None,
            state: InvocationState::Unbound,
            stats: TransformStats::new(),
        }
    }

    /// Wire the transform to the engine that will run it.
    ///
    /// Must be called exactly once, before any other operation.
    pub fn inject(&mut self, engine: &E) {
        if self.engine.is_some() {
            fatal(Misuse::AlreadyWired {
                transform: self.name.clone(),
            });
        }
        let id = engine.id();
        debug!(transform = %self.name, kind = %self.transform.kind(), engine = %id, "engine injected");
        self.engine = Some(id);
    }

    /// Whether `inject` has been called
    pub fn is_wired(&self) -> bool {
        self.engine.is_some()
    }

    /// Shape of the transform, used by the engine to pick the target
    pub fn kind(&self) -> TransformKind {
        self.wired_engine();
        self.transform.kind()
    }

    /// Name of the transform
    pub fn name(&self) -> &str {
        self.wired_engine();
        &self.name
    }

    /// Current invocation state
    pub fn state(&self) -> InvocationState {
        self.state
    }

    /// Statistics over all completed invocations
    pub fn stats(&self) -> &TransformStats {
        &self.stats
    }

    /// Run on whichever target the engine selected
    pub fn run(&mut self, target: Target<'_, E>, engine: &mut E) {
        match target {
            Target::Function(function) => self.run_on_function(function, engine),
            Target::Module(module) => self.run_on_module(module, engine),
        }
    }

    /// Run a function transform on `function`
    pub fn run_on_function(&mut self, function: &mut E::Function, engine: &mut E) {
        self.bind(engine, TransformKind::Function);
        let start = Instant::now();

        let transform = match &mut self.transform {
            Transform::Function(transform) => transform,
            Transform::Module(_) => unreachable!("kind checked when binding"),
        };
        let (requests, lookups) = {
            let mut cx = TransformContext::new(&*engine, &self.name, TransformKind::Function);
            let state = RunGuard::enter(&mut self.state);
            transform.run(function, &mut cx);
            state.complete();
            cx.finish()
        };

        for scope in &requests {
            debug!(transform = %self.name, ?scope, "invalidating function analyses");
            engine.invalidate_function(function, *scope);
        }
        self.unbind(start, lookups, requests.len());
    }

    /// Run a module transform on `module`
    pub fn run_on_module(&mut self, module: &mut E::Module, engine: &mut E) {
        self.bind(engine, TransformKind::Module);
        let start = Instant::now();

        let transform = match &mut self.transform {
            Transform::Module(transform) => transform,
            Transform::Function(_) => unreachable!("kind checked when binding"),
        };
        let (requests, lookups) = {
            let mut cx = TransformContext::new(&*engine, &self.name, TransformKind::Module);
            let state = RunGuard::enter(&mut self.state);
            transform.run(module, &mut cx);
            state.complete();
            cx.finish()
        };

        for scope in &requests {
            debug!(transform = %self.name, ?scope, "invalidating module analyses");
            engine.invalidate_module(*scope);
        }
        self.unbind(start, lookups, requests.len());
    }

    fn wired_engine(&self) -> EngineId {
        match self.engine {
            Some(id) => id,
            None => fatal(Misuse::Unwired {
                transform: self.name.clone(),
            }),
        }
    }

    fn bind(&mut self, engine: &E, target: TransformKind) {
        let wired = self.wired_engine();
        let running = engine.id();
        if wired != running {
            fatal(Misuse::ForeignEngine {
                transform: self.name.clone(),
                wired: wired.to_string(),
                running: running.to_string(),
            });
        }
        if self.transform.kind() != target {
            fatal(Misuse::KindMismatch {
                transform: self.name.clone(),
                expected: self.transform.kind(),
                found: target,
            });
        }
        if self.state != InvocationState::Unbound {
            fatal(Misuse::Reentered {
                transform: self.name.clone(),
                state: self.state.to_string(),
            });
        }

        debug!(transform = %self.name, kind = %target, "running transform");
        self.state = InvocationState::Bound;
    }

    fn unbind(&mut self, start: Instant, lookups: usize, invalidations: usize) {
        let elapsed = start.elapsed().as_micros() as u64;
        self.stats.invocations += 1;
        self.stats.analysis_lookups += lookups;
        self.stats.invalidations_requested += invalidations;
        self.stats.total_time_us += elapsed;

        debug!(
            transform = %self.name,
            lookups,
            invalidations,
            elapsed_us = elapsed,
            "transform completed"
        );
        self.state = InvocationState::Unbound;
    }
}

/// Holds the state at `Running` for the length of `run`
struct RunGuard<'s> {
    state: &'s mut InvocationState,
}

impl<'s> RunGuard<'s> {
    fn enter(state: &'s mut InvocationState) -> Self {
        *state = InvocationState::Running;
        Self { state }
    }

    fn complete(self) {
        *self.state = InvocationState::Completed;
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        // only still running when `run` unwound
        if *self.state == InvocationState::Running {
            *self.state = InvocationState::Unbound;
        }
    }
}

impl<E: Engine> fmt::Debug for ScheduledTransform<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScheduledTransform")
            .field("transform", &self.transform)
            .field("engine", &self.engine)
            .field("state", &self.state)
            .finish()
    }
}

#[cfg(test)]
#[path = "schedule_tests.rs"]
mod tests;
