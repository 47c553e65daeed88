//! Transform contract for the irpass engine
//!
//! This crate defines how individual IR transformations plug into a
//! pass-scheduling engine:
//! - the closed set of transform shapes ([`Transform`], [`TransformKind`])
//! - the per-invocation context giving access to analyses, options and
//!   invalidation requests ([`TransformContext`])
//! - the wiring and invocation lifecycle enforced on every scheduled
//!   transform ([`ScheduledTransform`])
//! - construction of transforms from pipeline descriptions ([`TransformRegistry`])
//!
//! Scheduling policy, analysis implementations and the IR itself belong to
//! the engine implementing [`Engine`].

#![warn(missing_docs)]

pub mod context;
pub mod engine;
pub mod error;
pub mod kind;
pub mod options;
pub mod registry;
pub mod schedule;
pub mod stats;
pub mod transform;

#[cfg(test)]
mod test_engine;

pub use context::TransformContext;
pub use engine::{Analysis, AnalysisKind, Engine, EngineId};
pub use error::{Misuse, Result, TransformError};
pub use kind::TransformKind;
pub use options::{CompilationOptions, OptimizationLevel};
pub use registry::{TransformFactory, TransformRegistration, TransformRegistry};
pub use schedule::{InvocationState, ScheduledTransform};
pub use stats::TransformStats;
pub use transform::{FunctionTransform, ModuleTransform, Target, Transform};
