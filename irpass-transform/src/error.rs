//! Error types for irpass transforms
//!
//! Two families live here. [`Misuse`] describes pipeline-assembly bugs that
//! abort the compilation through [`fatal`]. [`TransformError`] covers the
//! recoverable surface of building a pipeline from names and options.

use crate::kind::TransformKind;
use thiserror::Error;

/// Internal inconsistencies between a pipeline and its engine
#[allow(missing_docs)]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Misuse {
    /// Operation before `inject`
    #[error("transform `{transform}` used before an engine was injected")]
    Unwired { transform: String },

    /// Second `inject`
    #[error("transform `{transform}` already has an engine injected")]
    AlreadyWired { transform: String },

    /// Run by an engine other than the injected one
    #[error("transform `{transform}` was wired to {wired} but run by {running}")]
    ForeignEngine {
        transform: String,
        wired: String,
        running: String,
    },

    /// Analysis lookup the engine cannot serve
    #[error("transform `{transform}` requested analysis `{analysis}` which is not registered with the engine")]
    UnregisteredAnalysis { transform: String, analysis: String },

    /// Engine answered a lookup with another analysis type
    #[error("engine returned an instance of the wrong type for analysis `{analysis}` requested by `{transform}`")]
    AnalysisTypeMismatch { transform: String, analysis: String },

    /// Target shape does not match the transform kind
    #[error("{expected} transform `{transform}` cannot run on a {found} target")]
    KindMismatch {
        transform: String,
        expected: TransformKind,
        found: TransformKind,
    },

    /// Invocation started before the previous one completed
    #[error("transform `{transform}` invoked while already {state}")]
    Reentered { transform: String, state: String },
}

/// Abort the compilation on a broken pipeline invariant.
///
/// Release builds are compiled with `panic = "abort"`, so this terminates the
/// process.
#[cold]
#[track_caller]
pub fn fatal(misuse: Misuse) -> ! {
    tracing::error!(%misuse, "fatal transform misuse");
    panic!("{misuse}")
}

/// Errors raised while assembling a pipeline
#[allow(missing_docs)]
#[derive(Error, Debug)]
pub enum TransformError {
    #[error("Unknown transform: {0}")]
    UnknownTransform(String),

    #[error("Transform already registered: {0}")]
    DuplicateTransform(String),

    #[error("Transform `{name}` registered as {registered} but its factory built a {built} transform")]
    WrongKind {
        name: String,
        registered: TransformKind,
        built: TransformKind,
    },

    #[error("Invalid options: {0}")]
    Options(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result alias for pipeline assembly
pub type Result<T> = std::result::Result<T, TransformError>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
