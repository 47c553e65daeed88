//! Transform shapes

use serde::{Deserialize, Serialize};
use std::fmt;

/// The granularity a transform operates at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransformKind {
    /// One function body per invocation
    Function,
    /// The whole module per invocation
    Module,
}

impl TransformKind {
    /// Lowercase name used in logs and pipeline descriptions
    pub fn as_str(&self) -> &'static str {
        match self {
            TransformKind::Function => "function",
            TransformKind::Module => "module",
        }
    }
}

impl fmt::Display for TransformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
