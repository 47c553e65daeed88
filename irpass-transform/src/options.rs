//! Engine-wide compilation options

use crate::error::{Result, TransformError};
use serde::{Deserialize, Serialize};

/// Optimization level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptimizationLevel {
    /// No optimizations
    None,
    /// Basic optimizations (O1)
    Basic,
    /// Standard optimizations (O2)
    Standard,
    /// Aggressive optimizations (O3)
    Aggressive,
}

/// Options shared by every transform in a compilation.
///
/// Transforms read them through [`TransformContext::options`](crate::TransformContext::options);
/// only the engine can change them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawOptions")]
pub struct CompilationOptions {
    /// Optimization level
    pub level: OptimizationLevel,
    /// Verify the IR after every transform
    pub verify_all: bool,
    /// Debug mode (preserve more information)
    pub debug_mode: bool,
    /// Inline threshold (instruction count)
    pub inline_threshold: usize,
    /// Transforms left out of pipelines built from names
    pub disabled_transforms: Vec<String>,
}

impl CompilationOptions {
    /// Create options for optimization level
    pub fn for_level(level: OptimizationLevel) -> Self {
        match level {
            OptimizationLevel::None => Self {
                level,
                verify_all: false,
                debug_mode: true,
                inline_threshold: 0,
                disabled_transforms: Vec::new(),
            },
            OptimizationLevel::Basic => Self {
                level,
                verify_all: false,
                debug_mode: false,
                inline_threshold: 5,
                disabled_transforms: Vec::new(),
            },
            OptimizationLevel::Standard => Self {
                level,
                verify_all: false,
                debug_mode: false,
                inline_threshold: 10,
                disabled_transforms: Vec::new(),
            },
            OptimizationLevel::Aggressive => Self {
                level,
                verify_all: false,
                debug_mode: false,
                inline_threshold: 20,
                disabled_transforms: Vec::new(),
            },
        }
    }

    /// Parse options from JSON; missing fields take the preset of the given
    /// level, and a missing level means `standard`
    pub fn from_json(input: &str) -> Result<Self> {
        let raw: RawOptions = serde_json::from_str(input)?;
        Self::try_from(raw)
    }

    /// Check whether the transform `name` was switched off
    pub fn is_disabled(&self, name: &str) -> bool {
        self.disabled_transforms.iter().any(|n| n == name)
    }
}

/// Options as written in JSON, before the level preset fills the gaps
#[derive(Deserialize)]
struct RawOptions {
    level: Option<OptimizationLevel>,
    verify_all: Option<bool>,
    debug_mode: Option<bool>,
    inline_threshold: Option<usize>,
    disabled_transforms: Option<Vec<String>>,
}

impl TryFrom<RawOptions> for CompilationOptions {
    type Error = TransformError;

    fn try_from(raw: RawOptions) -> Result<Self> {
        let mut options = Self::for_level(raw.level.unwrap_or(OptimizationLevel::Standard));
        if let Some(verify_all) = raw.verify_all {
            options.verify_all = verify_all;
        }
        if let Some(debug_mode) = raw.debug_mode {
            options.debug_mode = debug_mode;
        }
        if let Some(inline_threshold) = raw.inline_threshold {
            options.inline_threshold = inline_threshold;
        }
        if let Some(disabled_transforms) = raw.disabled_transforms {
            options.disabled_transforms = disabled_transforms;
        }

        if options.level == OptimizationLevel::None && options.inline_threshold > 0 {
            return Err(TransformError::Options(format!(
                "inline_threshold {} requires an optimization level above none",
                options.inline_threshold
            )));
        }
        Ok(options)
    }
}

impl Default for CompilationOptions {
    fn default() -> Self {
        Self::for_level(OptimizationLevel::Standard)
    }
}

#[cfg(test)]
#[path = "options_tests.rs"]
mod tests;
