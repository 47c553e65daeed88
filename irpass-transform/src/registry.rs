//! Construction of transforms from pipeline descriptions
//!
//! Engines describe pipelines as lists of transform names. The registry maps
//! each name to a factory and builds unwired [`ScheduledTransform`]s from it.

use crate::engine::Engine;
use crate::error::{Result, TransformError};
use crate::kind::TransformKind;
use crate::options::{CompilationOptions, OptimizationLevel};
use crate::schedule::ScheduledTransform;
use crate::transform::{FunctionTransform, ModuleTransform, Transform};
use anyhow::Context;
use rustc_hash::FxHashMap;
use std::sync::Arc;
use tracing::debug;

/// Transform factory function
pub type TransformFactory<E> =
    Arc<dyn Fn(&CompilationOptions) -> anyhow::Result<Transform<E>> + Send + Sync>;

/// Transform registration with metadata
pub struct TransformRegistration<E: Engine> {
    /// Name used in pipeline descriptions
    pub name: String,
    /// Shape the factory produces
    pub kind: TransformKind,
    /// Builds a fresh instance
    pub factory: TransformFactory<E>,
    /// Levels at which pipelines include this transform
    pub enabled_levels: Vec<OptimizationLevel>,
}

impl<E: Engine> TransformRegistration<E> {
    /// Create a registration enabled at every level above `None`
    pub fn new(name: impl Into<String>, kind: TransformKind, factory: TransformFactory<E>) -> Self {
        Self {
            name: name.into(),
            kind,
            factory,
            enabled_levels: vec![
                OptimizationLevel::Basic,
                OptimizationLevel::Standard,
                OptimizationLevel::Aggressive,
            ],
        }
    }

    /// Restrict the levels this transform is enabled at
    pub fn with_levels(mut self, levels: impl IntoIterator<Item = OptimizationLevel>) -> Self {
        self.enabled_levels = levels.into_iter().collect();
        self
    }

    /// Check whether pipelines at `level` include this transform
    pub fn is_enabled_at(&self, level: OptimizationLevel) -> bool {
        self.enabled_levels.contains(&level)
    }
}

impl<E: Engine> Clone for TransformRegistration<E> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            kind: self.kind,
            factory: Arc::clone(&self.factory),
            enabled_levels: self.enabled_levels.clone(),
        }
    }
}

/// Named transform factories known to an engine
pub struct TransformRegistry<E: Engine> {
    registrations: Vec<TransformRegistration<E>>,
    by_name: FxHashMap<String, usize>,
}

impl<E: Engine> TransformRegistry<E> {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            registrations: Vec::new(),
            by_name: FxHashMap::default(),
        }
    }

    /// Add a registration; names must be unique
    pub fn register(&mut self, registration: TransformRegistration<E>) -> Result<()> {
        if self.by_name.contains_key(&registration.name) {
            return Err(TransformError::DuplicateTransform(registration.name));
        }
        debug!(transform = %registration.name, kind = %registration.kind, "transform registered");
        self.by_name
            .insert(registration.name.clone(), self.registrations.len());
        self.registrations.push(registration);
        Ok(())
    }

    /// Register a function transform factory
    pub fn register_function<T, F>(&mut self, name: impl Into<String>, factory: F) -> Result<()>
    where
        T: FunctionTransform<E> + 'static,
        F: Fn(&CompilationOptions) -> anyhow::Result<T> + Send + Sync + 'static,
    {
        let factory: TransformFactory<E> =
            Arc::new(move |options: &CompilationOptions| {
                factory(options).map(Transform::<E>::function)
            });
        self.register(TransformRegistration::new(
            name,
            TransformKind::Function,
            factory,
        ))
    }

    /// Register a module transform factory
    pub fn register_module<T, F>(&mut self, name: impl Into<String>, factory: F) -> Result<()>
    where
        T: ModuleTransform<E> + 'static,
        F: Fn(&CompilationOptions) -> anyhow::Result<T> + Send + Sync + 'static,
    {
        let factory: TransformFactory<E> =
            Arc::new(move |options: &CompilationOptions| {
                factory(options).map(Transform::<E>::module)
            });
        self.register(TransformRegistration::new(
            name,
            TransformKind::Module,
            factory,
        ))
    }

    /// Look up a registration by name
    pub fn get(&self, name: &str) -> Option<&TransformRegistration<E>> {
        self.by_name.get(name).map(|&i| &self.registrations[i])
    }

    /// Check whether `name` is registered
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Kind of the transform registered as `name`
    pub fn kind_of(&self, name: &str) -> Option<TransformKind> {
        self.get(name).map(|r| r.kind)
    }

    /// Registered names in registration order
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.registrations.iter().map(|r| r.name.as_str())
    }

    /// Number of registered transforms
    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    /// Whether nothing is registered
    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Build an unwired instance of the transform registered as `name`
    pub fn create(&self, name: &str, options: &CompilationOptions) -> Result<ScheduledTransform<E>> {
        let registration = self
            .get(name)
            .ok_or_else(|| TransformError::UnknownTransform(name.to_string()))?;

        let transform = (registration.factory)(options)
            .with_context(|| format!("failed to construct transform `{name}`"))?;
        if transform.kind() != registration.kind {
            return Err(TransformError::WrongKind {
                name: name.to_string(),
                registered: registration.kind,
                built: transform.kind(),
            });
        }

        Ok(ScheduledTransform::new(transform))
    }

    /// Build the transforms of a pipeline description in order.
    ///
    /// Names disabled in `options`, or not enabled at `options.level`, are
    /// left out. Every name must be registered, including the skipped ones.
    pub fn create_pipeline<S: AsRef<str>>(
        &self,
        names: &[S],
        options: &CompilationOptions,
    ) -> Result<Vec<ScheduledTransform<E>>> {
        let mut pipeline = Vec::with_capacity(names.len());

        for name in names {
            let name = name.as_ref();
            let registration = self
                .get(name)
                .ok_or_else(|| TransformError::UnknownTransform(name.to_string()))?;

            if options.is_disabled(name) {
                debug!(transform = name, "skipping disabled transform");
                continue;
            }
            if !registration.is_enabled_at(options.level) {
                debug!(transform = name, level = ?options.level, "transform not enabled at level");
                continue;
            }

            pipeline.push(self.create(name, options)?);
        }

        Ok(pipeline)
    }
}

impl<E: Engine> Default for TransformRegistry<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
