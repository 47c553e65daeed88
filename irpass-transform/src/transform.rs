//! Function and module transforms

use crate::context::TransformContext;
use crate::engine::Engine;
use crate::kind::TransformKind;
use std::fmt;

/// A transformation that operates on one function per invocation
pub trait FunctionTransform<E: Engine> {
    /// Name of the transform
    fn name(&self) -> &str;

    /// Run the transform on `function`.
    ///
    /// `function` is only borrowed for this invocation. A transform that
    /// changes it should call [`TransformContext::invalidate_analysis`] for
    /// whatever it may have made stale; requests are scoped to this function.
    fn run(&mut self, function: &mut E::Function, cx: &mut TransformContext<'_, E>);
}

/// A transformation that operates on the whole module per invocation
pub trait ModuleTransform<E: Engine> {
    /// Name of the transform
    fn name(&self) -> &str;

    /// Run the transform on `module`.
    ///
    /// Invalidation requests made from a module transform apply to the whole
    /// module, since any function may have been affected.
    fn run(&mut self, module: &mut E::Module, cx: &mut TransformContext<'_, E>);
}

/// A transform of one of the supported shapes
pub enum Transform<E: Engine> {
    /// Runs once per function
    Function(Box<dyn FunctionTransform<E>>),
    /// Runs once per module
    Module(Box<dyn ModuleTransform<E>>),
}

impl<E: Engine> Transform<E> {
    /// Wrap a function transform
    pub fn function<T>(transform: T) -> Self
    where
        T: FunctionTransform<E> + 'static,
    {
        Transform::Function(Box::new(transform))
    }

    /// Wrap a module transform
    pub fn module<T>(transform: T) -> Self
    where
        T: ModuleTransform<E> + 'static,
    {
        Transform::Module(Box::new(transform))
    }

    /// Shape of this transform
    pub fn kind(&self) -> TransformKind {
        match self {
            Transform::Function(_) => TransformKind::Function,
            Transform::Module(_) => TransformKind::Module,
        }
    }

    /// Name of the wrapped transform
    pub fn name(&self) -> &str {
        match self {
            Transform::Function(t) => t.name(),
            Transform::Module(t) => t.name(),
        }
    }
}

impl<E: Engine> fmt::Debug for Transform<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transform")
            .field("kind", &self.kind())
            .field("name", &self.name())
            .finish()
    }
}

/// The IR a transform is invoked on
pub enum Target<'a, E: Engine> {
    /// A single function
    Function(&'a mut E::Function),
    /// The whole module
    Module(&'a mut E::Module),
}

impl<E: Engine> Target<'_, E> {
    /// Transform shape able to run on this target
    pub fn kind(&self) -> TransformKind {
        match self {
            Target::Function(_) => TransformKind::Function,
            Target::Module(_) => TransformKind::Module,
        }
    }
}
