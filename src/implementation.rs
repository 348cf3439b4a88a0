//! Implementation descriptors: how a capability gets built.

use std::any::TypeId;
use std::sync::Arc;

use crate::error::BoxError;
use crate::key::Key;
use crate::registration::{Binding, Built, ErasedFactory};
use crate::traits::Reinitialize;

type TypedFactory<I> = Arc<dyn Fn() -> Result<I, BoxError> + Send + Sync>;

/// Construction strategy declared by the registrant.
///
/// The strategy is chosen explicitly at registration time instead of being
/// inferred from the implementation type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "snake_case"))]
pub enum Construction {
    /// Run the factory and hand the object out directly.
    #[default]
    Plain,
    /// Run the factory, then attach the object to a container owned by the
    /// installed [`HostContainer`](crate::HostContainer).
    ///
    /// Only singleton resolution honours this; transient bindings are always
    /// built plainly.
    HostManaged,
}

/// Implementation descriptor binding capability `C` to concrete type `I`.
///
/// A descriptor carries the factory that builds `I`, the upcast from `Arc<I>`
/// to `Arc<C>`, the [`Construction`] strategy, and the optional lifecycle
/// markers: survivor (kept by [`reset`](crate::ServiceRegistry::reset)) and
/// reinitializable (notified by
/// [`handle_boundary_completion`](crate::ServiceRegistry::handle_boundary_completion)).
///
/// # Examples
///
/// ```rust
/// use ferrous_locator::{Implementation, ServiceRegistry};
/// use std::sync::Arc;
///
/// trait Router: Send + Sync {
///     fn route(&self, topic: &str) -> usize;
/// }
///
/// #[derive(Default)]
/// struct MessageRouter;
///
/// impl Router for MessageRouter {
///     fn route(&self, topic: &str) -> usize {
///         topic.len()
///     }
/// }
///
/// let mut registry = ServiceRegistry::new();
/// registry.register_singleton(
///     Implementation::<MessageRouter, MessageRouter>::from_default()
///         .bind(|router: Arc<MessageRouter>| router as Arc<dyn Router>)
///         .survives_reset(),
/// );
///
/// let router = registry.resolve::<dyn Router>().unwrap().unwrap();
/// assert_eq!(router.route("scene.loaded"), 12);
/// ```
pub struct Implementation<C: ?Sized, I> {
    factory: Option<TypedFactory<I>>,
    upcast: fn(Arc<I>) -> Arc<C>,
    construction: Construction,
    survivor: bool,
    reinitialize: Option<fn(Arc<I>) -> Arc<dyn Reinitialize>>,
}

impl<I: Send + Sync + 'static> Implementation<I, I> {
    /// Descriptor for `I` bound to itself, built by `factory`.
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn() -> I + Send + Sync + 'static,
    {
        let factory: TypedFactory<I> = Arc::new(move || Ok::<I, BoxError>(factory()));
        Self::with_factory(Some(factory))
    }

    /// Descriptor whose factory may fail; the error surfaces from resolution
    /// as [`DiError::Construction`](crate::DiError::Construction).
    pub fn try_new<F, E>(factory: F) -> Self
    where
        F: Fn() -> Result<I, E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        let factory: TypedFactory<I> = Arc::new(move || factory().map_err(|err| -> BoxError { err.into() }));
        Self::with_factory(Some(factory))
    }

    /// Descriptor using `I::default()` as the factory.
    pub fn from_default() -> Self
    where
        I: Default,
    {
        Self::new(I::default)
    }

    /// Descriptor without a factory, for registering a ready-made instance.
    ///
    /// If the cached instance is later unregistered, resolving the capability
    /// reports [`DiError::MissingFactory`](crate::DiError::MissingFactory).
    pub fn instance_only() -> Self {
        Self::with_factory(None)
    }

    fn with_factory(factory: Option<TypedFactory<I>>) -> Self {
        Self {
            factory,
            upcast: identity::<I>,
            construction: Construction::Plain,
            survivor: false,
            reinitialize: None,
        }
    }
}

impl<C, I> Implementation<C, I>
where
    C: ?Sized + Send + Sync + 'static,
    I: Send + Sync + 'static,
{
    /// Rebinds the descriptor to capability `D`, usually a trait object.
    pub fn bind<D>(self, upcast: fn(Arc<I>) -> Arc<D>) -> Implementation<D, I>
    where
        D: ?Sized + Send + Sync + 'static,
    {
        Implementation {
            factory: self.factory,
            upcast,
            construction: self.construction,
            survivor: self.survivor,
            reinitialize: self.reinitialize,
        }
    }

    /// Sets the construction strategy.
    pub fn construction(mut self, construction: Construction) -> Self {
        self.construction = construction;
        self
    }

    /// Shorthand for `construction(Construction::HostManaged)`.
    pub fn host_managed(self) -> Self {
        self.construction(Construction::HostManaged)
    }

    /// Marks instances of this implementation as surviving a registry reset.
    pub fn survives_reset(mut self) -> Self {
        self.survivor = true;
        self
    }

    /// Marks cached instances for notification after a lifecycle boundary.
    pub fn reinitializable(mut self) -> Self
    where
        I: Reinitialize,
    {
        self.reinitialize = Some(as_reinitialize::<I>);
        self
    }

    /// The declared construction strategy.
    pub fn construction_mode(&self) -> Construction {
        self.construction
    }

    pub fn is_survivor(&self) -> bool {
        self.survivor
    }

    pub fn is_reinitializable(&self) -> bool {
        self.reinitialize.is_some()
    }

    pub fn has_factory(&self) -> bool {
        self.factory.is_some()
    }

    /// Type name of the concrete implementation.
    pub fn implementation_name(&self) -> &'static str {
        std::any::type_name::<I>()
    }

    /// Wraps an already-built instance the way the factory path would.
    pub(crate) fn wrap(&self, instance: Arc<I>) -> Built {
        Built::new(instance, self.upcast, self.reinitialize)
    }

    /// Erases the descriptor into a binding stored under `key`.
    pub(crate) fn into_binding(self, key: Key) -> Binding {
        let upcast = self.upcast;
        let reinitialize = self.reinitialize;
        let factory = self.factory.map(|factory| {
            Arc::new(move || {
                let instance = Arc::new(factory()?);
                Ok::<Built, BoxError>(Built::new(instance, upcast, reinitialize))
            }) as ErasedFactory
        });

        Binding {
            key,
            impl_id: TypeId::of::<I>(),
            impl_name: std::any::type_name::<I>(),
            construction: self.construction,
            survivor: self.survivor,
            reinitializable: reinitialize.is_some(),
            factory,
        }
    }
}

fn identity<I>(instance: Arc<I>) -> Arc<I> {
    instance
}

fn as_reinitialize<I: Reinitialize>(instance: Arc<I>) -> Arc<dyn Reinitialize> {
    instance
}

impl<C: ?Sized, I> std::fmt::Debug for Implementation<C, I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Implementation")
            .field("capability", &std::any::type_name::<C>())
            .field("implementation", &std::any::type_name::<I>())
            .field("construction", &self.construction)
            .field("survivor", &self.survivor)
            .field("reinitializable", &self.reinitialize.is_some())
            .field("has_factory", &self.factory.is_some())
            .finish()
    }
}
