//! Type-erased binding and instance cache entries.

use std::any::{Any, TypeId};
use std::sync::Arc;

use crate::error::BoxError;
use crate::implementation::Construction;
use crate::key::Key;
use crate::traits::Reinitialize;

/// Type-erased Arc for storage.
///
/// Capability `C` is stored as `Arc<C>` wrapped once more so trait-object
/// capabilities can be downcast back to `Arc<dyn Trait>`.
pub type AnyArc = Arc<dyn Any + Send + Sync>;

pub(crate) type ErasedFactory = Arc<dyn Fn() -> Result<Built, BoxError> + Send + Sync>;

/// A freshly built object together with its reinitialize handle.
pub(crate) struct Built {
    pub(crate) service: AnyArc,
    pub(crate) reinitialize: Option<Arc<dyn Reinitialize>>,
}

impl Built {
    pub(crate) fn new<C, I>(
        instance: Arc<I>,
        upcast: fn(Arc<I>) -> Arc<C>,
        reinitialize: Option<fn(Arc<I>) -> Arc<dyn Reinitialize>>,
    ) -> Self
    where
        C: ?Sized + Send + Sync + 'static,
        I: Send + Sync + 'static,
    {
        let hook = reinitialize.map(|as_hook| as_hook(instance.clone()));
        let service: Arc<C> = upcast(instance);
        Self {
            service: Arc::new(service),
            reinitialize: hook,
        }
    }
}

/// Binding of a capability key to an erased implementation
pub(crate) struct Binding {
    /// Capability the binding was registered under
    pub(crate) key: Key,
    pub(crate) impl_id: TypeId,
    pub(crate) impl_name: &'static str,
    pub(crate) construction: Construction,
    pub(crate) survivor: bool,
    pub(crate) reinitializable: bool,
    /// `None` for bindings created from a supplied instance
    pub(crate) factory: Option<ErasedFactory>,
}

impl std::fmt::Debug for Binding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binding")
            .field("key", &self.key)
            .field("implementation", &self.impl_name)
            .field("construction", &self.construction)
            .field("survivor", &self.survivor)
            .field("reinitializable", &self.reinitializable)
            .field("has_factory", &self.factory.is_some())
            .finish()
    }
}

/// Materialized singleton.
///
/// Keeps the binding it was built from so a surviving instance can be
/// re-registered with its own implementation after a reset.
pub(crate) struct CachedInstance {
    pub(crate) service: AnyArc,
    pub(crate) binding: Arc<Binding>,
    pub(crate) reinitialize: Option<Arc<dyn Reinitialize>>,
}

impl CachedInstance {
    pub(crate) fn new(built: Built, binding: Arc<Binding>) -> Self {
        Self {
            service: built.service,
            binding,
            reinitialize: built.reinitialize,
        }
    }

    #[inline]
    pub(crate) fn is_survivor(&self) -> bool {
        self.binding.survivor
    }
}

/// Downcast a stored value back to `Arc<C>`.
pub(crate) fn downcast<C>(key: &Key, service: &AnyArc) -> crate::DiResult<Arc<C>>
where
    C: ?Sized + Send + Sync + 'static,
{
    service
        .downcast_ref::<Arc<C>>()
        .cloned()
        .ok_or(crate::DiError::TypeMismatch(key.display_name()))
}
