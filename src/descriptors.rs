//! Service descriptors for introspection and diagnostics.

use std::any::TypeId;

use crate::implementation::Construction;
use crate::key::Key;
use crate::lifetime::Lifetime;

/// Snapshot of one binding for introspection.
///
/// Returned by [`ServiceRegistry::descriptors`](crate::ServiceRegistry::descriptors).
/// Useful when checking what survived a reset or what a bootstrap script
/// registered.
///
/// # Examples
///
/// ```rust
/// use ferrous_locator::{Implementation, Lifetime, ServiceRegistry};
///
/// #[derive(Default)]
/// struct Router;
///
/// let mut registry = ServiceRegistry::new();
/// registry.register_singleton(Implementation::<Router, Router>::from_default().survives_reset());
/// registry.register_transient(Implementation::<String, String>::new(String::new));
///
/// let descriptors = registry.descriptors();
/// let router = descriptors
///     .iter()
///     .find(|d| d.type_name().ends_with("Router"))
///     .unwrap();
/// assert_eq!(router.lifetime, Lifetime::Singleton);
/// assert!(router.survivor);
/// assert!(!router.materialized);
///
/// let transients = descriptors.iter().filter(|d| d.lifetime == Lifetime::Transient).count();
/// assert_eq!(transients, 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceDescriptor {
    /// The capability key
    pub key: Key,
    /// Scope the binding lives in
    pub lifetime: Lifetime,
    /// Implementation type ID
    pub impl_type_id: TypeId,
    /// Implementation type name
    pub impl_type_name: &'static str,
    pub construction: Construction,
    pub survivor: bool,
    pub reinitializable: bool,
    /// Whether a factory is available to (re)build the service
    pub has_factory: bool,
    /// Whether a singleton instance is currently cached (always false for
    /// transients)
    pub materialized: bool,
}

impl ServiceDescriptor {
    /// Get the capability type name
    pub fn type_name(&self) -> &'static str {
        self.key.display_name()
    }

    /// True when the capability is bound to its own type.
    pub fn is_self_bound(&self) -> bool {
        self.key.type_id() == self.impl_type_id
    }
}
