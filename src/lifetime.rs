//! Service lifetime definitions.

/// Binding scopes controlling instance caching behavior
///
/// # Examples
///
/// ```rust
/// use ferrous_locator::{Implementation, ServiceRegistry};
/// use std::sync::Arc;
///
/// #[derive(Default)]
/// struct Router;
/// #[derive(Default)]
/// struct Envelope;
///
/// let mut registry = ServiceRegistry::new();
/// registry.register_singleton(Implementation::<Router, Router>::from_default());
/// registry.register_transient(Implementation::<Envelope, Envelope>::from_default());
///
/// // Singleton: same instance until the next reset
/// let a = registry.resolve::<Router>().unwrap().unwrap();
/// let b = registry.resolve::<Router>().unwrap().unwrap();
/// assert!(Arc::ptr_eq(&a, &b));
///
/// // Transient: always a fresh instance
/// let x = registry.resolve::<Envelope>().unwrap().unwrap();
/// let y = registry.resolve::<Envelope>().unwrap().unwrap();
/// assert!(!Arc::ptr_eq(&x, &y));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "snake_case"))]
pub enum Lifetime {
    /// One instance per capability, created on first resolution and cached
    /// until the registry is reset.
    ///
    /// Instances whose implementation is declared a survivor outlive the
    /// reset as well.
    Singleton,
    /// New instance per resolution, never cached
    Transient,
}

impl std::fmt::Display for Lifetime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Lifetime::Singleton => f.write_str("singleton"),
            Lifetime::Transient => f.write_str("transient"),
        }
    }
}
