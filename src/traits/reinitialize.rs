//! Reinitialize hook for services that outlive a lifecycle boundary.

use crate::error::BoxError;

/// Trait for services that refresh their state after a lifecycle boundary.
///
/// Implementing the trait is not enough on its own: the implementation must
/// also be declared reinitializable when it is registered, see
/// [`Implementation::reinitializable`](crate::Implementation::reinitializable).
/// The registry then calls [`reinitialize`](Reinitialize::reinitialize) on the
/// cached instance every time
/// [`handle_boundary_completion`](crate::ServiceRegistry::handle_boundary_completion)
/// runs.
///
/// # Examples
///
/// ```
/// use ferrous_locator::{BoxError, Implementation, Reinitialize, ServiceRegistry};
/// use std::sync::atomic::{AtomicUsize, Ordering};
///
/// #[derive(Default)]
/// struct SceneCache {
///     reloads: AtomicUsize,
/// }
///
/// impl Reinitialize for SceneCache {
///     fn reinitialize(&self) -> Result<(), BoxError> {
///         self.reloads.fetch_add(1, Ordering::SeqCst);
///         Ok(())
///     }
/// }
///
/// let mut registry = ServiceRegistry::new();
/// registry.register_singleton(
///     Implementation::<SceneCache, SceneCache>::from_default()
///         .survives_reset()
///         .reinitializable(),
/// );
/// let cache = registry.resolve::<SceneCache>().unwrap().unwrap();
///
/// registry.reset();
/// registry.handle_boundary_completion().unwrap();
/// assert_eq!(cache.reloads.load(Ordering::SeqCst), 1);
/// ```
pub trait Reinitialize: Send + Sync + 'static {
    /// Refresh state after the host signalled boundary completion.
    fn reinitialize(&self) -> Result<(), BoxError>;
}
