//! Host container seam for host-managed construction.

use crate::error::BoxError;
use crate::registration::AnyArc;

/// A host runtime that owns container objects.
///
/// Implementations built with
/// [`Construction::HostManaged`](crate::Construction::HostManaged) are attached
/// to a host container after the factory ran, so they live inside the host's
/// object-lifecycle system. The container is named
/// `"<capability> (singleton)"`.
///
/// If `adopt` fails the object is dropped and resolution reports a
/// construction failure.
///
/// # Examples
///
/// ```
/// use ferrous_locator::{AnyArc, BoxError, HostContainer};
/// use std::sync::Mutex;
///
/// #[derive(Default)]
/// struct SceneGraph {
///     nodes: Mutex<Vec<String>>,
/// }
///
/// impl HostContainer for SceneGraph {
///     fn adopt(&self, container_name: &str, _implementation: &'static str, _instance: AnyArc) -> Result<(), BoxError> {
///         self.nodes.lock().unwrap().push(container_name.to_string());
///         Ok(())
///     }
/// }
/// ```
pub trait HostContainer: Send + Sync {
    /// Attach `instance` to a new host container called `container_name`.
    fn adopt(
        &self,
        container_name: &str,
        implementation: &'static str,
        instance: AnyArc,
    ) -> Result<(), BoxError>;
}
