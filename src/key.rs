//! Capability key types for the service registry.

use std::any::TypeId;

/// Key for binding and instance lookup.
///
/// A key identifies a capability by its type identity. Capabilities may be
/// concrete types (`MessageRouter`) or trait objects (`dyn Router`); both
/// have a `TypeId` as long as they are `'static`.
///
/// The type name is carried for diagnostics only. Equality, ordering and
/// hashing look at the `TypeId` alone.
///
/// # Examples
///
/// ```rust
/// use ferrous_locator::{Key, key_of};
///
/// trait Router: Send + Sync {}
///
/// let concrete = key_of::<String>();
/// let capability = key_of::<dyn Router>();
///
/// assert_eq!(concrete.display_name(), "alloc::string::String");
/// assert!(capability.display_name().contains("Router"));
/// assert_ne!(concrete, capability);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Key {
    id: TypeId,
    name: &'static str,
}

impl Key {
    /// Creates a key from a type id and its display name.
    pub fn new(id: TypeId, name: &'static str) -> Self {
        Self { id, name }
    }

    /// The type id backing this key.
    #[inline(always)]
    pub fn type_id(&self) -> TypeId {
        self.id
    }

    /// Get the capability type name for display
    ///
    /// Returns the `std::any::type_name` result captured when the key was
    /// created.
    ///
    /// ```rust
    /// use ferrous_locator::key_of;
    ///
    /// assert_eq!(key_of::<u32>().display_name(), "u32");
    /// ```
    pub fn display_name(&self) -> &'static str {
        self.name
    }
}

// TypeId-only comparison: the name is diagnostic
impl PartialEq for Key {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Key {}

impl PartialOrd for Key {
    #[inline(always)]
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Key {
    #[inline(always)]
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.id.cmp(&other.id)
    }
}

impl std::hash::Hash for Key {
    #[inline(always)]
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name)
    }
}

/// Builds the key for capability `T`, sized or `dyn Trait`.
#[inline(always)]
pub fn key_of<T: ?Sized + 'static>() -> Key {
    Key::new(TypeId::of::<T>(), std::any::type_name::<T>())
}
