//! Process-wide registry handle.
//!
//! For hosts that expect one registry per process. Prefer passing a
//! [`ServiceRegistry`] explicitly where possible; tests in particular should
//! build their own.
//!
//! All access goes through one mutex. Calling [`with`] from inside a closure
//! passed to [`with`] deadlocks.
//!
//! # Examples
//!
//! ```
//! use ferrous_locator::{global, Implementation};
//!
//! #[derive(Default)]
//! struct AudioMixer;
//!
//! global::init();
//! global::with(|registry| {
//!     registry.register_singleton(Implementation::<AudioMixer, AudioMixer>::from_default());
//! });
//!
//! let mixer = global::with(|registry| registry.resolve::<AudioMixer>()).unwrap();
//! assert!(mixer.is_some());
//! global::teardown();
//! ```

use std::sync::OnceLock;

#[cfg(feature = "parking-lot")]
use parking_lot::Mutex;
#[cfg(not(feature = "parking-lot"))]
use std::sync::Mutex;

use crate::registry::ServiceRegistry;

static GLOBAL: OnceLock<Mutex<ServiceRegistry>> = OnceLock::new();

fn cell() -> &'static Mutex<ServiceRegistry> {
    GLOBAL.get_or_init(|| Mutex::new(ServiceRegistry::new()))
}

/// Runs `f` against the process-wide registry.
pub fn with<R, F>(f: F) -> R
where
    F: FnOnce(&mut ServiceRegistry) -> R,
{
    #[cfg(feature = "parking-lot")]
    {
        let mut guard = cell().lock();
        f(&mut guard)
    }

    #[cfg(not(feature = "parking-lot"))]
    {
        // `f` panicking poisons the lock but leaves the registry consistent.
        let mut guard = cell().lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        f(&mut guard)
    }
}

/// Process-start hook.
///
/// Resets the shared registry so state left over from a previous run inside
/// the same process (editor play sessions, REPL reloads) does not leak.
/// Survivors are kept, as with any reset; use [`teardown`] for a blank slate.
pub fn init() {
    with(|registry| registry.reset());
    tracing::debug!("global registry initialised");
}

/// Empties the shared registry, survivors included.
pub fn teardown() {
    with(|registry| registry.teardown());
}
