//! Diagnostic observers for registry traceability.
//!
//! Observers receive construction, reset and boundary events as they happen.
//! The registry logs through `tracing` on its own; observers are for callers
//! that want the events as data (metrics, assertions in tests, editor panels).

use std::sync::Arc;
use std::time::Duration;

use crate::boundary::BoundaryReport;
use crate::error::DiError;
use crate::key::Key;

/// Observer trait for registry events.
///
/// Observer calls are made synchronously from inside registry operations.
/// Keep implementations lightweight.
///
/// # Examples
///
/// ```
/// use ferrous_locator::{DiObserver, Implementation, Key, ServiceRegistry};
/// use std::sync::{Arc, Mutex};
/// use std::time::Duration;
///
/// #[derive(Default)]
/// struct Recorder {
///     built: Mutex<Vec<&'static str>>,
/// }
///
/// impl DiObserver for Recorder {
///     fn resolving(&self, _key: &Key) {}
///
///     fn resolved(&self, key: &Key, _duration: Duration) {
///         self.built.lock().unwrap().push(key.display_name());
///     }
///
///     fn factory_panic(&self, _key: &Key, _message: &str) {}
/// }
///
/// let recorder = Arc::new(Recorder::default());
/// let mut registry = ServiceRegistry::new();
/// registry.add_observer(recorder.clone());
/// registry.register_singleton(Implementation::<u64, u64>::new(|| 7));
///
/// registry.resolve::<u64>().unwrap();
/// registry.resolve::<u64>().unwrap(); // cached, no second construction
/// assert_eq!(*recorder.built.lock().unwrap(), vec!["u64"]);
/// ```
pub trait DiObserver: Send + Sync {
    /// Called before a factory runs.
    fn resolving(&self, key: &Key);

    /// Called after an object was built (and adopted by the host, for
    /// host-managed construction).
    fn resolved(&self, key: &Key, duration: Duration);

    /// Called when a factory panicked. Resolution then fails with
    /// [`DiError::Construction`].
    fn factory_panic(&self, key: &Key, message: &str);

    /// Called for every construction failure, panics included.
    fn construction_failed(&self, _key: &Key, _error: &DiError) {}

    /// Called at the end of a reset with the keys that survived it.
    fn reset(&self, _survivors: &[Key]) {}

    /// Called when a reinitialize hook failed.
    fn reinitialize_failed(&self, _key: &Key, _error: &DiError) {}

    /// Called once every reinitializable instance has been notified.
    fn boundary_completed(&self, _report: &BoundaryReport) {}
}

/// Container for registered observers.
#[derive(Default, Clone)]
pub(crate) struct Observers {
    observers: Vec<Arc<dyn DiObserver>>,
}

impl Observers {
    pub(crate) fn new() -> Self {
        Self {
            observers: Vec::new(),
        }
    }

    pub(crate) fn add(&mut self, observer: Arc<dyn DiObserver>) {
        self.observers.push(observer);
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.observers.len()
    }

    #[inline]
    pub(crate) fn resolving(&self, key: &Key) {
        for observer in &self.observers {
            observer.resolving(key);
        }
    }

    #[inline]
    pub(crate) fn resolved(&self, key: &Key, duration: Duration) {
        for observer in &self.observers {
            observer.resolved(key, duration);
        }
    }

    pub(crate) fn factory_panic(&self, key: &Key, message: &str) {
        for observer in &self.observers {
            observer.factory_panic(key, message);
        }
    }

    pub(crate) fn construction_failed(&self, key: &Key, error: &DiError) {
        for observer in &self.observers {
            observer.construction_failed(key, error);
        }
    }

    pub(crate) fn reset(&self, survivors: &[Key]) {
        for observer in &self.observers {
            observer.reset(survivors);
        }
    }

    pub(crate) fn reinitialize_failed(&self, key: &Key, error: &DiError) {
        for observer in &self.observers {
            observer.reinitialize_failed(key, error);
        }
    }

    pub(crate) fn boundary_completed(&self, report: &BoundaryReport) {
        for observer in &self.observers {
            observer.boundary_completed(report);
        }
    }
}

/// Built-in observer that forwards events to `tracing`.
///
/// The registry already emits `debug`-level events for its own operations;
/// this observer adds per-construction timings at `trace` level and lets the
/// target be customised.
///
/// # Examples
///
/// ```
/// use ferrous_locator::{ServiceRegistry, TracingObserver};
/// use std::sync::Arc;
///
/// let mut registry = ServiceRegistry::new();
/// registry.add_observer(Arc::new(TracingObserver::with_label("scene-registry")));
/// ```
pub struct TracingObserver {
    label: String,
}

impl TracingObserver {
    pub fn new() -> Self {
        Self {
            label: "ferrous-locator".to_string(),
        }
    }

    pub fn with_label(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl Default for TracingObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl DiObserver for TracingObserver {
    fn resolving(&self, key: &Key) {
        tracing::trace!(label = %self.label, service = key.display_name(), "constructing");
    }

    fn resolved(&self, key: &Key, duration: Duration) {
        tracing::trace!(
            label = %self.label,
            service = key.display_name(),
            elapsed_us = duration.as_micros() as u64,
            "constructed"
        );
    }

    fn factory_panic(&self, key: &Key, message: &str) {
        tracing::error!(label = %self.label, service = key.display_name(), panic = message, "factory panicked");
    }

    fn construction_failed(&self, key: &Key, error: &DiError) {
        tracing::error!(label = %self.label, service = key.display_name(), %error, "construction failed");
    }

    fn reset(&self, survivors: &[Key]) {
        tracing::info!(label = %self.label, survivors = survivors.len(), "registry reset");
    }

    fn reinitialize_failed(&self, key: &Key, error: &DiError) {
        tracing::warn!(label = %self.label, service = key.display_name(), %error, "reinitialize failed");
    }

    fn boundary_completed(&self, report: &BoundaryReport) {
        tracing::info!(
            label = %self.label,
            reinitialized = report.reinitialized().len(),
            failed = report.failures().len(),
            "boundary completed"
        );
    }
}
