//! Outcome of a lifecycle-boundary notification.

use crate::error::DiError;
use crate::key::Key;

/// What happened when reinitializable instances were notified.
///
/// With failure isolation enabled (the default) every reinitializable
/// instance is notified and failures are collected here instead of aborting
/// the pass.
#[derive(Debug, Clone, Default)]
pub struct BoundaryReport {
    reinitialized: Vec<Key>,
    failures: Vec<(Key, DiError)>,
}

impl BoundaryReport {
    pub(crate) fn record_success(&mut self, key: Key) {
        self.reinitialized.push(key);
    }

    pub(crate) fn record_failure(&mut self, key: Key, error: DiError) {
        self.failures.push((key, error));
    }

    /// Capabilities whose reinitialize hook returned `Ok`.
    pub fn reinitialized(&self) -> &[Key] {
        &self.reinitialized
    }

    /// Capabilities whose hook failed, with the error.
    pub fn failures(&self) -> &[(Key, DiError)] {
        &self.failures
    }

    /// Number of hooks invoked.
    pub fn notified(&self) -> usize {
        self.reinitialized.len() + self.failures.len()
    }

    /// True when no hook failed.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}
