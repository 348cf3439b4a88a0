//! Registry configuration.
//!
//! Configuration is resolved from a [`ConfigSource`]: environment variables
//! by default, an in-memory map for tests, or JSON with the `config` feature.

use std::collections::HashMap;
use std::env;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "config")]
use crate::{DiError, DiResult};

/// Prefix for environment variables read by [`RegistryConfig::from_env`].
pub const ENV_PREFIX: &str = "FERROUS_LOCATOR";

/// Behaviour switches for a [`ServiceRegistry`](crate::ServiceRegistry).
///
/// # Examples
///
/// ```
/// use ferrous_locator::{MemoryConfigSource, RegistryConfig};
///
/// let source = MemoryConfigSource::new()
///     .with("isolate_reinitialize_failures", "false")
///     .with("host_container_suffix", " [service]");
///
/// let config = RegistryConfig::from_source(&source);
/// assert!(!config.isolate_reinitialize_failures);
/// assert!(config.warn_on_unregister_mismatch);
/// assert_eq!(config.host_container_suffix, " [service]");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct RegistryConfig {
    /// Keep notifying remaining instances when one reinitialize hook fails.
    pub isolate_reinitialize_failures: bool,
    /// Log a warning when `unregister_singleton` is handed an instance that is
    /// not the cached one. Removal happens either way.
    pub warn_on_unregister_mismatch: bool,
    /// Appended to the capability name to name host containers.
    pub host_container_suffix: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            isolate_reinitialize_failures: true,
            warn_on_unregister_mismatch: true,
            host_container_suffix: " (singleton)".to_string(),
        }
    }
}

impl RegistryConfig {
    /// Reads `FERROUS_LOCATOR_*` environment variables over the defaults.
    pub fn from_env() -> Self {
        Self::from_source(&EnvironmentConfigSource::with_prefix(ENV_PREFIX))
    }

    /// Reads known keys from `source`; missing or mistyped keys keep their
    /// default.
    pub fn from_source(source: &dyn ConfigSource) -> Self {
        let mut config = Self::default();

        if let Some(value) = source.get("isolate_reinitialize_failures").and_then(|v| v.as_bool()) {
            config.isolate_reinitialize_failures = value;
        }
        if let Some(value) = source.get("warn_on_unregister_mismatch").and_then(|v| v.as_bool()) {
            config.warn_on_unregister_mismatch = value;
        }
        if let Some(suffix) = source.get_raw("host_container_suffix") {
            config.host_container_suffix = suffix;
        }

        config
    }

    /// Parses a JSON object; absent fields keep their default.
    #[cfg(feature = "config")]
    pub fn from_json_str(json: &str) -> DiResult<Self> {
        serde_json::from_str(json).map_err(|e| DiError::Config(e.to_string()))
    }

    /// Serializes the configuration as pretty JSON.
    #[cfg(feature = "config")]
    pub fn to_json_string(&self) -> DiResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| DiError::Config(e.to_string()))
    }
}

/// A configuration value parsed from a source.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    String(String),
    Integer(i64),
    Boolean(bool),
}

impl ConfigValue {
    /// Parses raw text the way environment variables are interpreted.
    pub fn parse(raw: &str) -> Self {
        if let Ok(int_val) = raw.parse::<i64>() {
            ConfigValue::Integer(int_val)
        } else if let Ok(bool_val) = raw.parse::<bool>() {
            ConfigValue::Boolean(bool_val)
        } else {
            ConfigValue::String(raw.to_string())
        }
    }

    /// Boolean view; `1`/`0` count as well.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Boolean(b) => Some(*b),
            ConfigValue::Integer(1) => Some(true),
            ConfigValue::Integer(0) => Some(false),
            _ => None,
        }
    }

    pub fn into_string(self) -> String {
        match self {
            ConfigValue::String(s) => s,
            ConfigValue::Integer(i) => i.to_string(),
            ConfigValue::Boolean(b) => b.to_string(),
        }
    }
}

/// Trait for configuration sources
pub trait ConfigSource: Send + Sync + std::fmt::Debug {
    /// Get the raw text stored under a key
    fn get_raw(&self, key: &str) -> Option<String>;

    /// Get a configuration value by key, typed by [`ConfigValue::parse`]
    fn get(&self, key: &str) -> Option<ConfigValue> {
        self.get_raw(key).map(|raw| ConfigValue::parse(&raw))
    }

    /// List all available keys
    fn keys(&self) -> Vec<String>;
}

/// Environment variable configuration source
///
/// Key `host_container_suffix` with prefix `FERROUS_LOCATOR` reads
/// `FERROUS_LOCATOR_HOST_CONTAINER_SUFFIX`.
#[derive(Debug)]
pub struct EnvironmentConfigSource {
    prefix: String,
}

impl EnvironmentConfigSource {
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into().to_uppercase(),
        }
    }

    fn variable(&self, key: &str) -> String {
        format!("{}_{}", self.prefix, key.to_uppercase())
    }
}

impl ConfigSource for EnvironmentConfigSource {
    fn get_raw(&self, key: &str) -> Option<String> {
        env::var(self.variable(key)).ok()
    }

    fn keys(&self) -> Vec<String> {
        let prefix = format!("{}_", self.prefix);
        env::vars()
            .filter_map(|(key, _)| key.strip_prefix(&prefix).map(str::to_lowercase))
            .collect()
    }
}

/// In-memory configuration source, mostly for tests and embedding hosts.
#[derive(Debug, Default, Clone)]
pub struct MemoryConfigSource {
    values: HashMap<String, String>,
}

impl MemoryConfigSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }
}

impl ConfigSource for MemoryConfigSource {
    fn get_raw(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn keys(&self) -> Vec<String> {
        self.values.keys().cloned().collect()
    }
}
