//! # ferrous-locator
//!
//! Typed service registry for long-lived processes that cross lifecycle
//! boundaries: application restarts inside one process, scene or context
//! reloads.
//!
//! ## Features
//!
//! - **Typed capabilities**: bind concrete types or `dyn Trait` capabilities
//! - **Singleton and transient scopes**: lazy, cached singletons; fresh transients
//! - **Lifecycle boundaries**: `reset` keeps survivor singletons and drops the rest
//! - **Reinitialize notification**: refresh surviving services after a boundary
//! - **Host-managed construction**: attach singletons to a host runtime container
//! - **No-result resolution**: unregistered capabilities resolve to `None`, not errors
//!
//! ## Quick Start
//!
//! ```rust
//! use ferrous_locator::{Implementation, ServiceRegistry};
//! use std::sync::Arc;
//!
//! trait Router: Send + Sync {
//!     fn name(&self) -> &'static str;
//! }
//!
//! #[derive(Default)]
//! struct MessageRouter;
//!
//! impl Router for MessageRouter {
//!     fn name(&self) -> &'static str {
//!         "message-router"
//!     }
//! }
//!
//! let mut registry = ServiceRegistry::new();
//! registry.register_singleton(
//!     Implementation::<MessageRouter, MessageRouter>::from_default()
//!         .bind(|router: Arc<MessageRouter>| router as Arc<dyn Router>),
//! );
//!
//! let router = registry.resolve::<dyn Router>().unwrap().unwrap();
//! assert_eq!(router.name(), "message-router");
//!
//! // Unregistered capabilities are not errors
//! assert!(registry.resolve::<String>().unwrap().is_none());
//! ```
//!
//! ## Lifecycle boundaries
//!
//! ```rust
//! use ferrous_locator::{Implementation, ServiceRegistry};
//! use std::sync::Arc;
//!
//! #[derive(Default)]
//! struct Session;
//! #[derive(Default)]
//! struct LevelState;
//!
//! let mut registry = ServiceRegistry::new();
//! registry.register_singleton(Implementation::<Session, Session>::from_default().survives_reset());
//! registry.register_singleton(Implementation::<LevelState, LevelState>::from_default());
//!
//! let session = registry.resolve::<Session>().unwrap().unwrap();
//! registry.resolve::<LevelState>().unwrap();
//!
//! registry.reset();
//!
//! let again = registry.resolve::<Session>().unwrap().unwrap();
//! assert!(Arc::ptr_eq(&session, &again));
//! assert!(registry.resolve::<LevelState>().unwrap().is_none());
//! ```

// Module declarations
pub mod boundary;
pub mod config;
pub mod descriptors;
pub mod error;
pub mod global;
pub mod implementation;
pub mod key;
pub mod lifetime;
pub mod observer;
pub mod registry;
pub mod traits;

// Internal modules
mod internal;
mod registration;

// Re-export core types
pub use boundary::BoundaryReport;
pub use config::{ConfigSource, ConfigValue, EnvironmentConfigSource, MemoryConfigSource, RegistryConfig};
pub use descriptors::ServiceDescriptor;
pub use error::{BoxError, DiError, DiResult};
pub use implementation::{Construction, Implementation};
pub use key::{key_of, Key};
pub use lifetime::Lifetime;
pub use observer::{DiObserver, TracingObserver};
pub use registration::AnyArc;
pub use registry::ServiceRegistry;
pub use traits::{HostContainer, Reinitialize};
