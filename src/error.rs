//! Error types for the service registry.

use thiserror::Error;

/// Boxed error returned by factories, host containers and reinitialize hooks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Service registry errors
///
/// Unregistered capabilities are not errors: resolution reports them as
/// `Ok(None)`. What remains is construction failure, which signals a
/// misconfigured registration, plus the reinitialize failures collected at a
/// lifecycle boundary.
///
/// # Examples
///
/// ```rust
/// use ferrous_locator::DiError;
///
/// let not_found = DiError::NotFound("MessageRouter");
/// assert_eq!(not_found.to_string(), "Service not found: MessageRouter");
///
/// let host = DiError::HostUnavailable {
///     service: "dyn Router",
///     implementation: "MessageRouter",
/// };
/// assert!(host.is_construction_failure());
/// ```
#[derive(Debug, Clone, Error)]
pub enum DiError {
    /// Service not registered (only raised by `require`)
    #[error("Service not found: {0}")]
    NotFound(&'static str),
    /// A cached value failed to downcast to the requested capability
    #[error("Type mismatch for: {0}")]
    TypeMismatch(&'static str),
    /// The factory returned an error or panicked, or the host rejected the object
    #[error("Failed to construct {service} using {implementation}: {reason}")]
    Construction {
        service: &'static str,
        implementation: &'static str,
        reason: String,
    },
    /// Binding was registered from an instance and carries no factory
    #[error("No factory to construct {service}: {implementation} was registered as an instance")]
    MissingFactory {
        service: &'static str,
        implementation: &'static str,
    },
    /// Host-managed construction requested without a host container
    #[error("Host-managed construction of {service} ({implementation}) requires a host container")]
    HostUnavailable {
        service: &'static str,
        implementation: &'static str,
    },
    /// Configuration could not be parsed
    #[error("Invalid configuration: {0}")]
    Config(String),
    /// A reinitialize hook failed after a lifecycle boundary
    #[error("Reinitialize failed for {service}: {reason}")]
    Reinitialize {
        service: &'static str,
        reason: String,
    },
}

impl DiError {
    /// True for the variants that mean the bound implementation could not be built.
    pub fn is_construction_failure(&self) -> bool {
        matches!(
            self,
            DiError::Construction { .. } | DiError::MissingFactory { .. } | DiError::HostUnavailable { .. }
        )
    }
}

/// Result type for registry operations
pub type DiResult<T> = Result<T, DiError>;
