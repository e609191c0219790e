//! Error types for containers and the container registry.

use thiserror::Error;

/// Container-level errors.
///
/// Raised while a container resolves services, while it is being built from
/// a configuration identifier, or while it populates an [`Autowire`] target.
///
/// [`Autowire`]: crate::Autowire
///
/// # Examples
///
/// ```rust
/// use context_registry::{Container, DiError, ServiceCollection};
///
/// let container = ServiceCollection::new().build();
/// match container.get::<String>() {
///     Err(DiError::NotFound(key)) => assert_eq!(key, "alloc::string::String"),
///     _ => unreachable!(),
/// }
/// ```
///
/// ```rust
/// use context_registry::DiError;
///
/// let circular = DiError::Circular(vec!["House".into(), "Family".into(), "House".into()]);
/// assert_eq!(circular.to_string(), "Circular dependency: House -> Family -> House");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiError {
    /// No registration satisfies the requested key
    #[error("Service not found: {0}")]
    NotFound(String),
    /// More than one registration satisfies an unnamed lookup
    #[error("Ambiguous service {type_name}: candidates [{}]", .candidates.join(", "))]
    Ambiguous {
        type_name: &'static str,
        candidates: Vec<String>,
    },
    /// Type downcast failed
    #[error("Type mismatch for: {0}")]
    TypeMismatch(&'static str),
    /// Circular dependency detected (includes path)
    #[error("Circular dependency: {}", .0.join(" -> "))]
    Circular(Vec<String>),
    /// Maximum recursion depth exceeded
    #[error("Max depth {0} exceeded")]
    DepthExceeded(usize),
    /// No configuration is known under the identifier
    #[error("Unknown configuration: {0}")]
    UnknownConfiguration(String),
    /// A configuration source could not be read or is malformed
    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

/// Result type for container operations.
pub type DiResult<T> = Result<T, DiError>;

/// Errors surfaced by [`ContainerRegistry`](crate::ContainerRegistry).
///
/// The registry never recovers from either variant. A construction failure
/// leaves no cached entry, so calling again retries; an injection failure
/// leaves the cached container in place.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Building the container for `identifier` failed
    #[error("Failed to construct container for `{identifier}`: {source}")]
    ContainerConstruction {
        identifier: String,
        #[source]
        source: DiError,
    },
    /// The container for `identifier` could not satisfy a dependency of `target`
    #[error("Failed to inject dependencies into {target} from `{identifier}`: {source}")]
    DependencyInjection {
        identifier: String,
        target: &'static str,
        #[source]
        source: DiError,
    },
}

impl RegistryError {
    /// The configuration identifier the failed call was made with.
    pub fn identifier(&self) -> &str {
        match self {
            RegistryError::ContainerConstruction { identifier, .. } => identifier,
            RegistryError::DependencyInjection { identifier, .. } => identifier,
        }
    }

    /// The underlying container error.
    pub fn di_error(&self) -> &DiError {
        match self {
            RegistryError::ContainerConstruction { source, .. } => source,
            RegistryError::DependencyInjection { source, .. } => source,
        }
    }
}

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;
