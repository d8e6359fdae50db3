use thiserror::Error;

/// Application level error type used throughout the crate.
///
/// Protocol-contract violations (stale event id, double acknowledge, ...)
/// are NOT errors; they are returned to callers as
/// [`StatusCode`](crate::status::StatusCode) values. `UaError` covers
/// configuration problems and internal evaluation faults, which the update
/// pipeline logs and swallows.
#[derive(Error, Debug)]
pub enum UaError {
    /// I/O related failure
    #[error("Io error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or inconsistent configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error while parsing YAML configuration files
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Requested node was not found in the address space
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    /// Returned value type does not match the expected type
    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        /// Type the caller asked for
        expected: &'static str,
        /// Type actually held
        actual: &'static str,
    },
}

/// Convenient alias over [`Result`] using [`UaError`]
pub type Result<T> = std::result::Result<T, UaError>;
