//! Unified error types for the data-access layer and its callers.

use std::fmt::Debug;
use thiserror::Error;

/// Driver-level failure reported by a connection or a connection pool.
///
/// These are the causes wrapped by [`CoursesError::Store`]; callers match on
/// them only for diagnostics.
#[derive(Error, Debug)]
pub enum StoreError {
    /// SQLx driver error
    #[cfg(feature = "sqlx")]
    #[error("SQLx error: {0}")]
    Sqlx(#[source] sqlx::Error),

    /// Connection could not be established or was lost
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Statement was rejected or failed while executing
    #[error("Statement execution failed: {0}")]
    Execution(String),

    /// No connection became available in time
    #[error("Connection pool exhausted")]
    PoolExhausted,
}

impl StoreError {
    /// Creates an execution error.
    #[must_use]
    pub fn execution<T: Into<String>>(message: T) -> Self {
        Self::Execution(message.into())
    }

    /// Creates a connection error.
    #[must_use]
    pub fn connection<T: Into<String>>(message: T) -> Self {
        Self::Connection(message.into())
    }
}

#[cfg(feature = "sqlx")]
impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut => Self::PoolExhausted,
            sqlx::Error::PoolClosed => Self::Connection("pool is closed".to_string()),
            other => Self::Sqlx(other),
        }
    }
}

/// Unified error type for the student courses data layer.
#[derive(Error, Debug)]
pub enum CoursesError {
    // ============ Caller Errors ============
    /// Entity is not well-formed for the requested operation
    #[error("Invalid entity: {0}")]
    InvalidEntity(String),

    /// Request does not match the table it targets
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Field-level validation failure
    #[error("Validation error: {0}")]
    Validation(String),

    // ============ Infrastructure Errors ============
    /// Underlying store failed while executing an operation
    #[error("Internal store error: {0}")]
    Store(#[from] StoreError),

    /// Row could not be turned into an entity, or an entity into parameters
    #[error("Data mapping error: {0}")]
    DataMapping(String),

    /// Configuration or schema error
    #[error("Configuration error: {0}")]
    Configuration(String),

    // ============ Internal Errors ============
    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Generic error wrapper
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CoursesError {
    /// Returns a machine-readable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidEntity(_) => "INVALID_ENTITY",
            Self::InvalidRequest(_) => "INVALID_REQUEST",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Store(_) => "INTERNAL_STORE_ERROR",
            Self::DataMapping(_) => "DATA_MAPPING_ERROR",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Internal(_) | Self::Other(_) => "INTERNAL_ERROR",
        }
    }

    /// Creates an invalid-entity error naming the offending entity.
    #[must_use]
    pub fn invalid_entity<E: Debug>(entity: &E, reason: &str) -> Self {
        Self::InvalidEntity(format!("{reason}: {entity:?}"))
    }

    /// Creates an invalid-request error.
    #[must_use]
    pub fn invalid_request<T: Into<String>>(message: T) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Creates a validation error.
    #[must_use]
    pub fn validation<T: Into<String>>(message: T) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a data-mapping error.
    #[must_use]
    pub fn data_mapping<T: Into<String>>(message: T) -> Self {
        Self::DataMapping(message.into())
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn configuration<T: Into<String>>(message: T) -> Self {
        Self::Configuration(message.into())
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal<T: Into<String>>(message: T) -> Self {
        Self::Internal(message.into())
    }

    /// Checks if this error was caused by the caller's input rather than the store.
    #[must_use]
    pub const fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidEntity(_) | Self::InvalidRequest(_) | Self::Validation(_)
        )
    }

    /// Returns the wrapped store failure, if any.
    #[must_use]
    pub const fn store_cause(&self) -> Option<&StoreError> {
        match self {
            Self::Store(cause) => Some(cause),
            _ => None,
        }
    }
}

#[cfg(feature = "sqlx")]
impl From<sqlx::Error> for CoursesError {
    fn from(err: sqlx::Error) -> Self {
        Self::Store(StoreError::from(err))
    }
}
