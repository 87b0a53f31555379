//! Error types for fx-plumbing.
//!
//! Every error here is a setup/lifecycle misuse. Once a ring buffer is
//! sealed, writing and reading cannot fail; they only block.

use thiserror::Error;

/// Result type alias for ring buffer setup operations
pub type Result<T> = std::result::Result<T, DisruptorError>;

/// Errors returned by ring buffer registration, sealing and configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DisruptorError {
    /// Registration or sealing attempted after the ring buffer was sealed
    #[error("ring buffer has already been started")]
    AlreadyStarted,

    /// A writer handle was already issued for this ring buffer
    #[error("a writer has already been assigned to this ring buffer")]
    WriterAlreadyAssigned,

    /// Sealing attempted before any writer was registered
    #[error("cannot start a ring buffer without a writer")]
    NoWriterAssigned,

    /// Invalid configuration parameter
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Error message describing the configuration issue
        message: String,
    },
}

impl DisruptorError {
    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Check if this error comes from violating the register/seal protocol
    pub fn is_lifecycle_error(&self) -> bool {
        matches!(self, Self::AlreadyStarted | Self::WriterAlreadyAssigned | Self::NoWriterAssigned)
    }
}

/// Convenience macro for creating configuration errors
#[macro_export]
macro_rules! config_error {
    ($($arg:tt)*) => {
        $crate::error::DisruptorError::config(format!($($arg)*))
    };
}
