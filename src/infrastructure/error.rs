//! Infrastructure-level errors (wraps application errors)

use std::time::Duration;

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;

/// Failures of the external graph renderer.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("renderer '{program}' is not available: {source}")]
    Unavailable {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("renderer '{program}' failed ({status}): {diagnostic}")]
    Failed {
        program: String,
        status: String,
        diagnostic: String,
    },

    #[error("renderer '{program}' did not finish within {timeout:?}")]
    Timeout { program: String, timeout: Duration },

    #[error("renderer '{program}' produced no output")]
    EmptyOutput { program: String },

    #[error("layout rejected: {0}")]
    Layout(#[source] DomainError),

    #[error("I/O error while running renderer '{program}'")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// Infrastructure errors wrap application errors and add I/O-level concerns.
#[derive(Error, Debug)]
pub enum InfraError {
    #[error("{0}")]
    Application(#[from] ApplicationError),

    #[error("I/O error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl InfraError {
    /// Create an I/O error with context.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}

/// Result type for infrastructure layer operations.
pub type InfraResult<T> = Result<T, InfraError>;
