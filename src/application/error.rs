//! Application-level errors (wraps domain and renderer errors)

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::DomainError;
use crate::infrastructure::RenderError;

/// Application errors wrap domain errors and add application-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("render failed: {0}")]
    Render(#[from] RenderError),

    #[error("config error: {message}")]
    Config { message: String },

    #[error("no tree record at JSON pointer '{pointer}'")]
    PointerNotFound { pointer: String },

    #[error("cannot save diagram to {path}")]
    Save {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot display diagram: {message}")]
    Display { message: String },

    #[error("operation failed: {context}")]
    OperationFailed {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
