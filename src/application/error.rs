//! Application-level errors (wraps domain and API errors)

use thiserror::Error;

use crate::domain::DomainError;
use crate::infrastructure::api::ApiError;

/// Application errors wrap domain errors and add application-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("no project specified: pass --project or set a default with `skyctl use <project>`")]
    NoProjectSpecified,

    #[error("project not found: {identifier}")]
    ProjectNotFound { identifier: String },

    #[error("not logged in: run `skyctl login`")]
    NotLoggedIn,

    #[error("{0}")]
    Api(#[from] ApiError),

    #[error("config error: {message}")]
    Config { message: String },

    #[error("operation failed: {context}: {source}")]
    OperationFailed {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl ApplicationError {
    /// True when the failure carries the expired-session signal.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::Api(api) if api.is_auth_expired())
    }
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
