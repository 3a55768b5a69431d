//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent business rule violations.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("'{0}' is reserved and cannot be used as an alias")]
    ReservedAlias(String),

    #[error("identifier must not be empty")]
    EmptyIdentifier,

    #[error("no such alias: {0}")]
    UnknownAlias(String),
}
