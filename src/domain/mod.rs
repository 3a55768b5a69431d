//! Domain layer: entities and business rules
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod entities;
pub mod error;
pub mod project_config;

pub use entities::*;
pub use error::DomainError;
pub use project_config::{ProjectConfig, DEFAULT_KEY};
