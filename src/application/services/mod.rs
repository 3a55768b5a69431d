//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (ConfigStore, ProjectsApi, etc.)
//! but are themselves concrete structs, not traits.

mod aliases;
mod auth;
mod resolver;

pub use aliases::{AliasAdded, AliasService};
pub use auth::AuthService;
pub use resolver::ProjectResolver;
