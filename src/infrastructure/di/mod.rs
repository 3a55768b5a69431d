//! Dependency wiring

mod service_container;

pub use service_container::{ApiSet, ServiceContainer};
