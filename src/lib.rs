//! skyctl: command-line client for the cloud admin API
//!
//! Layers, innermost first:
//! - `domain`: project alias rules and API entities
//! - `application`: project resolution, aliases and the auth-refresh wrapper
//! - `infrastructure`: file stores, the HTTP client and service wiring
//! - `cli`: argument parsing, dispatch and output

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
