//! Project resolution
//!
//! Turns a user-supplied identifier (or none) into the canonical remote
//! project, going through the local alias mapping first.

use std::sync::Arc;

use tracing::debug;

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{AuthSession, ResolvedProject};
use crate::infrastructure::api::{ApiError, ProjectsApi};
use crate::infrastructure::traits::ConfigStore;

/// Resolves `--project` values against the project file and the remote API.
pub struct ProjectResolver {
    projects: Arc<dyn ProjectsApi>,
    store: Arc<dyn ConfigStore>,
}

impl ProjectResolver {
    pub fn new(projects: Arc<dyn ProjectsApi>, store: Arc<dyn ConfigStore>) -> Self {
        Self { projects, store }
    }

    /// Resolve the target project.
    ///
    /// 1. `requested`, else the configured default, else `NoProjectSpecified`
    /// 2. one level of alias substitution
    /// 3. exact remote lookup by id or name
    ///
    /// Never writes the project file.
    pub async fn resolve(
        &self,
        session: &AuthSession,
        requested: Option<&str>,
    ) -> ApplicationResult<ResolvedProject> {
        let config = self.store.read();

        let candidate = match requested.map(str::trim).filter(|s| !s.is_empty()) {
            Some(id) => id,
            None => config
                .default_project()
                .ok_or(ApplicationError::NoProjectSpecified)?,
        };
        let target = config.resolve_alias(candidate);
        debug!("resolve: candidate={} target={}", candidate, target);

        match self.projects.get_project(session, target).await {
            Ok(project) => Ok(project.into()),
            Err(ApiError::NotFound { .. }) => Err(ApplicationError::ProjectNotFound {
                identifier: target.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }
}
