//! Alias management for the project file

use std::sync::Arc;

use tracing::{debug, info};

use crate::application::services::ProjectResolver;
use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{AuthSession, DomainError, ProjectConfig, ResolvedProject};
use crate::infrastructure::api::{ApiError, ProjectsApi};
use crate::infrastructure::traits::ConfigStore;

/// Outcome of `AliasService::add`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasAdded {
    pub alias: String,
    pub project: ResolvedProject,
    /// The project was made the default because none was set.
    pub became_default: bool,
}

/// Read-modify-write operations on the alias mapping.
pub struct AliasService {
    projects: Arc<dyn ProjectsApi>,
    store: Arc<dyn ConfigStore>,
    resolver: ProjectResolver,
}

impl AliasService {
    pub fn new(projects: Arc<dyn ProjectsApi>, store: Arc<dyn ConfigStore>) -> Self {
        let resolver = ProjectResolver::new(projects.clone(), store.clone());
        Self {
            projects,
            store,
            resolver,
        }
    }

    /// Map `alias` (or the canonical name itself) to `project`.
    ///
    /// The project is checked remotely first; the stored value is its
    /// canonical name. The first project added becomes the default.
    pub async fn add(
        &self,
        session: &AuthSession,
        project: &str,
        alias: Option<&str>,
    ) -> ApplicationResult<AliasAdded> {
        let project = require_identifier(project)?;
        let remote = match self.projects.get_project(session, project).await {
            Ok(remote) => remote,
            Err(ApiError::NotFound { .. }) => {
                return Err(ApplicationError::ProjectNotFound {
                    identifier: project.to_string(),
                })
            }
            Err(e) => return Err(e.into()),
        };
        let resolved = ResolvedProject::from(remote);
        let alias = alias.unwrap_or(resolved.name.as_str()).trim().to_string();

        let mut config = self.store.read();
        let became_default = config.add_alias(&alias, &resolved.name)?;
        self.persist(&config)?;
        info!("alias {} -> {}", alias, resolved.name);

        Ok(AliasAdded {
            alias,
            project: resolved,
            became_default,
        })
    }

    /// Make `project` (alias or name) the default after verifying it remotely.
    pub async fn use_project(
        &self,
        session: &AuthSession,
        project: &str,
    ) -> ApplicationResult<ResolvedProject> {
        let project = require_identifier(project)?;
        let resolved = self.resolver.resolve(session, Some(project)).await?;
        let mut config = self.store.read();
        config.set_default(resolved.name.as_str());
        self.persist(&config)?;
        debug!("default project set to {}", resolved.name);
        Ok(resolved)
    }

    /// Remove a key from the mapping and return the value it held.
    pub fn remove(&self, key: &str) -> ApplicationResult<String> {
        let mut config = self.store.read();
        let removed = config
            .remove(key)
            .ok_or_else(|| DomainError::UnknownAlias(key.to_string()))?;
        self.persist(&config)?;
        Ok(removed)
    }

    pub fn list(&self) -> ProjectConfig {
        self.store.read()
    }

    fn persist(&self, config: &ProjectConfig) -> ApplicationResult<()> {
        self.store
            .write(config)
            .with_path_context("write project file", &self.store.location())
    }
}

/// A positional project argument must name something; blank is not "use the default".
fn require_identifier(project: &str) -> Result<&str, DomainError> {
    let project = project.trim();
    if project.is_empty() {
        return Err(DomainError::EmptyIdentifier);
    }
    Ok(project)
}
