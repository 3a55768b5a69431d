//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::path::Path;
use std::sync::Arc;

use crate::application::services::{AliasService, AuthService, ProjectResolver};
use crate::config::Settings;
use crate::infrastructure::api::{
    AuthApi, CollectionsApi, HttpAdminClient, InstancesApi, ProjectsApi,
};
use crate::infrastructure::traits::{
    ConfigStore, CredentialStore, FileCredentialStore, FileSystem, JsonConfigStore,
    RealFileSystem,
};
use crate::infrastructure::{InfraError, InfraResult};

/// Container holding settings, stores and API seams.
///
/// Services are cheap to build and are created on demand from these parts.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Project alias file
    pub project_store: Arc<dyn ConfigStore>,

    /// Login state
    pub credentials: Arc<dyn CredentialStore>,

    pub auth_api: Arc<dyn AuthApi>,
    pub projects_api: Arc<dyn ProjectsApi>,
    pub instances_api: Arc<dyn InstancesApi>,
    pub collections_api: Arc<dyn CollectionsApi>,
}

/// API implementations handed to [`ServiceContainer::with_deps`].
pub struct ApiSet {
    pub auth: Arc<dyn AuthApi>,
    pub projects: Arc<dyn ProjectsApi>,
    pub instances: Arc<dyn InstancesApi>,
    pub collections: Arc<dyn CollectionsApi>,
}

impl ApiSet {
    /// One client serving every API family.
    pub fn shared<C>(client: Arc<C>) -> Self
    where
        C: AuthApi + ProjectsApi + InstancesApi + CollectionsApi + 'static,
    {
        Self {
            auth: client.clone(),
            projects: client.clone(),
            instances: client.clone(),
            collections: client,
        }
    }
}

impl ServiceContainer {
    /// Create a container with real implementations.
    ///
    /// `work_dir` is where the project alias file is read from and written to.
    pub fn new(settings: Settings, work_dir: &Path) -> InfraResult<Self> {
        let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
        let project_store = Arc::new(JsonConfigStore::new(
            fs.clone(),
            work_dir,
            &settings.project_file,
        ));
        let credentials = Arc::new(FileCredentialStore::new(
            fs,
            settings.credentials_file.clone(),
        ));
        let client =
            Arc::new(HttpAdminClient::new(settings.timeout()).map_err(InfraError::HttpClient)?);

        Ok(Self::with_deps(
            settings,
            project_store,
            credentials,
            ApiSet::shared(client),
        ))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        project_store: Arc<dyn ConfigStore>,
        credentials: Arc<dyn CredentialStore>,
        apis: ApiSet,
    ) -> Self {
        Self {
            settings: Arc::new(settings),
            project_store,
            credentials,
            auth_api: apis.auth,
            projects_api: apis.projects,
            instances_api: apis.instances,
            collections_api: apis.collections,
        }
    }

    pub fn auth(&self) -> AuthService {
        AuthService::new(self.auth_api.clone(), self.credentials.clone())
    }

    pub fn resolver(&self) -> ProjectResolver {
        ProjectResolver::new(self.projects_api.clone(), self.project_store.clone())
    }

    pub fn aliases(&self) -> AliasService {
        AliasService::new(self.projects_api.clone(), self.project_store.clone())
    }
}
