//! Admin API seams
//!
//! Each resource family is its own trait so commands and tests depend only
//! on what they call. `HttpAdminClient` implements all of them.

mod http;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::domain::{AuthSession, Collection, Document, Instance, Project, TokenPair};

pub use http::{classify_failure, HttpAdminClient};

/// Failures reported by the admin API.
///
/// `AuthExpired` is the only variant the refresh wrapper reacts to.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("authentication expired or invalid")]
    AuthExpired,

    #[error("not found: {resource}")]
    NotFound { resource: String },

    #[error("server returned {status}: {message}")]
    Remote { status: u16, message: String },

    #[error("request failed: {message}")]
    Transport { message: String },

    #[error("unexpected response: {message}")]
    Decode { message: String },

    #[error("invalid server url '{url}': {message}")]
    InvalidUrl { url: String, message: String },
}

impl ApiError {
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    pub fn remote(status: u16, message: impl Into<String>) -> Self {
        Self::Remote {
            status,
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::AuthExpired)
    }
}

/// Result type for API calls.
pub type ApiResult<T> = Result<T, ApiError>;

/// Body for project creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProject {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Exchange user credentials for a token pair.
    async fn login(&self, server_url: &str, email: &str, password: &str) -> ApiResult<TokenPair>;

    /// Exchange a refresh token for a new token pair.
    async fn refresh(&self, server_url: &str, refresh_token: &str) -> ApiResult<TokenPair>;
}

#[async_trait]
pub trait ProjectsApi: Send + Sync {
    async fn list_projects(&self, session: &AuthSession) -> ApiResult<Vec<Project>>;

    /// Fetch a project by id or canonical name. Unknown projects yield `NotFound`.
    async fn get_project(&self, session: &AuthSession, id_or_name: &str) -> ApiResult<Project>;

    async fn create_project(
        &self,
        session: &AuthSession,
        request: &CreateProject,
    ) -> ApiResult<Project>;
}

#[async_trait]
pub trait InstancesApi: Send + Sync {
    async fn list_instances(&self, session: &AuthSession, project_id: &str)
        -> ApiResult<Vec<Instance>>;

    async fn get_instance(
        &self,
        session: &AuthSession,
        project_id: &str,
        name: &str,
    ) -> ApiResult<Instance>;

    async fn start_instance(
        &self,
        session: &AuthSession,
        project_id: &str,
        name: &str,
    ) -> ApiResult<Instance>;

    async fn stop_instance(
        &self,
        session: &AuthSession,
        project_id: &str,
        name: &str,
    ) -> ApiResult<Instance>;
}

#[async_trait]
pub trait CollectionsApi: Send + Sync {
    async fn list_collections(
        &self,
        session: &AuthSession,
        project_id: &str,
    ) -> ApiResult<Vec<Collection>>;

    async fn list_documents(
        &self,
        session: &AuthSession,
        project_id: &str,
        collection: &str,
        limit: u32,
    ) -> ApiResult<Vec<Document>>;

    async fn get_document(
        &self,
        session: &AuthSession,
        project_id: &str,
        collection: &str,
        document_id: &str,
    ) -> ApiResult<Document>;
}
