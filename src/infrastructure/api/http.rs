//! reqwest-backed admin API client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::{
    ApiError, ApiResult, AuthApi, CollectionsApi, CreateProject, InstancesApi, ProjectsApi,
};
use crate::domain::{AuthSession, Collection, Document, Instance, Project, TokenPair};

const API_VERSION: &str = "v1";

/// HTTP client for the admin API.
///
/// Stateless with respect to the server: every call takes the server URL
/// from the session (or explicitly, for auth calls).
#[derive(Debug, Clone)]
pub struct HttpAdminClient {
    client: Client,
}

impl HttpAdminClient {
    pub fn new(timeout: Duration) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("skyctl/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::transport(format!("build http client: {e}")))?;
        Ok(Self { client })
    }

    fn endpoint(&self, server_url: &str, segments: &[&str]) -> ApiResult<Url> {
        let invalid = |message: String| ApiError::InvalidUrl {
            url: server_url.to_string(),
            message,
        };
        let mut url = Url::parse(server_url).map_err(|e| invalid(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| invalid("cannot be used as a base url".to_string()))?
            .pop_if_empty()
            .push(API_VERSION)
            .extend(segments.iter().copied());
        Ok(url)
    }

    fn authorized(&self, request: RequestBuilder, session: &AuthSession) -> RequestBuilder {
        request.bearer_auth(&session.access_token)
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        resource: &str,
    ) -> ApiResult<T> {
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::transport(e.to_string()))?;
        let status = response.status();
        debug!("{} -> {}", resource, status);

        if status.is_success() {
            return response.json::<T>().await.map_err(|e| ApiError::Decode {
                message: e.to_string(),
            });
        }
        let body = response.text().await.unwrap_or_default();
        Err(classify_failure(status.as_u16(), &body, resource))
    }

    async fn get<T: DeserializeOwned>(
        &self,
        session: &AuthSession,
        segments: &[&str],
        resource: &str,
    ) -> ApiResult<T> {
        let url = self.endpoint(&session.server_url, segments)?;
        debug!("GET {}", url);
        let request = self.authorized(self.client.get(url), session);
        self.execute(request, resource).await
    }

    async fn post_action<T: DeserializeOwned>(
        &self,
        session: &AuthSession,
        segments: &[&str],
        resource: &str,
    ) -> ApiResult<T> {
        let url = self.endpoint(&session.server_url, segments)?;
        debug!("POST {}", url);
        let request = self.authorized(self.client.post(url), session);
        self.execute(request, resource).await
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

/// Map a non-success HTTP status to an [`ApiError`].
///
/// 401 becomes `AuthExpired` and 404 becomes `NotFound` naming `resource`;
/// everything else carries the server's message.
pub fn classify_failure(status: u16, body: &str, resource: &str) -> ApiError {
    match status {
        401 => ApiError::AuthExpired,
        404 => ApiError::not_found(resource),
        _ => ApiError::remote(status, error_message(status, body)),
    }
}

fn error_message(status: u16, body: &str) -> String {
    let parsed = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message.or(b.error));
    if let Some(message) = parsed {
        return message;
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        reqwest::StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("request failed")
            .to_string()
    } else {
        trimmed.to_string()
    }
}

#[async_trait]
impl AuthApi for HttpAdminClient {
    async fn login(&self, server_url: &str, email: &str, password: &str) -> ApiResult<TokenPair> {
        let url = self.endpoint(server_url, &["auth", "login"])?;
        debug!("POST {}", url);
        let request = self
            .client
            .post(url)
            .json(&json!({ "email": email, "password": password }));
        self.execute(request, "login").await
    }

    async fn refresh(&self, server_url: &str, refresh_token: &str) -> ApiResult<TokenPair> {
        let url = self.endpoint(server_url, &["auth", "refresh"])?;
        debug!("POST {}", url);
        let request = self
            .client
            .post(url)
            .json(&json!({ "refreshToken": refresh_token }));
        self.execute(request, "token refresh").await
    }
}

#[async_trait]
impl ProjectsApi for HttpAdminClient {
    async fn list_projects(&self, session: &AuthSession) -> ApiResult<Vec<Project>> {
        self.get(session, &["projects"], "projects").await
    }

    async fn get_project(&self, session: &AuthSession, id_or_name: &str) -> ApiResult<Project> {
        let resource = format!("project '{id_or_name}'");
        self.get(session, &["projects", id_or_name], &resource).await
    }

    async fn create_project(
        &self,
        session: &AuthSession,
        request: &CreateProject,
    ) -> ApiResult<Project> {
        let url = self.endpoint(&session.server_url, &["projects"])?;
        debug!("POST {}", url);
        let builder = self.authorized(self.client.post(url), session).json(request);
        self.execute(builder, "projects").await
    }
}

#[async_trait]
impl InstancesApi for HttpAdminClient {
    async fn list_instances(
        &self,
        session: &AuthSession,
        project_id: &str,
    ) -> ApiResult<Vec<Instance>> {
        self.get(session, &["projects", project_id, "instances"], "instances")
            .await
    }

    async fn get_instance(
        &self,
        session: &AuthSession,
        project_id: &str,
        name: &str,
    ) -> ApiResult<Instance> {
        let resource = format!("instance '{name}'");
        self.get(session, &["projects", project_id, "instances", name], &resource)
            .await
    }

    async fn start_instance(
        &self,
        session: &AuthSession,
        project_id: &str,
        name: &str,
    ) -> ApiResult<Instance> {
        let action = format!("{name}:start");
        let resource = format!("instance '{name}'");
        self.post_action(
            session,
            &["projects", project_id, "instances", &action],
            &resource,
        )
        .await
    }

    async fn stop_instance(
        &self,
        session: &AuthSession,
        project_id: &str,
        name: &str,
    ) -> ApiResult<Instance> {
        let action = format!("{name}:stop");
        let resource = format!("instance '{name}'");
        self.post_action(
            session,
            &["projects", project_id, "instances", &action],
            &resource,
        )
        .await
    }
}

#[async_trait]
impl CollectionsApi for HttpAdminClient {
    async fn list_collections(
        &self,
        session: &AuthSession,
        project_id: &str,
    ) -> ApiResult<Vec<Collection>> {
        self.get(session, &["projects", project_id, "collections"], "collections")
            .await
    }

    async fn list_documents(
        &self,
        session: &AuthSession,
        project_id: &str,
        collection: &str,
        limit: u32,
    ) -> ApiResult<Vec<Document>> {
        let url = self.endpoint(
            &session.server_url,
            &["projects", project_id, "collections", collection, "documents"],
        )?;
        debug!("GET {} (limit {})", url, limit);
        let request = self
            .authorized(self.client.get(url), session)
            .query(&[("limit", limit)]);
        let resource = format!("collection '{collection}'");
        self.execute(request, &resource).await
    }

    async fn get_document(
        &self,
        session: &AuthSession,
        project_id: &str,
        collection: &str,
        document_id: &str,
    ) -> ApiResult<Document> {
        let resource = format!("document '{collection}/{document_id}'");
        self.get(
            session,
            &[
                "projects",
                project_id,
                "collections",
                collection,
                "documents",
                document_id,
            ],
            &resource,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn client() -> HttpAdminClient {
        HttpAdminClient::new(Duration::from_secs(5)).expect("build client")
    }

    #[test]
    fn given_401_when_classifying_then_auth_expired() {
        assert!(classify_failure(401, "", "projects").is_auth_expired());
    }

    #[test]
    fn given_404_when_classifying_then_not_found_names_resource() {
        let err = classify_failure(404, r#"{"message":"nope"}"#, "project 'acme'");
        match err {
            ApiError::NotFound { resource } => assert_eq!(resource, "project 'acme'"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[rstest]
    #[case(r#"{"message":"quota exceeded"}"#, "quota exceeded")]
    #[case(r#"{"error":"bad request"}"#, "bad request")]
    #[case("upstream timeout\n", "upstream timeout")]
    #[case("", "Internal Server Error")]
    fn given_server_error_when_classifying_then_uses_best_message(
        #[case] body: &str,
        #[case] expected: &str,
    ) {
        match classify_failure(500, body, "projects") {
            ApiError::Remote { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, expected);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn given_server_with_trailing_slash_when_building_endpoint_then_no_double_slash() {
        let url = client()
            .endpoint("https://admin.example/", &["projects", "acme"])
            .unwrap();
        assert_eq!(url.as_str(), "https://admin.example/v1/projects/acme");
    }

    #[test]
    fn given_segment_with_slash_when_building_endpoint_then_segment_is_escaped() {
        let url = client()
            .endpoint("https://admin.example", &["projects", "a/b"])
            .unwrap();
        assert_eq!(url.as_str(), "https://admin.example/v1/projects/a%2Fb");
    }

    #[test]
    fn given_server_with_path_prefix_when_building_endpoint_then_prefix_kept() {
        let url = client()
            .endpoint("https://example.com/admin", &["auth", "login"])
            .unwrap();
        assert_eq!(url.as_str(), "https://example.com/admin/v1/auth/login");
    }

    #[test]
    fn given_garbage_server_url_when_building_endpoint_then_invalid_url() {
        let err = client().endpoint("not a url", &["projects"]).unwrap_err();
        assert!(matches!(err, ApiError::InvalidUrl { .. }));
    }
}
