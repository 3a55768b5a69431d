//! Tests for HttpAdminClient against a scripted local HTTP server

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use skyctl::domain::{AuthSession, InstanceStatus};
use skyctl::infrastructure::api::{
    ApiError, AuthApi, CollectionsApi, HttpAdminClient, InstancesApi, ProjectsApi,
};

/// Serves canned `(status, body)` responses in order and records each request head.
struct StubServer {
    url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl StubServer {
    async fn start(responses: Vec<(u16, &'static str)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = requests.clone();
        let mut queue: VecDeque<(u16, &'static str)> = responses.into();

        tokio::spawn(async move {
            while let Some((status, body)) = queue.pop_front() {
                let Ok((mut socket, _)) = listener.accept().await else {
                    return;
                };
                let request = read_request(&mut socket).await;
                recorded.lock().unwrap().push(request);
                let response = format!(
                    "HTTP/1.1 {} Stub\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        Self { url, requests }
    }

    fn session(&self) -> AuthSession {
        AuthSession {
            server_url: self.url.clone(),
            access_token: "tok-123".to_string(),
        }
    }

    fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut data = Vec::new();
    let mut buf = [0u8; 4096];
    loop {
        let n = socket.read(&mut buf).await.unwrap_or(0);
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buf[..n]);
        let text = String::from_utf8_lossy(&data);
        if let Some(head_end) = text.find("\r\n\r\n") {
            let content_length = text[..head_end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if data.len() >= head_end + 4 + content_length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&data).into_owned()
}

fn client() -> HttpAdminClient {
    HttpAdminClient::new(Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn given_project_response_when_getting_project_then_decodes_and_sends_bearer() {
    let server = StubServer::start(vec![(
        200,
        r#"{"id":"p-1","name":"acme","displayName":"Acme","createdAt":"2024-03-01T10:00:00Z"}"#,
    )])
    .await;

    let project = client().get_project(&server.session(), "acme").await.unwrap();

    assert_eq!(project.id, "p-1");
    assert_eq!(project.display_name.as_deref(), Some("Acme"));
    let request = &server.requests()[0];
    assert!(request.starts_with("GET /v1/projects/acme "), "{}", request);
    assert!(
        request.to_ascii_lowercase().contains("authorization: bearer tok-123"),
        "{}",
        request
    );
}

#[tokio::test]
async fn given_401_when_listing_projects_then_auth_expired() {
    let server = StubServer::start(vec![(401, r#"{"message":"token expired"}"#)]).await;

    let err = client().list_projects(&server.session()).await.unwrap_err();

    assert!(err.is_auth_expired());
}

#[tokio::test]
async fn given_404_when_getting_project_then_not_found() {
    let server = StubServer::start(vec![(404, "")]).await;

    let err = client()
        .get_project(&server.session(), "missing-project")
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::NotFound { ref resource } if resource.contains("missing-project")));
}

#[tokio::test]
async fn given_500_with_message_when_listing_instances_then_remote_error_carries_message() {
    let server = StubServer::start(vec![(500, r#"{"error":"database offline"}"#)]).await;

    let err = client()
        .list_instances(&server.session(), "p-1")
        .await
        .unwrap_err();

    match err {
        ApiError::Remote { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "database offline");
        }
        other => panic!("expected Remote, got {:?}", other),
    }
}

#[tokio::test]
async fn given_instance_when_starting_then_posts_action_and_decodes_status() {
    let server = StubServer::start(vec![(
        200,
        r#"{"name":"web-1","status":"STARTING","machineType":"e2-small","region":"eu-west1"}"#,
    )])
    .await;

    let instance = client()
        .start_instance(&server.session(), "p-1", "web-1")
        .await
        .unwrap();

    assert_eq!(instance.status, InstanceStatus::Starting);
    let request = &server.requests()[0];
    assert!(
        request.starts_with("POST /v1/projects/p-1/instances/web-1:start "),
        "{}",
        request
    );
}

#[tokio::test]
async fn given_limit_when_listing_documents_then_sends_limit_query() {
    let server = StubServer::start(vec![(200, r#"[{"id":"u1","data":{"name":"ada"}}]"#)]).await;

    let documents = client()
        .list_documents(&server.session(), "p-1", "users", 5)
        .await
        .unwrap();

    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0].data["name"], "ada");
    let request = &server.requests()[0];
    assert!(
        request.starts_with("GET /v1/projects/p-1/collections/users/documents?limit=5 "),
        "{}",
        request
    );
}

#[tokio::test]
async fn given_refresh_token_when_refreshing_then_posts_json_body() {
    let server = StubServer::start(vec![(
        200,
        r#"{"accessToken":"new-access","refreshToken":"new-refresh"}"#,
    )])
    .await;

    let tokens = client().refresh(&server.url, "old-refresh").await.unwrap();

    assert_eq!(tokens.access_token, "new-access");
    let request = &server.requests()[0];
    assert!(request.starts_with("POST /v1/auth/refresh "), "{}", request);
    assert!(request.contains(r#""refreshToken":"old-refresh""#), "{}", request);
}

#[tokio::test]
async fn given_malformed_body_when_success_status_then_decode_error() {
    let server = StubServer::start(vec![(200, "not json")]).await;

    let err = client()
        .list_collections(&server.session(), "p-1")
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Decode { .. }));
}

#[tokio::test]
async fn given_unreachable_server_when_listing_projects_then_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);
    let session = AuthSession {
        server_url: url,
        access_token: "tok".to_string(),
    };

    let err = client().list_projects(&session).await.unwrap_err();

    assert!(matches!(err, ApiError::Transport { .. }));
}
