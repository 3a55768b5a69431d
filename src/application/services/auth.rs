//! Login state and the refresh-once retry policy

use std::future::Future;
use std::sync::Arc;

use tracing::{debug, info};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{AuthSession, Credentials};
use crate::infrastructure::api::AuthApi;
use crate::infrastructure::traits::CredentialStore;

/// Position in the retry state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attempt {
    First,
    Retried,
}

/// Owns login, logout and token refresh.
pub struct AuthService {
    auth: Arc<dyn AuthApi>,
    credentials: Arc<dyn CredentialStore>,
}

impl AuthService {
    pub fn new(auth: Arc<dyn AuthApi>, credentials: Arc<dyn CredentialStore>) -> Self {
        Self { auth, credentials }
    }

    /// Log in and persist the resulting tokens.
    pub async fn login(
        &self,
        server_url: &str,
        email: &str,
        password: &str,
    ) -> ApplicationResult<Credentials> {
        debug!("login: server={} email={}", server_url, email);
        let tokens = self.auth.login(server_url, email, password).await?;
        let credentials = Credentials {
            server_url: server_url.to_string(),
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            email: Some(email.to_string()),
        };
        self.save(&credentials)?;
        info!("logged in as {}", email);
        Ok(credentials)
    }

    /// Drop stored credentials. Returns whether anything was stored.
    pub fn logout(&self) -> ApplicationResult<bool> {
        // a corrupt file still counts as something to clear
        let had_credentials = self.current().map_or(true, |c| c.is_some());
        self.credentials
            .clear()
            .with_path_context("clear credentials", &self.credentials.location())?;
        Ok(had_credentials)
    }

    /// Stored credentials, if any.
    pub fn current(&self) -> ApplicationResult<Option<Credentials>> {
        self.credentials
            .load()
            .with_path_context("load credentials", &self.credentials.location())
    }

    /// Current session, or `NotLoggedIn`.
    pub fn session(&self) -> ApplicationResult<AuthSession> {
        Ok(self.require_credentials()?.session())
    }

    /// Run `work`; on an expired session refresh the token once and replay.
    ///
    /// A second failure of any kind, including another expiry, is returned
    /// unchanged. Non-auth failures on the first attempt are never retried.
    pub async fn with_token_refresh<T, F, Fut>(&self, mut work: F) -> ApplicationResult<T>
    where
        F: FnMut(AuthSession) -> Fut,
        Fut: Future<Output = ApplicationResult<T>>,
    {
        let mut credentials = self.require_credentials()?;
        let mut attempt = Attempt::First;

        loop {
            match work(credentials.session()).await {
                Ok(value) => return Ok(value),
                Err(e) if attempt == Attempt::First && e.is_auth_expired() => {
                    info!("session expired, refreshing token");
                    credentials = self.refresh(&credentials).await?;
                    attempt = Attempt::Retried;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn refresh(&self, credentials: &Credentials) -> ApplicationResult<Credentials> {
        let tokens = self
            .auth
            .refresh(&credentials.server_url, &credentials.refresh_token)
            .await?;
        let refreshed = credentials.with_tokens(tokens);
        self.save(&refreshed)?;
        debug!("token refreshed for {}", refreshed.server_url);
        Ok(refreshed)
    }

    fn require_credentials(&self) -> ApplicationResult<Credentials> {
        self.current()?.ok_or(ApplicationError::NotLoggedIn)
    }

    fn save(&self, credentials: &Credentials) -> ApplicationResult<()> {
        self.credentials
            .save(credentials)
            .with_path_context("save credentials", &self.credentials.location())
    }
}
