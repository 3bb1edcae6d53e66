//! Boundary API client for the three calls of the cancel workflow.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use tracing::{debug, instrument, warn};
use url::Url;

use crate::config::Credentials;
use crate::error::ActionError;
use crate::models::{
    AuthenticateBody, AuthenticateResponse, CancelSessionBody, PasswordAttributes,
    SessionResponse,
};

/// Identifying client header value sent on every request.
pub const USER_AGENT: &str = concat!("boundary-session/", env!("CARGO_PKG_VERSION"));

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Bearer token returned by an auth method.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(<redacted>)")
    }
}

/// The remote calls the cancel workflow depends on.
///
/// Every method classifies failures itself and is attempted exactly once.
#[async_trait]
pub trait SessionBroker: Send + Sync {
    /// Exchange a username/password for a bearer token.
    async fn authenticate(
        &self,
        base_url: &str,
        auth_method_id: &str,
        credentials: &Credentials,
    ) -> Result<AuthToken, ActionError>;

    /// Read the current version of a session.
    async fn get_session(
        &self,
        base_url: &str,
        session_id: &str,
        token: &AuthToken,
    ) -> Result<u64, ActionError>;

    /// Cancel a session at the given version.
    async fn cancel_session(
        &self,
        base_url: &str,
        session_id: &str,
        version: u64,
        token: &AuthToken,
    ) -> Result<bool, ActionError>;
}

/// reqwest-backed [`SessionBroker`] for a Boundary controller.
#[derive(Debug, Clone)]
pub struct BoundaryClient {
    client: Client,
}

impl BoundaryClient {
    /// Create a client with the default request timeout.
    ///
    /// # Errors
    /// Returns error if HTTP client cannot be created.
    pub fn new() -> Result<Self, ActionError> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a client with a custom request timeout.
    ///
    /// # Errors
    /// Returns error if HTTP client cannot be created.
    pub fn with_timeout(timeout: Duration) -> Result<Self, ActionError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }

    /// Join path segments onto the base URL, escaping each segment.
    fn endpoint(base_url: &str, segments: &[&str]) -> Result<Url, ActionError> {
        let mut url = Url::parse(base_url)
            .map_err(|e| ActionError::fatal(format!("invalid URL '{base_url}': {e}")))?;
        url.path_segments_mut()
            .map_err(|()| ActionError::fatal(format!("invalid URL '{base_url}': cannot be a base")))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Read the body of a successful response and decode it.
    async fn decode<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, ActionError> {
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            warn!(error = %e, "Failed to parse response");
            ActionError::from(e)
        })
    }
}

/// Fatal error for a status the call site has no specific mapping for.
async fn unexpected_status(response: Response) -> ActionError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    ActionError::fatal(format!("request failed with status {status}: {body}"))
}

/// Mapping shared by all three calls once the call-specific statuses are handled.
async fn common_failure(response: Response) -> ActionError {
    let status = response.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
        ActionError::retryable("rate limit exceeded")
    } else if status.is_server_error() {
        ActionError::retryable(format!("server error: {}", status.as_u16()))
    } else {
        unexpected_status(response).await
    }
}

#[async_trait]
impl SessionBroker for BoundaryClient {
    #[instrument(skip_all, fields(auth_method_id = %auth_method_id))]
    async fn authenticate(
        &self,
        base_url: &str,
        auth_method_id: &str,
        credentials: &Credentials,
    ) -> Result<AuthToken, ActionError> {
        let url = Self::endpoint(
            base_url,
            &["v1", "auth-methods", &format!("{auth_method_id}:authenticate")],
        )?;
        debug!(url = %url, "POST authenticate");

        let body = AuthenticateBody {
            attributes: PasswordAttributes {
                login_name: &credentials.username,
                password: &credentials.password,
            },
        };

        let response = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    ActionError::fatal("invalid username or password")
                }
                _ => common_failure(response).await,
            });
        }

        let parsed: AuthenticateResponse = Self::decode(response).await?;
        parsed
            .attributes
            .and_then(|a| a.token)
            .filter(|t| !t.is_empty())
            .map(AuthToken)
            .ok_or_else(|| ActionError::fatal("no token returned"))
    }

    #[instrument(skip_all, fields(session_id = %session_id))]
    async fn get_session(
        &self,
        base_url: &str,
        session_id: &str,
        token: &AuthToken,
    ) -> Result<u64, ActionError> {
        let url = Self::endpoint(base_url, &["v1", "sessions", session_id])?;
        debug!(url = %url, "GET session");

        let response = self
            .client
            .get(url)
            .header("Authorization", format!("Bearer {}", token.as_str()))
            .header("Content-Type", "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(match status {
                StatusCode::UNAUTHORIZED => ActionError::fatal("invalid or expired token"),
                StatusCode::NOT_FOUND => {
                    ActionError::fatal(format!("session not found: {session_id}"))
                }
                _ => common_failure(response).await,
            });
        }

        let parsed: SessionResponse = Self::decode(response).await?;
        parsed
            .version()
            .ok_or_else(|| ActionError::fatal("no version returned"))
    }

    #[instrument(skip_all, fields(session_id = %session_id, version = version))]
    async fn cancel_session(
        &self,
        base_url: &str,
        session_id: &str,
        version: u64,
        token: &AuthToken,
    ) -> Result<bool, ActionError> {
        let url = Self::endpoint(
            base_url,
            &["v1", "sessions", &format!("{session_id}:cancel")],
        )?;
        debug!(url = %url, version, "POST cancel");

        let response = self
            .client
            .post(url)
            .header("Authorization", format!("Bearer {}", token.as_str()))
            .header("Content-Type", "application/json")
            .json(&CancelSessionBody {
                id: session_id,
                version,
            })
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(true);
        }

        Err(match status {
            StatusCode::UNAUTHORIZED => ActionError::fatal("invalid or expired token"),
            StatusCode::NOT_FOUND => ActionError::fatal(format!("session not found: {session_id}")),
            StatusCode::CONFLICT => ActionError::fatal(
                "conflict: session may already be cancelled or version mismatch",
            ),
            _ => common_failure(response).await,
        })
    }
}
