//! Boundary API wire models.
//!
//! Only the fields this action reads or writes are modelled; everything
//! else in the responses is ignored.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// Authentication
// ============================================================================

/// Body of `POST /v1/auth-methods/{id}:authenticate`.
#[derive(Debug, Serialize)]
pub struct AuthenticateBody<'a> {
    pub attributes: PasswordAttributes<'a>,
}

/// Password auth method login attributes.
#[derive(Serialize)]
pub struct PasswordAttributes<'a> {
    pub login_name: &'a str,
    pub password: &'a str,
}

impl std::fmt::Debug for PasswordAttributes<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordAttributes")
            .field("login_name", &self.login_name)
            .finish_non_exhaustive()
    }
}

/// Authenticate response.
#[derive(Debug, Deserialize)]
pub struct AuthenticateResponse {
    #[serde(default)]
    pub attributes: Option<AuthTokenAttributes>,
}

/// Token attributes returned on successful authentication.
#[derive(Deserialize)]
pub struct AuthTokenAttributes {
    #[serde(default)]
    pub token: Option<String>,
}

impl std::fmt::Debug for AuthTokenAttributes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthTokenAttributes")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

// ============================================================================
// Sessions
// ============================================================================

/// Session resource from `GET /v1/sessions/{id}`.
///
/// Boundary wraps single-resource reads in an `item` envelope on newer
/// controllers; both shapes are accepted. `version` stays untyped so a
/// non-integer value reads as absent.
#[derive(Debug, Deserialize)]
pub struct SessionResponse {
    #[serde(default)]
    pub version: Option<Value>,
    #[serde(default)]
    pub item: Option<SessionItem>,
}

impl SessionResponse {
    /// Version of the session, from the top level or the `item` envelope.
    #[must_use]
    pub fn version(&self) -> Option<u64> {
        self.version
            .as_ref()
            .and_then(Value::as_u64)
            .or_else(|| {
                self.item
                    .as_ref()
                    .and_then(|item| item.version.as_ref())
                    .and_then(Value::as_u64)
            })
    }
}

/// Enveloped session resource.
#[derive(Debug, Deserialize)]
pub struct SessionItem {
    #[serde(default)]
    pub version: Option<Value>,
}

/// Body of `POST /v1/sessions/{id}:cancel`.
#[derive(Debug, Serialize)]
pub struct CancelSessionBody<'a> {
    pub id: &'a str,
    pub version: u64,
}
