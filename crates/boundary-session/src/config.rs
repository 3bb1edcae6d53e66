//! Per-invocation configuration: credentials and the target API address.

use std::collections::HashMap;
use std::fmt;

use url::Url;

use crate::error::ActionError;

/// Secret holding the Boundary login name.
pub const ENV_USERNAME: &str = "BOUNDARY_USERNAME";

/// Secret holding the Boundary password.
pub const ENV_PASSWORD: &str = "BOUNDARY_PASSWORD";

/// Setting holding the Boundary controller address.
pub const ENV_ADDR: &str = "BOUNDARY_ADDR";

/// Username/password pair for the password auth method.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Resolved configuration for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionConfig {
    /// Absolute API address without a trailing slash.
    pub base_url: String,
    pub credentials: Credentials,
}

impl ActionConfig {
    /// Resolve configuration from an explicit URL and a key lookup.
    ///
    /// The lookup is consulted for both secrets and, when no explicit URL
    /// is given, for [`ENV_ADDR`]. Blank values count as missing.
    ///
    /// # Errors
    /// Returns a fatal error if a secret is missing, the URL is missing, or
    /// the URL is not an absolute http(s) URL.
    pub fn resolve<F>(explicit_url: Option<&str>, lookup: F) -> Result<Self, ActionError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Secrets are opaque: blank-checked but passed through unchanged.
        let secret = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let username = secret(ENV_USERNAME);
        let password = secret(ENV_PASSWORD);
        let (username, password) = match (username, password) {
            (Some(username), Some(password)) => (username, password),
            (username, password) => {
                let missing: Vec<&str> = [
                    username.is_none().then_some(ENV_USERNAME),
                    password.is_none().then_some(ENV_PASSWORD),
                ]
                .into_iter()
                .flatten()
                .collect();
                return Err(ActionError::fatal(format!(
                    "missing required secrets: {}",
                    missing.join(", ")
                )));
            }
        };

        let raw_url = explicit_url
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .map(str::to_string)
            .or_else(|| {
                lookup(ENV_ADDR)
                    .map(|v| v.trim().to_string())
                    .filter(|v| !v.is_empty())
            })
            .ok_or_else(|| {
                ActionError::fatal(format!("missing URL: provide baseUrl or set {ENV_ADDR}"))
            })?;

        Ok(Self {
            base_url: normalize_base_url(&raw_url)?,
            credentials: Credentials { username, password },
        })
    }

    /// Resolve configuration from the process environment.
    ///
    /// # Errors
    /// See [`ActionConfig::resolve`].
    pub fn from_env(explicit_url: Option<&str>) -> Result<Self, ActionError> {
        Self::resolve(explicit_url, |key| std::env::var(key).ok())
    }

    /// Resolve configuration from a map of secrets and settings.
    ///
    /// # Errors
    /// See [`ActionConfig::resolve`].
    pub fn from_map<S: std::hash::BuildHasher>(
        explicit_url: Option<&str>,
        values: &HashMap<String, String, S>,
    ) -> Result<Self, ActionError> {
        Self::resolve(explicit_url, |key| values.get(key).cloned())
    }
}

/// Parse and normalize an API address, dropping any trailing slash.
///
/// # Errors
/// Returns a fatal error for relative, malformed, or non-http(s) URLs.
pub fn normalize_base_url(raw: &str) -> Result<String, ActionError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| ActionError::fatal(format!("invalid URL '{raw}': {e}")))?;

    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(ActionError::fatal(format!(
            "invalid URL '{raw}': expected an absolute http(s) URL"
        )));
    }

    Ok(url.as_str().trim_end_matches('/').to_string())
}
