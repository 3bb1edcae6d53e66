//! Invocation parameters and their validation.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ActionError;

/// Raw parameters as supplied by the invoking framework.
///
/// Values are kept loosely typed so that a non-string identifier is
/// reported as invalid instead of failing deserialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationParameters {
    /// Boundary session to cancel.
    #[serde(default)]
    pub session_id: Option<Value>,
    /// Auth method used to obtain a token.
    #[serde(default)]
    pub auth_method_id: Option<Value>,
}

impl InvocationParameters {
    /// Parameters carrying two string identifiers.
    pub fn new(session_id: impl Into<String>, auth_method_id: impl Into<String>) -> Self {
        Self {
            session_id: Some(Value::String(session_id.into())),
            auth_method_id: Some(Value::String(auth_method_id.into())),
        }
    }

    /// Check both identifiers and return the validated target.
    ///
    /// # Errors
    /// Returns a fatal error naming the first field that is absent, not a
    /// string, or blank after trimming.
    pub fn validate(&self) -> Result<SessionTarget, ActionError> {
        let session_id = required_string(self.session_id.as_ref(), "sessionId")?;
        let auth_method_id = required_string(self.auth_method_id.as_ref(), "authMethodId")?;
        Ok(SessionTarget {
            session_id,
            auth_method_id,
        })
    }

    /// Session id as a string, if one was supplied and is not blank.
    #[must_use]
    pub fn session_id_str(&self) -> Option<&str> {
        non_blank(self.session_id.as_ref())
    }

    /// Auth method id as a string, if one was supplied and is not blank.
    #[must_use]
    pub fn auth_method_id_str(&self) -> Option<&str> {
        non_blank(self.auth_method_id.as_ref())
    }
}

/// Identifiers that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTarget {
    pub session_id: String,
    pub auth_method_id: String,
}

fn non_blank(value: Option<&Value>) -> Option<&str> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn required_string(value: Option<&Value>, field: &str) -> Result<String, ActionError> {
    non_blank(value).map(str::to_string).ok_or_else(|| {
        ActionError::fatal(format!("{field} is required and must be a non-empty string"))
    })
}
