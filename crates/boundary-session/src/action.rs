//! The cancel-session action: validate, authenticate, read, cancel.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::client::{BoundaryClient, SessionBroker};
use crate::config::ActionConfig;
use crate::error::{ActionError, ErrorKind};
use crate::params::{InvocationParameters, SessionTarget};

/// Pause between consecutive API calls.
pub const DEFAULT_STEP_DELAY: Duration = Duration::from_millis(100);

/// Placeholder for identifiers missing from a halt request.
const UNKNOWN: &str = "unknown";

/// Reason recorded when a halt request carries none.
const DEFAULT_HALT_REASON: &str = "halted by framework";

/// Stage of a single invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    Validating,
    Authenticating,
    ReadingSession,
    Cancelling,
    Done,
    Failed { kind: ErrorKind, message: String },
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validating => write!(f, "validating"),
            Self::Authenticating => write!(f, "authenticating"),
            Self::ReadingSession => write!(f, "reading_session"),
            Self::Cancelling => write!(f, "cancelling"),
            Self::Done => write!(f, "done"),
            Self::Failed { kind, .. } => write!(f, "failed ({kind})"),
        }
    }
}

/// Everything the framework hands over for one invocation.
#[derive(Debug, Clone, Default)]
pub struct Invocation {
    pub parameters: InvocationParameters,
    /// Explicit API address; takes precedence over the environment setting.
    pub base_url: Option<String>,
    /// Secrets and environment settings visible to this invocation.
    pub environment: HashMap<String, String>,
}

impl Invocation {
    /// Invocation reading secrets and settings from the process environment.
    #[must_use]
    pub fn from_env(parameters: InvocationParameters, base_url: Option<String>) -> Self {
        Self {
            parameters,
            base_url,
            environment: std::env::vars().collect(),
        }
    }
}

/// Result of a successful cancellation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelResult {
    pub session_id: String,
    pub auth_method_id: String,
    pub session_cancelled: bool,
    pub cancelled_at: DateTime<Utc>,
}

/// Acknowledgment returned by [`CancelSessionAction::halt`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HaltResult {
    pub session_id: String,
    pub auth_method_id: String,
    pub reason: String,
    pub halted_at: DateTime<Utc>,
    pub cleanup_completed: bool,
}

/// Context the framework attaches when reporting a failed invocation.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    pub parameters: InvocationParameters,
    /// Attempt number as counted by the framework, if it tracks one.
    pub attempt: Option<u32>,
}

/// Cancels one Boundary session per invocation.
pub struct CancelSessionAction<B = BoundaryClient> {
    broker: B,
    step_delay: Duration,
}

impl CancelSessionAction<BoundaryClient> {
    /// Action backed by a default [`BoundaryClient`].
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn new() -> Result<Self, ActionError> {
        Ok(Self::with_broker(BoundaryClient::new()?))
    }
}

impl<B: SessionBroker> CancelSessionAction<B> {
    /// Action backed by any [`SessionBroker`].
    pub fn with_broker(broker: B) -> Self {
        Self {
            broker,
            step_delay: DEFAULT_STEP_DELAY,
        }
    }

    /// Override the pause between API calls. Zero disables it.
    #[must_use]
    pub fn with_step_delay(mut self, step_delay: Duration) -> Self {
        self.step_delay = step_delay;
        self
    }

    /// Run the full workflow once.
    ///
    /// # Errors
    /// Returns the classified error of the first step that fails. No step
    /// is retried here.
    pub async fn invoke(&self, invocation: &Invocation) -> Result<CancelResult, ActionError> {
        let mut stage = Stage::Validating;
        match self.run(invocation, &mut stage).await {
            Ok(result) => {
                info!(
                    session_id = %result.session_id,
                    cancelled_at = %result.cancelled_at,
                    "Session cancelled"
                );
                Ok(result)
            }
            Err(err) => {
                let failed_in = stage.to_string();
                stage = Stage::Failed {
                    kind: err.kind(),
                    message: err.message().to_string(),
                };
                error!(
                    stage = %failed_in,
                    outcome = %stage,
                    session_id = invocation.parameters.session_id_str().unwrap_or(UNKNOWN),
                    error = %err,
                    "Session cancel failed"
                );
                Err(err)
            }
        }
    }

    async fn run(
        &self,
        invocation: &Invocation,
        stage: &mut Stage,
    ) -> Result<CancelResult, ActionError> {
        let SessionTarget {
            session_id,
            auth_method_id,
        } = invocation.parameters.validate()?;
        let config =
            ActionConfig::from_map(invocation.base_url.as_deref(), &invocation.environment)?;

        info!(
            session_id = %session_id,
            auth_method_id = %auth_method_id,
            base_url = %config.base_url,
            "Cancelling Boundary session"
        );

        *stage = Stage::Authenticating;
        let token = self
            .broker
            .authenticate(&config.base_url, &auth_method_id, &config.credentials)
            .await?;
        debug!("Authenticated");

        self.pause().await;

        *stage = Stage::ReadingSession;
        let version = self
            .broker
            .get_session(&config.base_url, &session_id, &token)
            .await?;
        debug!(version, "Read session version");

        self.pause().await;

        *stage = Stage::Cancelling;
        let cancelled = self
            .broker
            .cancel_session(&config.base_url, &session_id, version, &token)
            .await?;

        *stage = Stage::Done;
        Ok(CancelResult {
            session_id,
            auth_method_id,
            session_cancelled: cancelled,
            cancelled_at: Utc::now(),
        })
    }

    async fn pause(&self) {
        if !self.step_delay.is_zero() {
            tokio::time::sleep(self.step_delay).await;
        }
    }

    /// Error hook: hand the error back unchanged so the framework decides
    /// whether to retry.
    ///
    /// # Errors
    /// Always returns `error`.
    #[allow(clippy::unused_self)]
    pub fn on_error(
        &self,
        error: ActionError,
        context: &ErrorContext,
    ) -> Result<CancelResult, ActionError> {
        warn!(
            session_id = context.parameters.session_id_str().unwrap_or(UNKNOWN),
            attempt = ?context.attempt,
            retryable = error.is_retryable(),
            error = %error,
            "Re-raising session cancel error"
        );
        Err(error)
    }

    /// Halt hook: acknowledge without touching the remote API.
    #[allow(clippy::unused_self)]
    #[must_use]
    pub fn halt(&self, parameters: &InvocationParameters, reason: Option<&str>) -> HaltResult {
        halt(parameters, reason)
    }
}

/// Best-effort halt acknowledgment. Never fails and makes no remote calls.
#[must_use]
pub fn halt(parameters: &InvocationParameters, reason: Option<&str>) -> HaltResult {
    let result = HaltResult {
        session_id: parameters.session_id_str().unwrap_or(UNKNOWN).to_string(),
        auth_method_id: parameters
            .auth_method_id_str()
            .unwrap_or(UNKNOWN)
            .to_string(),
        reason: reason
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .unwrap_or(DEFAULT_HALT_REASON)
            .to_string(),
        halted_at: Utc::now(),
        cleanup_completed: true,
    };
    info!(
        session_id = %result.session_id,
        reason = %result.reason,
        "Session cancel halted"
    );
    result
}
