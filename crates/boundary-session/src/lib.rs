//! Cancel a HashiCorp Boundary session.
//!
//! One invocation runs a short, strictly sequential protocol against a
//! Boundary controller:
//!
//! ```text
//! ┌────────────┐   ┌────────────────┐   ┌────────────────┐   ┌────────────┐
//! │ Validating │──►│ Authenticating │──►│ ReadingSession │──►│ Cancelling │──► Done
//! └────────────┘   └────────────────┘   └────────────────┘   └────────────┘
//!        │                 │                    │                   │
//!        └─────────────────┴──────── Failed(kind, message) ◄────────┘
//! ```
//!
//! The session version read in the third step is sent with the cancel
//! request; the controller rejects a stale version with `409 Conflict`.
//!
//! Every failure is an [`ActionError`], either `Retryable` (rate limiting,
//! 5xx) or `Fatal`. Nothing is retried in-process: the caller decides.
//!
//! ## Configuration
//!
//! - `BOUNDARY_USERNAME` / `BOUNDARY_PASSWORD`: password auth method secrets
//! - `BOUNDARY_ADDR`: controller address, unless an explicit URL is given
//!
//! ## Example
//!
//! ```ignore
//! use boundary_session::{CancelSessionAction, Invocation, InvocationParameters};
//!
//! let action = CancelSessionAction::new()?;
//! let invocation = Invocation::from_env(
//!     InvocationParameters::new("s_1234567890", "ampw_1234567890"),
//!     None,
//! );
//!
//! match action.invoke(&invocation).await {
//!     Ok(result) => println!("cancelled at {}", result.cancelled_at),
//!     Err(err) if err.is_retryable() => { /* schedule another attempt */ }
//!     Err(err) => return Err(err.into()),
//! }
//! ```

#![allow(clippy::module_name_repetitions)]

pub mod action;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod params;

pub use action::{
    halt, CancelResult, CancelSessionAction, ErrorContext, HaltResult, Invocation, Stage,
    DEFAULT_STEP_DELAY,
};
pub use client::{AuthToken, BoundaryClient, SessionBroker, USER_AGENT};
pub use config::{ActionConfig, Credentials, ENV_ADDR, ENV_PASSWORD, ENV_USERNAME};
pub use error::{ActionError, ErrorKind};
pub use params::{InvocationParameters, SessionTarget};
