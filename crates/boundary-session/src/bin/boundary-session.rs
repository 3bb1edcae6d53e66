//! Boundary session CLI - cancel a session from a shell or job runner.

use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use boundary_session::{
    halt, ActionError, BoundaryClient, CancelSessionAction, ErrorKind, Invocation,
    InvocationParameters,
};

/// Exit status telling the caller the failure is transient (`EX_TEMPFAIL`).
const EXIT_RETRYABLE: u8 = 75;

/// Boundary session CLI - Cancel Boundary sessions.
#[derive(Parser)]
#[command(name = "boundary-session")]
#[command(about = "Cancel a Boundary session using optimistic-concurrency versioning")]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, default_value = "false")]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Authenticate, read the session version, and cancel the session.
    ///
    /// Credentials come from `BOUNDARY_USERNAME` and `BOUNDARY_PASSWORD`.
    Cancel {
        /// Session ID.
        #[arg(long)]
        session_id: String,

        /// Auth method ID used to log in.
        #[arg(long)]
        auth_method_id: String,

        /// Controller URL (or set `BOUNDARY_ADDR` env var).
        #[arg(long, env = "BOUNDARY_ADDR")]
        url: Option<String>,

        /// Pause between API calls in milliseconds.
        #[arg(long, default_value = "100")]
        step_delay_ms: u64,

        /// Request timeout in seconds.
        #[arg(long, default_value = "30")]
        timeout: u64,
    },

    /// Acknowledge a halt without contacting the controller.
    Halt {
        /// Session ID.
        #[arg(long)]
        session_id: Option<String>,

        /// Auth method ID.
        #[arg(long)]
        auth_method_id: Option<String>,

        /// Why the workflow was halted.
        #[arg(long)]
        reason: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays machine-readable
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Cancel {
            session_id,
            auth_method_id,
            url,
            step_delay_ms,
            timeout,
        } => {
            let client = BoundaryClient::with_timeout(Duration::from_secs(timeout))
                .context("Failed to create Boundary client")?;
            let action = CancelSessionAction::with_broker(client)
                .with_step_delay(Duration::from_millis(step_delay_ms));
            let invocation = Invocation::from_env(
                InvocationParameters::new(session_id, auth_method_id),
                url,
            );

            match action.invoke(&invocation).await {
                Ok(result) => {
                    println!("{}", serde_json::to_string_pretty(&result)?);
                    Ok(ExitCode::SUCCESS)
                }
                Err(err) => Ok(report_failure(&err)),
            }
        }

        Commands::Halt {
            session_id,
            auth_method_id,
            reason,
        } => {
            let parameters = InvocationParameters {
                session_id: session_id.map(Value::String),
                auth_method_id: auth_method_id.map(Value::String),
            };
            let result = halt(&parameters, reason.as_deref());
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn report_failure(err: &ActionError) -> ExitCode {
    eprintln!("❌ {} error: {err}", err.kind());
    match err.kind() {
        ErrorKind::Retryable => ExitCode::from(EXIT_RETRYABLE),
        ErrorKind::Fatal => ExitCode::FAILURE,
    }
}
