//! Tracing subscriber setup.
//!
//! Diagnostics go to stdout. Audit records are ordinary `tracing` events on the
//! [`AUDIT_TARGET`] target and are routed exclusively to a rolling file.

use thiserror::Error;
use tracing::{Metadata, Subscriber};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::LoggingConfig;

/// Target carried by every audit event.
pub const AUDIT_TARGET: &str = "audit";

/// Subscriber installation errors.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The audit log file could not be opened.
    #[error("failed to open audit log: {0}")]
    AuditLog(#[from] InitError),

    /// A global subscriber is already installed.
    #[error("failed to install tracing subscriber: {0}")]
    Install(#[from] TryInitError),
}

/// Returns true if the event belongs to the audit trail.
#[must_use]
pub fn is_audit_event(metadata: &Metadata<'_>) -> bool {
    metadata.target() == AUDIT_TARGET
}

/// Maps the configured rotation name; anything unknown never rotates.
#[must_use]
pub fn rotation(name: &str) -> Rotation {
    match name {
        "hourly" => Rotation::HOURLY,
        "daily" => Rotation::DAILY,
        _ => Rotation::NEVER,
    }
}

/// Builds the subscriber: `filter` gates the diagnostics written to `stdout`,
/// while every audit event goes to `audit` and nowhere else.
pub fn subscriber<S, A>(
    filter: EnvFilter,
    stdout: S,
    audit: A,
) -> impl Subscriber + Send + Sync + 'static
where
    S: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    A: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    // The env filter only gates diagnostics; audit events are always kept.
    let stdout_layer = fmt::layer()
        .with_target(true)
        .with_writer(stdout)
        .with_filter(filter_fn(|metadata| !is_audit_event(metadata)))
        .with_filter(filter);

    let audit_layer = fmt::layer()
        .with_target(false)
        .with_ansi(false)
        .with_writer(audit)
        .with_filter(filter_fn(is_audit_event));

    tracing_subscriber::registry()
        .with(stdout_layer)
        .with(audit_layer)
}

/// Installs the global subscriber.
///
/// The returned guard flushes the audit writer on drop and must be held for
/// the lifetime of the process.
///
/// # Errors
///
/// Returns an error if the audit log cannot be opened or a global subscriber
/// was already set.
pub fn init(config: &LoggingConfig) -> Result<WorkerGuard, TelemetryError> {
    let appender = RollingFileAppender::builder()
        .rotation(rotation(&config.audit_rotation))
        .filename_prefix(&config.audit_file)
        .build(&config.audit_dir)?;
    let (audit_writer, guard) = tracing_appender::non_blocking(appender);

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.filter));

    subscriber(filter, std::io::stdout, audit_writer).try_init()?;

    Ok(guard)
}
