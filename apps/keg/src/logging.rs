//! Structured logging integration for events
//!
//! Converts domain events into tracing records with structured fields so the
//! debug log file carries the same information the terminal shows.

use keg_events::{AppEvent, DownloadEvent, EventMessage, GeneralEvent, InstallEvent};
use tracing::{debug, error, info, trace, warn};

/// Log an `AppEvent` using the tracing infrastructure with structured fields
pub fn log_event_with_tracing(message: &EventMessage) {
    let event = &message.event;
    let meta = &message.meta;
    let source = meta.source.as_str();

    match event {
        AppEvent::Download(DownloadEvent::Completed {
            url,
            package,
            final_size,
            sha256,
        }) => {
            info!(
                source,
                event_id = %meta.event_id,
                correlation = ?meta.correlation_id,
                url = %url,
                package = ?package,
                final_size,
                sha256 = %sha256,
                "Download completed"
            );
        }
        AppEvent::Download(DownloadEvent::Failed {
            url,
            package,
            failure,
        }) => {
            error!(
                source,
                event_id = %meta.event_id,
                correlation = ?meta.correlation_id,
                url = %url,
                package = ?package,
                retryable = failure.retryable,
                code = ?failure.code,
                message = %failure.message,
                hint = ?failure.hint,
                "Download failed"
            );
        }
        AppEvent::Install(InstallEvent::Completed {
            package,
            version,
            path,
            replaced,
            duration_ms,
        }) => {
            info!(
                source,
                event_id = %meta.event_id,
                correlation = ?meta.correlation_id,
                package = %package,
                version = %version,
                path = %path.display(),
                replaced = ?replaced,
                duration_ms,
                "Formula installed"
            );
        }
        AppEvent::Install(InstallEvent::Failed {
            package,
            version,
            failure,
        }) => {
            error!(
                source,
                event_id = %meta.event_id,
                correlation = ?meta.correlation_id,
                package = %package,
                version = %version,
                retryable = failure.retryable,
                code = ?failure.code,
                message = %failure.message,
                hint = ?failure.hint,
                "Formula installation failed"
            );
        }
        AppEvent::General(GeneralEvent::Warning { message, context }) => {
            warn!(
                source,
                event_id = %meta.event_id,
                correlation = ?meta.correlation_id,
                message = %message,
                context = ?context,
                "Warning"
            );
        }
        AppEvent::General(GeneralEvent::DebugLog { message, context }) => {
            debug!(
                source,
                event_id = %meta.event_id,
                correlation = ?meta.correlation_id,
                message = %message,
                context = ?context,
                "Debug log"
            );
        }
        _ => match meta.tracing_level() {
            tracing::Level::ERROR => {
                error!(source, event_id = %meta.event_id, correlation = ?meta.correlation_id, event = ?event, "Application event");
            }
            tracing::Level::WARN => {
                warn!(source, event_id = %meta.event_id, correlation = ?meta.correlation_id, event = ?event, "Application event");
            }
            tracing::Level::INFO => {
                info!(source, event_id = %meta.event_id, correlation = ?meta.correlation_id, event = ?event, "Application event");
            }
            tracing::Level::DEBUG => {
                debug!(source, event_id = %meta.event_id, correlation = ?meta.correlation_id, event = ?event, "Application event");
            }
            _ => {
                trace!(source, event_id = %meta.event_id, correlation = ?meta.correlation_id, event = ?event, "Application event");
            }
        },
    }
}
