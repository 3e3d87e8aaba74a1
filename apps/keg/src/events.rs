//! Event handling and progress display

use crate::logging::log_event_with_tracing;
use console::{Style, Term};
use keg_events::{
    AppEvent, DownloadEvent, EventMessage, GeneralEvent, InstallEvent, PlatformEvent,
};

/// Renders domain events on stderr while an operation runs
pub struct EventHandler {
    term: Term,
    colors_enabled: bool,
    debug_enabled: bool,
    /// Last progress percentage printed per download
    last_progress: Option<(String, u64)>,
}

impl EventHandler {
    pub fn new(colors_enabled: bool, debug_enabled: bool) -> Self {
        Self {
            term: Term::stderr(),
            colors_enabled,
            debug_enabled,
            last_progress: None,
        }
    }

    /// Handle incoming event
    pub fn handle_event(&mut self, message: EventMessage) {
        if self.debug_enabled {
            log_event_with_tracing(&message);
        }

        match message.event {
            AppEvent::General(event) => self.handle_general(event),
            AppEvent::Download(event) => self.handle_download(event),
            AppEvent::Install(event) => self.handle_install(event),
            AppEvent::Platform(event) => self.handle_platform(event),
        }
    }

    fn handle_general(&self, event: GeneralEvent) {
        match event {
            GeneralEvent::Warning { message, context } => {
                let text = match context {
                    Some(context) => format!("{message} ({context})"),
                    None => message,
                };
                self.show_warning(&text);
            }
            GeneralEvent::Error { message, details } => {
                let text = match details {
                    Some(details) => format!("{message}: {details}"),
                    None => message,
                };
                self.show_error(&text);
            }
            GeneralEvent::DebugLog { message, .. } => {
                if self.debug_enabled {
                    self.show_line(&self.paint(Style::new().dim(), &message));
                }
            }
            GeneralEvent::OperationFailed { operation, error } => {
                self.show_error(&format!("{operation} failed: {error}"));
            }
            GeneralEvent::OperationStarted { .. } | GeneralEvent::OperationCompleted { .. } => {}
        }
    }

    fn handle_download(&mut self, event: DownloadEvent) {
        match event {
            DownloadEvent::Started {
                url, total_size, ..
            } => {
                let size = total_size.map_or_else(String::new, |s| format!(" ({s} bytes)"));
                self.show_status(&format!("Downloading {}{size}", file_name(&url)));
                self.last_progress = Some((url, 0));
            }
            DownloadEvent::Progress {
                url,
                bytes_downloaded,
                total_bytes,
            } => {
                if total_bytes == 0 {
                    return;
                }
                let percent = bytes_downloaded.saturating_mul(100) / total_bytes;
                let step = percent / 25 * 25;
                let previous = match &self.last_progress {
                    Some((last_url, last)) if *last_url == url => *last,
                    _ => 0,
                };
                if step > previous && step < 100 {
                    self.show_line(&format!("  {step}%"));
                    self.last_progress = Some((url, step));
                }
            }
            DownloadEvent::Completed {
                url, final_size, ..
            } => {
                self.last_progress = None;
                self.show_status(&format!(
                    "Downloaded {} ({final_size} bytes)",
                    file_name(&url)
                ));
            }
            DownloadEvent::Failed { url, failure, .. } => {
                self.last_progress = None;
                self.show_error(&format!(
                    "Download of {} failed: {}",
                    file_name(&url),
                    failure.message
                ));
            }
            DownloadEvent::Retrying {
                url,
                attempt,
                max_attempts,
                reason,
            } => {
                self.show_warning(&format!(
                    "Retrying {} ({attempt}/{max_attempts}): {reason}",
                    file_name(&url)
                ));
            }
        }
    }

    fn handle_install(&self, event: InstallEvent) {
        match event {
            InstallEvent::Started {
                package,
                version,
                platform,
            } => {
                self.show_status(&format!("Installing {package} {version} ({platform})"));
            }
            InstallEvent::ArtifactStaged { artifact, path, .. } => {
                if self.debug_enabled {
                    self.show_line(&format!("  using {artifact} from {}", path.display()));
                }
            }
            InstallEvent::Verified { sha256, .. } => {
                self.show_line(&format!("  checksum ok {sha256}"));
            }
            InstallEvent::Completed {
                package,
                version,
                path,
                replaced,
                ..
            } => {
                let replaced = replaced.map_or_else(String::new, |v| format!(", replaced {v}"));
                self.show_status(&format!(
                    "Installed {package} {version} to {}{replaced}",
                    path.display()
                ));
            }
            InstallEvent::Skipped {
                package,
                version,
                reason,
            } => {
                self.show_status(&format!("Skipped {package} {version}: {reason}"));
            }
            InstallEvent::Failed {
                package,
                version,
                failure,
            } => {
                self.show_error(&format!(
                    "Installing {package} {version} failed: {}",
                    failure.message
                ));
            }
            InstallEvent::Removed {
                package,
                version,
                path,
            } => {
                self.show_status(&format!(
                    "Removed {package} {version} from {}",
                    path.display()
                ));
            }
        }
    }

    fn handle_platform(&self, event: PlatformEvent) {
        match event {
            PlatformEvent::Selected { os, tag } => {
                if self.debug_enabled {
                    self.show_line(&format!("  platform {tag} selected for {os}"));
                }
            }
            PlatformEvent::Unsupported { os } => {
                self.show_error(&format!("No artifacts are published for {os}"));
            }
        }
    }

    fn show_status(&self, message: &str) {
        let arrow = self.paint(Style::new().cyan().bold(), "==>");
        self.show_line(&format!("{arrow} {message}"));
    }

    fn show_warning(&self, message: &str) {
        let label = self.paint(Style::new().yellow().bold(), "warning:");
        self.show_line(&format!("{label} {message}"));
    }

    fn show_error(&self, message: &str) {
        let label = self.paint(Style::new().red().bold(), "error:");
        self.show_line(&format!("{label} {message}"));
    }

    fn show_line(&self, line: &str) {
        let _ = self.term.write_line(line);
    }

    fn paint(&self, style: Style, text: &str) -> String {
        if self.colors_enabled {
            style.force_styling(true).apply_to(text).to_string()
        } else {
            text.to_string()
        }
    }
}

/// Last path segment of a URL
fn file_name(url: &str) -> &str {
    url.rsplit('/').next().filter(|s| !s.is_empty()).unwrap_or(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use keg_types::{PlatformTag, Version};

    #[test]
    fn test_file_name() {
        assert_eq!(
            file_name("https://example.com/v0.4.0/oxidux-v0.4.0-linux"),
            "oxidux-v0.4.0-linux"
        );
        assert_eq!(file_name("https://example.com/"), "https://example.com/");
    }

    #[test]
    fn test_download_progress_tracking() {
        let mut handler = EventHandler::new(false, false);
        let url = "https://example.com/oxidux-v0.4.0-linux".to_string();

        handler.handle_event(EventMessage::from_event(AppEvent::Download(
            DownloadEvent::Started {
                url: url.clone(),
                package: Some("oxidux".to_string()),
                total_size: Some(1000),
            },
        )));
        assert_eq!(handler.last_progress, Some((url.clone(), 0)));

        handler.handle_event(EventMessage::from_event(AppEvent::Download(
            DownloadEvent::Progress {
                url: url.clone(),
                bytes_downloaded: 600,
                total_bytes: 1000,
            },
        )));
        assert_eq!(handler.last_progress, Some((url.clone(), 50)));

        handler.handle_event(EventMessage::from_event(AppEvent::Download(
            DownloadEvent::Completed {
                url,
                package: Some("oxidux".to_string()),
                final_size: 1000,
                sha256: "00".repeat(32),
            },
        )));
        assert!(handler.last_progress.is_none());
    }

    #[test]
    fn test_install_events_do_not_panic() {
        let mut handler = EventHandler::new(true, true);
        handler.handle_event(EventMessage::from_event(AppEvent::Install(
            InstallEvent::Started {
                package: "oxidux".to_string(),
                version: Version::new(0, 4, 0),
                platform: PlatformTag::Linux,
            },
        )));
        handler.handle_event(EventMessage::from_event(AppEvent::Platform(
            PlatformEvent::Unsupported {
                os: "windows".to_string(),
            },
        )));
    }
}
