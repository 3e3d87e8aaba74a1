use keg_events::{EventEmitter, EventSender};
use std::path::PathBuf;

/// Installation context
#[derive(Clone, Debug)]
pub struct InstallContext {
    /// Directory holding the versioned artifact; when set, nothing is downloaded
    pub staging_dir: Option<PathBuf>,
    /// Reinstall even if the same version is already installed
    pub force: bool,
    /// Download the artifact into the cache when it is not already there
    pub allow_download: bool,

    /// Event sender for progress reporting
    pub event_sender: Option<EventSender>,
}

context_builder! {
    InstallContext {
        staging_dir: Option<PathBuf>,
        force: bool,
        allow_download: bool,
    }
}

/// Uninstall context
#[derive(Clone, Debug)]
pub struct UninstallContext {
    /// Event sender for progress reporting
    pub event_sender: Option<EventSender>,
}

context_builder! {
    UninstallContext {}
}

impl EventEmitter for InstallContext {
    fn event_sender(&self) -> Option<&EventSender> {
        self.event_sender.as_ref()
    }
}

impl EventEmitter for UninstallContext {
    fn event_sender(&self) -> Option<&EventSender> {
        self.event_sender.as_ref()
    }
}
