//! Operations context for dependency injection

use keg_config::Config;
use keg_errors::{Error, OpsError};
use keg_events::{EventEmitter, EventSender};
use keg_formula::FormulaDirectory;
use keg_install::{InstallConfig, Installer};
use keg_net::NetClient;
use keg_platform::{Platform, PlatformContext};
use keg_state::StateManager;
use keg_types::{HostOs, PlatformTag};
use std::sync::Arc;

/// Operations context providing access to all system components
pub struct OpsCtx {
    /// Receipt database
    pub state: StateManager,
    /// Network client
    pub net: NetClient,
    /// Binary installer
    pub installer: Installer,
    /// Platform operations
    pub platform: Arc<Platform>,
    /// Host the operations target
    pub host: HostOs,
    /// Event sender for progress reporting
    pub tx: EventSender,
    /// System configuration
    pub config: Config,
}

impl OpsCtx {
    /// Platform context wired to this context's event channel
    #[must_use]
    pub fn platform_context(&self) -> PlatformContext {
        self.platform.create_context(Some(self.tx.clone()))
    }

    /// Select the artifact platform for the configured host
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::UnsupportedPlatform` for hosts without artifacts.
    pub fn select_platform(&self) -> Result<PlatformTag, Error> {
        Ok(self.platform.select(&self.platform_context(), &self.host)?)
    }

    /// Load the formula directory named in the config
    ///
    /// # Errors
    ///
    /// Returns an error if the directory exists but cannot be read.
    pub async fn formulas(&self) -> Result<FormulaDirectory, Error> {
        let directory = FormulaDirectory::load(&self.config.formula_dir()).await?;
        for skipped in directory.skipped() {
            self.emit_warning_with_context(
                format!("skipped formula {}", skipped.path.display()),
                skipped.reason.clone(),
            );
        }
        Ok(directory)
    }
}

impl EventEmitter for OpsCtx {
    fn event_sender(&self) -> Option<&EventSender> {
        Some(&self.tx)
    }
}

/// Builder for operations context
pub struct OpsContextBuilder {
    state: Option<StateManager>,
    net: Option<NetClient>,
    platform: Option<Arc<Platform>>,
    host: Option<HostOs>,
    tx: Option<EventSender>,
    config: Option<Config>,
}

impl OpsContextBuilder {
    /// Create new context builder
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: None,
            net: None,
            platform: None,
            host: None,
            tx: None,
            config: None,
        }
    }

    /// Set state manager
    #[must_use]
    pub fn with_state(mut self, state: StateManager) -> Self {
        self.state = Some(state);
        self
    }

    /// Set network client
    #[must_use]
    pub fn with_net(mut self, net: NetClient) -> Self {
        self.net = Some(net);
        self
    }

    /// Set platform operations (defaults to the host filesystem)
    #[must_use]
    pub fn with_platform(mut self, platform: Arc<Platform>) -> Self {
        self.platform = Some(platform);
        self
    }

    /// Override the detected host operating system
    #[must_use]
    pub fn with_host(mut self, host: HostOs) -> Self {
        self.host = Some(host);
        self
    }

    /// Set event sender
    #[must_use]
    pub fn with_event_sender(mut self, tx: EventSender) -> Self {
        self.tx = Some(tx);
        self
    }

    /// Set configuration
    #[must_use]
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Build the context
    ///
    /// # Errors
    ///
    /// Returns an error if any required component is missing.
    pub fn build(self) -> Result<OpsCtx, Error> {
        let state = self.state.ok_or_else(|| OpsError::MissingComponent {
            component: "state".to_string(),
        })?;

        let net = self.net.ok_or_else(|| OpsError::MissingComponent {
            component: "net".to_string(),
        })?;

        let tx = self.tx.ok_or_else(|| OpsError::MissingComponent {
            component: "event sender".to_string(),
        })?;

        let config = self.config.ok_or_else(|| OpsError::MissingComponent {
            component: "config".to_string(),
        })?;

        let platform = self
            .platform
            .unwrap_or_else(|| Arc::new(Platform::current()));

        let installer = Installer::new(
            InstallConfig::from_config(&config),
            state.clone(),
            Arc::clone(&platform),
            Some(net.clone()),
        );

        Ok(OpsCtx {
            state,
            net,
            installer,
            platform,
            host: self.host.unwrap_or_else(HostOs::current),
            tx,
            config,
        })
    }
}

impl Default for OpsContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}
