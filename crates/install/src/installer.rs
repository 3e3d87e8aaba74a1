//! Main installer implementation

use crate::staging::{copy_hashed, locate_artifact, temp_binary_path};
use crate::{InstallConfig, InstallContext, UninstallContext};
use chrono::Utc;
use keg_errors::{Error, InstallError, NetworkError, PlatformError};
use keg_events::{AppEvent, EventEmitter, FailureContext, InstallEvent};
use keg_formula::ResolvedArtifact;
use keg_hash::Checksum;
use keg_net::NetClient;
use keg_platform::{Platform, PlatformContext};
use keg_state::StateManager;
use keg_types::{InstallReport, InstalledFormula, PackageChange, VerifyEntry};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// Main installer for keg formulas
#[derive(Clone)]
pub struct Installer {
    config: InstallConfig,
    state_manager: StateManager,
    platform: Arc<Platform>,
    net: Option<NetClient>,
}

impl std::fmt::Debug for Installer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Installer")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Installer {
    /// Create new installer
    #[must_use]
    pub fn new(
        config: InstallConfig,
        state_manager: StateManager,
        platform: Arc<Platform>,
        net: Option<NetClient>,
    ) -> Self {
        Self {
            config,
            state_manager,
            platform,
            net,
        }
    }

    #[must_use]
    pub fn config(&self) -> &InstallConfig {
        &self.config
    }

    /// Final location of a formula's binary
    #[must_use]
    pub fn target_path(&self, artifact: &ResolvedArtifact) -> PathBuf {
        self.config.bin_dir.join(&artifact.binary_name)
    }

    /// Install a resolved artifact
    ///
    /// Nothing is written to the binary directory unless the artifact's
    /// checksum matches the formula.
    ///
    /// # Errors
    ///
    /// Returns `InstallError::ArtifactMissing` if the artifact cannot be found
    /// (or downloaded), `NetworkError::ChecksumMismatch` if it fails
    /// verification, and `InstallError::PermissionDenied` if the binary
    /// directory is not writable.
    pub async fn install(
        &self,
        artifact: &ResolvedArtifact,
        context: &InstallContext,
    ) -> Result<InstallReport, Error> {
        let start = Instant::now();

        context.emit(AppEvent::Install(InstallEvent::Started {
            package: artifact.name.clone(),
            version: artifact.version.clone(),
            platform: artifact.platform,
        }));

        match self.install_inner(artifact, context, start).await {
            Ok(report) => Ok(report),
            Err(e) => {
                context.emit(AppEvent::Install(InstallEvent::Failed {
                    package: artifact.name.clone(),
                    version: artifact.version.clone(),
                    failure: FailureContext::from_error(&e),
                }));
                Err(e)
            }
        }
    }

    async fn install_inner(
        &self,
        artifact: &ResolvedArtifact,
        context: &InstallContext,
        start: Instant,
    ) -> Result<InstallReport, Error> {
        let ctx = self.platform.create_context(context.event_sender.clone());
        let target = self.target_path(artifact);
        let previous = self.state_manager.get_installed(&artifact.name).await?;

        if let Some(previous) = &previous {
            if previous.version == artifact.version
                && !context.force
                && previous.binary_path == target
                && self.platform.exists(&ctx, &previous.binary_path).await
            {
                context.emit(AppEvent::Install(InstallEvent::Skipped {
                    package: artifact.name.clone(),
                    version: artifact.version.clone(),
                    reason: "already installed".to_string(),
                }));
                return Ok(InstallReport {
                    duration_ms: elapsed_ms(start),
                    ..InstallReport::default()
                });
            }
        }

        let source = self.obtain_artifact(artifact, context).await?;
        context.emit(AppEvent::Install(InstallEvent::ArtifactStaged {
            package: artifact.name.clone(),
            artifact: artifact.artifact_name.clone(),
            path: source.clone(),
        }));

        let source = match verify_checksum(&source, &artifact.sha256).await {
            Ok(()) => source,
            Err(e) if context.staging_dir.is_none() => {
                self.refresh_cache_entry(artifact, context, &source, e)
                    .await?
            }
            Err(e) => return Err(e),
        };
        context.emit(AppEvent::Install(InstallEvent::Verified {
            package: artifact.name.clone(),
            sha256: artifact.sha256.to_hex(),
        }));

        let size = self.place_binary(&ctx, &source, artifact, &target).await?;

        if let Some(previous) = &previous {
            if previous.binary_path != target
                && self.platform.exists(&ctx, &previous.binary_path).await
            {
                self.platform
                    .remove_file(&ctx, &previous.binary_path)
                    .await
                    .map_err(placement_error)?;
            }
        }

        let receipt = InstalledFormula {
            name: artifact.name.clone(),
            version: artifact.version.clone(),
            platform: artifact.platform,
            sha256: artifact.sha256.to_hex(),
            binary_path: target.clone(),
            size,
            installed_at: Utc::now(),
        };
        let superseded = self.state_manager.record_install(&receipt).await?;
        let replaced = superseded.map(|p| p.version);

        let duration_ms = elapsed_ms(start);
        context.emit(AppEvent::Install(InstallEvent::Completed {
            package: artifact.name.clone(),
            version: artifact.version.clone(),
            path: target.clone(),
            replaced: replaced.clone(),
            duration_ms,
        }));

        let change = PackageChange {
            name: artifact.name.clone(),
            from_version: replaced.clone(),
            to_version: Some(artifact.version.clone()),
            path: Some(target),
            size: Some(size),
        };
        let mut report = InstallReport {
            duration_ms,
            ..InstallReport::default()
        };
        if replaced.is_some() {
            report.updated.push(change);
        } else {
            report.installed.push(change);
        }
        Ok(report)
    }

    /// Path of the versioned artifact, downloading it into the cache if allowed
    async fn obtain_artifact(
        &self,
        artifact: &ResolvedArtifact,
        context: &InstallContext,
    ) -> Result<PathBuf, Error> {
        if let Some(dir) = &context.staging_dir {
            return locate_artifact(dir, &artifact.artifact_name).await;
        }

        let cache_dir = &self.config.cache_dir;
        match locate_artifact(cache_dir, &artifact.artifact_name).await {
            Ok(path) => Ok(path),
            Err(missing) => {
                let (Some(client), true) = (&self.net, context.allow_download) else {
                    return Err(missing);
                };
                let silent;
                let tx = if let Some(tx) = context.event_sender.as_ref() {
                    tx
                } else {
                    silent = keg_events::channel().0;
                    &silent
                };
                let dest = cache_dir.join(&artifact.artifact_name);
                keg_net::Download::from_url(artifact.url.clone())
                    .for_package(&artifact.name)
                    .execute(client, &dest, Some(&artifact.sha256), tx)
                    .await?;
                Ok(dest)
            }
        }
    }

    /// Discard a corrupt cache entry and download it again when allowed
    async fn refresh_cache_entry(
        &self,
        artifact: &ResolvedArtifact,
        context: &InstallContext,
        corrupt: &Path,
        mismatch: Error,
    ) -> Result<PathBuf, Error> {
        context.emit_warning_with_context(
            format!("discarding corrupt cache entry {}", artifact.artifact_name),
            corrupt.display().to_string(),
        );
        tokio::fs::remove_file(corrupt)
            .await
            .map_err(|e| Error::io_with_path(&e, corrupt))?;

        if self.net.is_none() || !context.allow_download {
            return Err(mismatch);
        }
        let fresh = self.obtain_artifact(artifact, context).await?;
        verify_checksum(&fresh, &artifact.sha256).await?;
        Ok(fresh)
    }

    /// Copy the verified artifact into the binary directory under its fixed name
    async fn place_binary(
        &self,
        ctx: &PlatformContext,
        source: &Path,
        artifact: &ResolvedArtifact,
        target: &Path,
    ) -> Result<u64, Error> {
        let bin_dir = &self.config.bin_dir;
        self.platform
            .create_dir_all(ctx, bin_dir)
            .await
            .map_err(placement_error)?;

        let temp = temp_binary_path(bin_dir, &artifact.binary_name);
        let result: Result<u64, Error> = async {
            let (copied, size) = copy_hashed(source, &temp).await?;
            // The source may have changed after verification.
            if copied != artifact.sha256 {
                return Err(NetworkError::ChecksumMismatch {
                    expected: artifact.sha256.to_hex(),
                    actual: copied.to_hex(),
                }
                .into());
            }
            self.platform
                .set_executable(ctx, &temp)
                .await
                .map_err(placement_error)?;
            self.platform
                .atomic_rename(ctx, &temp, target)
                .await
                .map_err(placement_error)?;
            Ok::<u64, Error>(size)
        }
        .await;

        if result.is_err() && self.platform.exists(ctx, &temp).await {
            let _ = self.platform.remove_file(ctx, &temp).await;
        }
        result
    }

    /// Remove an installed formula's binary and receipt
    ///
    /// # Errors
    ///
    /// Returns `InstallError::NotInstalled` if there is no receipt for `name`.
    pub async fn uninstall(
        &self,
        name: &str,
        context: &UninstallContext,
    ) -> Result<InstallReport, Error> {
        let start = Instant::now();
        let ctx = self.platform.create_context(context.event_sender.clone());

        let installed = self
            .state_manager
            .get_installed(name)
            .await?
            .ok_or_else(|| InstallError::NotInstalled {
                package: name.to_string(),
            })?;

        if self.platform.exists(&ctx, &installed.binary_path).await {
            self.platform
                .remove_file(&ctx, &installed.binary_path)
                .await
                .map_err(placement_error)?;
        } else {
            context.emit_warning_with_context(
                format!("{name} binary was already missing"),
                installed.binary_path.display().to_string(),
            );
        }

        self.state_manager.record_uninstall(name).await?;

        context.emit(AppEvent::Install(InstallEvent::Removed {
            package: name.to_string(),
            version: installed.version.clone(),
            path: installed.binary_path.clone(),
        }));

        Ok(InstallReport {
            removed: vec![PackageChange {
                name: name.to_string(),
                from_version: Some(installed.version),
                to_version: None,
                path: Some(installed.binary_path),
                size: Some(installed.size),
            }],
            duration_ms: elapsed_ms(start),
            ..InstallReport::default()
        })
    }

    /// Re-hash installed binaries and compare them with their receipts
    ///
    /// # Errors
    ///
    /// Returns `InstallError::NotInstalled` if `name` is given but not
    /// installed, or an error if a binary exists but cannot be read.
    pub async fn verify(&self, name: Option<&str>) -> Result<Vec<VerifyEntry>, Error> {
        let receipts = match name {
            Some(name) => vec![self.state_manager.get_installed(name).await?.ok_or_else(
                || InstallError::NotInstalled {
                    package: name.to_string(),
                },
            )?],
            None => self.state_manager.list_installed().await?,
        };

        let mut entries = Vec::with_capacity(receipts.len());
        for receipt in receipts {
            let actual = match tokio::fs::metadata(&receipt.binary_path).await {
                Ok(_) => Some(Checksum::hash_file(&receipt.binary_path).await?.to_hex()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
                Err(e) => return Err(Error::io_with_path(&e, &receipt.binary_path)),
            };
            let ok = actual.as_deref() == Some(receipt.sha256.as_str());
            if !ok {
                tracing::warn!(formula = %receipt.name, path = %receipt.binary_path.display(), "installed binary does not match receipt");
            }
            entries.push(VerifyEntry {
                name: receipt.name,
                version: receipt.version,
                binary_path: receipt.binary_path,
                expected: receipt.sha256,
                actual,
                ok,
            });
        }
        Ok(entries)
    }
}

/// Check a staged artifact against its formula checksum
async fn verify_checksum(path: &Path, expected: &Checksum) -> Result<(), Error> {
    let actual = Checksum::hash_file(path).await?;
    if actual == *expected {
        Ok(())
    } else {
        Err(NetworkError::ChecksumMismatch {
            expected: expected.to_hex(),
            actual: actual.to_hex(),
        }
        .into())
    }
}

/// Surface permission problems on the binary directory as install errors
fn placement_error(error: PlatformError) -> Error {
    match error {
        PlatformError::PermissionDenied { path, .. } => {
            InstallError::PermissionDenied { path }.into()
        }
        other => other.into(),
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}
