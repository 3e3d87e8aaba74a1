//! Formula information, receipts and host queries

use crate::{OpsCtx, PlatformReport};
use keg_errors::{Error, OpsError};
use keg_events::EventEmitter;
use keg_platform::SUPPORTED;
use keg_state::HistoryEntry;
use keg_types::{FormulaInfo, InstalledFormula, VerifyEntry};

/// Default number of history rows returned
pub const DEFAULT_HISTORY_LIMIT: u32 = 50;

/// List installed formulas
///
/// # Errors
///
/// Returns an error if the receipt database cannot be read.
pub async fn list_installed(ctx: &OpsCtx) -> Result<Vec<InstalledFormula>, Error> {
    let installed = ctx.state.list_installed().await?;
    ctx.emit_debug(format!("{} formulas installed", installed.len()));
    Ok(installed)
}

/// Describe a formula from the formula directory, with its receipt if installed
///
/// # Errors
///
/// Returns `FormulaError::NotFound` if no formula has this name.
pub async fn formula_info(ctx: &OpsCtx, name: &str) -> Result<FormulaInfo, Error> {
    let directory = ctx.formulas().await?;
    let latest = directory.find(name, None)?;
    let mut available_versions = directory.versions(name);
    available_versions.reverse();

    let installed = ctx.state.get_installed(name).await?;

    Ok(FormulaInfo {
        name: latest.name.clone(),
        desc: Some(latest.desc.clone()).filter(|d| !d.is_empty()),
        homepage: Some(latest.homepage.clone()),
        license: latest.license.clone(),
        latest_version: latest.version.clone(),
        available_versions,
        platforms: latest.supported_platforms(),
        installed,
    })
}

/// Install and uninstall history, newest first
///
/// # Errors
///
/// Returns an error if the history table cannot be read.
pub async fn history(
    ctx: &OpsCtx,
    name: Option<&str>,
    limit: Option<u32>,
) -> Result<Vec<HistoryEntry>, Error> {
    ctx.state
        .history(name, limit.unwrap_or(DEFAULT_HISTORY_LIMIT))
        .await
}

/// Re-hash installed binaries against their receipts
///
/// Mismatches are reported as warnings and in the returned entries; use
/// [`verification_error`] to turn them into a failure.
///
/// # Errors
///
/// Returns `InstallError::NotInstalled` for an unknown `name`, or an error
/// if a binary exists but cannot be read.
pub async fn verify(ctx: &OpsCtx, name: Option<&str>) -> Result<Vec<VerifyEntry>, Error> {
    ctx.emit_operation_started("verify");
    let entries = ctx.installer.verify(name).await?;

    let failures = entries.iter().filter(|e| !e.ok).count();
    for entry in entries.iter().filter(|e| !e.ok) {
        let detail = match &entry.actual {
            Some(actual) => format!("expected {}, got {actual}", entry.expected),
            None => "binary is missing".to_string(),
        };
        ctx.emit_warning_with_context(
            format!("{} {} failed verification", entry.name, entry.version),
            detail,
        );
    }

    if failures > 0 {
        ctx.emit_operation_failed("verify", format!("{failures} mismatched"));
    } else {
        ctx.emit_operation_completed("verify", true);
    }
    Ok(entries)
}

/// `OpsError::VerificationFailed` if any entry does not match its receipt
#[must_use]
pub fn verification_error(entries: &[VerifyEntry]) -> Option<Error> {
    let failures = entries.iter().filter(|e| !e.ok).count();
    (failures > 0).then(|| {
        OpsError::VerificationFailed {
            checked: entries.len(),
            failures,
        }
        .into()
    })
}

/// Report the platform tag selected for this host
///
/// # Errors
///
/// Returns `PlatformError::UnsupportedPlatform` if the host has no artifacts.
pub fn platform(ctx: &OpsCtx) -> Result<PlatformReport, Error> {
    let tag = ctx.select_platform()?;
    Ok(PlatformReport {
        os: ctx.host.name().to_string(),
        tag,
        supported: SUPPORTED
            .iter()
            .map(|(os, tag)| ((*os).to_string(), *tag))
            .collect(),
        bin_dir: ctx.config.bin_dir(),
    })
}
