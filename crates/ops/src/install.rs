//! Install and uninstall operations
//!
//! Resolves the formula and platform, then delegates to `keg_install` for
//! staging, verification and placement.

use crate::{InstallRequest, OpsCtx};
use keg_errors::{Error, FormulaError};
use keg_events::EventEmitter;
use keg_formula::{Formula, FORMULA_EXTENSION};
use keg_install::{InstallContext, UninstallContext};
use keg_types::{InstallReport, Version};
use std::path::Path;

/// Install a formula
///
/// # Errors
///
/// Returns an error if the formula cannot be found, the host platform is
/// unsupported, or the installer fails.
pub async fn install(ctx: &OpsCtx, request: &InstallRequest) -> Result<InstallReport, Error> {
    let operation = format!("install {}", request.formula);
    ctx.emit_operation_started(&operation);

    match install_inner(ctx, request).await {
        Ok(report) => {
            ctx.emit_operation_completed(&operation, true);
            Ok(report)
        }
        Err(e) => {
            ctx.emit_operation_failed(&operation, e.to_string());
            Err(e)
        }
    }
}

async fn install_inner(ctx: &OpsCtx, request: &InstallRequest) -> Result<InstallReport, Error> {
    let formula = resolve_formula(ctx, &request.formula, request.version.as_ref()).await?;
    let platform = ctx.select_platform()?;
    let artifact = formula.resolve(platform)?;

    tracing::info!(
        formula = %artifact.name,
        version = %artifact.version,
        platform = %platform,
        "installing"
    );

    let context = InstallContext::new()
        .with_staging_dir(request.from.clone())
        .with_force(request.force)
        .with_allow_download(request.from.is_none())
        .with_event_sender(ctx.tx.clone());

    ctx.installer.install(&artifact, &context).await
}

/// Remove an installed formula
///
/// # Errors
///
/// Returns `InstallError::NotInstalled` if the formula has no receipt.
pub async fn uninstall(ctx: &OpsCtx, name: &str) -> Result<InstallReport, Error> {
    let operation = format!("uninstall {name}");
    ctx.emit_operation_started(&operation);

    let context = UninstallContext::new().with_event_sender(ctx.tx.clone());
    match ctx.installer.uninstall(name, &context).await {
        Ok(report) => {
            ctx.emit_operation_completed(&operation, true);
            Ok(report)
        }
        Err(e) => {
            ctx.emit_operation_failed(&operation, e.to_string());
            Err(e)
        }
    }
}

/// Find a formula by name in the formula directory, or load it directly when
/// `formula` is the path of a formula file
///
/// # Errors
///
/// Returns `FormulaError::NotFound` or `FormulaError::VersionNotFound` if no
/// matching release exists, or a parse/validation error for a formula file.
pub async fn resolve_formula(
    ctx: &OpsCtx,
    formula: &str,
    version: Option<&Version>,
) -> Result<Formula, Error> {
    let path = Path::new(formula);
    let is_file = path
        .extension()
        .is_some_and(|ext| ext == FORMULA_EXTENSION)
        && tokio::fs::metadata(path).await.is_ok_and(|m| m.is_file());

    if !is_file {
        let directory = ctx.formulas().await?;
        return directory.find(formula, version).cloned();
    }

    let loaded = Formula::load(path).await?;
    loaded.validate()?;
    if let Some(version) = version {
        if *version != loaded.version {
            return Err(FormulaError::VersionNotFound {
                name: loaded.name,
                version: version.to_string(),
            }
            .into());
        }
    }
    Ok(loaded)
}
