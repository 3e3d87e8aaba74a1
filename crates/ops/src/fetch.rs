//! Download a formula's artifact into the cache without installing it

use crate::{install::resolve_formula, FetchReport, OpsCtx};
use keg_errors::Error;
use keg_events::EventEmitter;
use keg_hash::verify_file;
use keg_types::{PlatformTag, Version};

/// Fetch the artifact for `formula` into the cache directory
///
/// A verified copy already in the cache is reused. A cached copy that fails
/// verification is replaced.
///
/// # Errors
///
/// Returns an error if the formula cannot be resolved, the download fails,
/// or the downloaded file does not match the formula checksum.
pub async fn fetch(
    ctx: &OpsCtx,
    formula: &str,
    version: Option<&Version>,
    platform: Option<PlatformTag>,
) -> Result<FetchReport, Error> {
    let formula = resolve_formula(ctx, formula, version).await?;
    let platform = match platform {
        Some(tag) => tag,
        None => ctx.select_platform()?,
    };
    let artifact = formula.resolve(platform)?;
    let dest = ctx.installer.config().cache_dir.join(&artifact.artifact_name);

    if tokio::fs::metadata(&dest).await.is_ok_and(|m| m.is_file()) {
        if verify_file(&dest, &artifact.sha256).await? {
            let size = tokio::fs::metadata(&dest)
                .await
                .map_err(|e| Error::io_with_path(&e, &dest))?
                .len();
            ctx.emit_debug(format!("{} already cached", artifact.artifact_name));
            return Ok(FetchReport {
                name: artifact.name,
                version: artifact.version,
                platform,
                url: artifact.url.to_string(),
                path: dest,
                sha256: artifact.sha256.to_hex(),
                size,
                cached: true,
            });
        }
        ctx.emit_warning_with_context(
            format!("discarding corrupt cache entry {}", artifact.artifact_name),
            dest.display().to_string(),
        );
        tokio::fs::remove_file(&dest)
            .await
            .map_err(|e| Error::io_with_path(&e, &dest))?;
    }

    let downloaded = keg_net::Download::from_url(artifact.url.clone())
        .for_package(&artifact.name)
        .execute(&ctx.net, &dest, Some(&artifact.sha256), &ctx.tx)
        .await?;

    Ok(FetchReport {
        name: artifact.name,
        version: artifact.version,
        platform,
        url: artifact.url.to_string(),
        path: downloaded.path,
        sha256: downloaded.sha256.to_hex(),
        size: downloaded.size,
        cached: false,
    })
}
